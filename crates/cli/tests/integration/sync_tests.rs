//! End-to-end runs of `prebuild sync` against a fake cargo script.

use std::fs;

use predicates::prelude::*;

use super::common::TestEnv;

const GEN_ARTIFACTS: &str = "artifacts = [\"gen.txt\", \"regs.rs\", \"features.txt\"]\n";

#[test]
fn sync_updates_each_variant_from_its_own_build() {
  let env = TestEnv::new().with_variants(&["foo", "bar"]).with_config(GEN_ARTIFACTS);
  fs::write(env.prebuilds().join("foo").join("gen.txt"), "stale").unwrap();
  let cargo = env.fake_cargo();

  env
    .prebuild_cmd()
    .arg("sync")
    .arg("--cargo")
    .arg(&cargo)
    .assert()
    .success()
    .stdout(predicate::str::contains("Found features to update: bar, foo"))
    .stdout(predicate::str::contains("Copied gen.txt"))
    .stdout(predicate::str::contains("1/3 file(s) copied"))
    .stdout(predicate::str::contains("Prebuild update process finished"))
    .stderr(predicate::str::contains("Source file not found, skipping"));

  assert_eq!(
    fs::read_to_string(env.prebuilds().join("foo").join("gen.txt")).unwrap(),
    "builtin-foo\n"
  );
  assert_eq!(
    fs::read_to_string(env.prebuilds().join("bar").join("gen.txt")).unwrap(),
    "builtin-bar\n"
  );
  assert!(!env.prebuilds().join("foo").join("regs.rs").exists());
}

#[test]
fn sync_build_failure_aborts_remaining_variants() {
  let env = TestEnv::new().with_variants(&["bar", "foo"]).with_config(GEN_ARTIFACTS);
  let cargo = env.fake_cargo();

  env
    .prebuild_cmd()
    .arg("sync")
    .arg("--cargo")
    .arg(&cargo)
    .env("FAKE_CARGO_FAIL", "builtin-bar")
    .assert()
    .code(3)
    .stderr(predicate::str::contains("could not compile"))
    .stderr(predicate::str::contains("Not processed: foo"))
    .stdout(predicate::str::contains("Prebuild update process finished"));

  assert!(!env.prebuilds().join("bar").join("gen.txt").exists());
  assert!(!env.prebuilds().join("foo").join("gen.txt").exists());
}

#[test]
fn sync_missing_out_dir_is_discovery_failure() {
  let env = TestEnv::new().with_variants(&["foo"]).with_config(GEN_ARTIFACTS);
  let cargo = env.fake_cargo();

  env
    .prebuild_cmd()
    .arg("sync")
    .arg("--cargo")
    .arg(&cargo)
    .env("FAKE_CARGO_NO_OUT", "1")
    .assert()
    .code(4)
    .stderr(predicate::str::contains("'out' subdirectory not found"));
}

#[test]
fn sync_with_nothing_copied_is_partial() {
  let env = TestEnv::new().with_variants(&["foo"]);
  let cargo = env.fake_cargo();

  env
    .prebuild_cmd()
    .arg("sync")
    .arg("--cargo")
    .arg(&cargo)
    .args(["--artifact", "_generated.rs"])
    .assert()
    .code(5)
    .stderr(predicate::str::contains("No files were copied for 'foo'"));
}

#[test]
fn sync_only_processes_selected_variant() {
  let env = TestEnv::new().with_variants(&["foo", "bar"]).with_config(GEN_ARTIFACTS);
  let cargo = env.fake_cargo();

  env
    .prebuild_cmd()
    .args(["sync", "--only", "foo", "--cargo"])
    .arg(&cargo)
    .assert()
    .success();

  assert!(env.prebuilds().join("foo").join("gen.txt").exists());
  assert!(!env.prebuilds().join("bar").join("gen.txt").exists());
}

#[test]
fn sync_json_summary() {
  let env = TestEnv::new().with_variants(&["foo"]).with_config(GEN_ARTIFACTS);
  let cargo = env.fake_cargo();

  let output = env
    .prebuild_cmd()
    .args(["sync", "-o", "json", "--cargo"])
    .arg(&cargo)
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["outcome"]["status"], "completed");
  assert_eq!(json["variants"][0]["name"], "foo");
  assert_eq!(json["variants"][0]["artifacts"]["outcomes"][0]["status"], "copied");
  assert_eq!(json["variants"][0]["artifacts"]["outcomes"][1]["status"], "missing");
}

#[test]
fn sync_missing_toolchain_is_reported() {
  let env = TestEnv::new().with_variants(&["foo"]);

  env
    .prebuild_cmd()
    .args(["sync", "--cargo", "prebuild-no-such-cargo"])
    .assert()
    .code(3)
    .stderr(predicate::str::contains("'prebuild-no-such-cargo' not found"));
}
