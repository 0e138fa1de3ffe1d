use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn list_shows_variants_with_features() {
  let env = TestEnv::new().with_variants(&["py32f07x", "readconf"]);

  env
    .prebuild_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("py32f07x → builtin-py32f07x"))
    .stdout(predicate::str::contains("readconf → builtin-readconf"))
    .stdout(predicate::str::contains("2 variant(s) total"));
}

#[test]
fn list_uses_configured_prefix() {
  let env = TestEnv::new()
    .with_variants(&["f072"])
    .with_config("feature-prefix = \"chip-\"\n");

  env
    .prebuild_cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("chip-f072"));
}

#[test]
fn list_json_output_is_valid() {
  let env = TestEnv::new().with_variants(&["a", "b"]);

  let output = env.prebuild_cmd().args(["list", "-o", "json"]).output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["package"], "musb");
  assert_eq!(json["count"], 2);
  assert_eq!(json["variants"][0]["feature"], "builtin-a");
}

#[test]
fn list_missing_prebuild_dir_is_config_error() {
  let env = TestEnv::without_prebuilds();

  env
    .prebuild_cmd()
    .arg("list")
    .assert()
    .code(2)
    .stderr(predicate::str::contains("not found"));
}

#[test]
fn list_honors_workspace_flag() {
  let env = TestEnv::new().with_variants(&["elsewhere"]);
  let other = TestEnv::without_prebuilds();

  other
    .prebuild_cmd()
    .arg("list")
    .arg("-C")
    .arg(env.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("elsewhere"));
}
