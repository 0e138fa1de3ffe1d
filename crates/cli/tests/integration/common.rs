//! Shared test helpers for CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in for cargo. `clean` removes `target/`; `build` writes the value of
/// `--features` to `gen.txt` in a hash-suffixed `OUT_DIR`.
///
/// `FAKE_CARGO_FAIL=<feature>` makes that build fail, `FAKE_CARGO_NO_OUT=1`
/// skips creating the `out` directory.
#[cfg(unix)]
const FAKE_CARGO: &str = r#"#!/bin/sh
case "$1" in
  clean)
    rm -rf target
    ;;
  build)
    feature=""
    while [ $# -gt 0 ]; do
      if [ "$1" = "--features" ]; then
        feature="$2"
      fi
      shift
    done
    if [ -n "$FAKE_CARGO_FAIL" ] && [ "$feature" = "$FAKE_CARGO_FAIL" ]; then
      echo "error: could not compile \`musb\`" >&2
      exit 101
    fi
    dir="target/debug/build/musb-0123456789abcdef"
    mkdir -p "$dir"
    if [ -z "$FAKE_CARGO_NO_OUT" ]; then
      mkdir -p "$dir/out"
      echo "$feature" > "$dir/out/gen.txt"
    fi
    ;;
esac
"#;

/// Isolated workspace with a prebuild directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Workspace with an empty `src/prebuilds`.
  pub fn new() -> Self {
    let env = Self::without_prebuilds();
    fs::create_dir_all(env.prebuilds()).unwrap();
    env
  }

  /// Workspace without `src/prebuilds`.
  pub fn without_prebuilds() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  pub fn prebuilds(&self) -> PathBuf {
    self.path().join("src").join("prebuilds")
  }

  pub fn with_variants(self, names: &[&str]) -> Self {
    for name in names {
      fs::create_dir_all(self.prebuilds().join(name)).unwrap();
    }
    self
  }

  /// Write `prebuild.toml` in the workspace.
  pub fn with_config(self, content: &str) -> Self {
    fs::write(self.path().join("prebuild.toml"), content).unwrap();
    self
  }

  /// Install the fake cargo script and return its path.
  #[cfg(unix)]
  pub fn fake_cargo(&self) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = self.path().join("fake-cargo");
    fs::write(&path, FAKE_CARGO).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  /// Get a Command for the prebuild binary, running inside the workspace.
  pub fn prebuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("prebuild");
    cmd.current_dir(self.path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
