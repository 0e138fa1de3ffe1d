//! Sync configuration.
//!
//! All knobs of a run live in one immutable [`SyncConfig`], resolved once at
//! startup in three layers: built-in defaults, an optional `prebuild.toml`,
//! then command-line overrides.
//!
//! ```toml
//! package = "musb"
//! snapshot-root = "src/prebuilds"
//! profile = "debug"
//! artifacts = ["_generated.rs", "regs.rs", "features.txt"]
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  CONFIG_FILENAME, DEFAULT_ARTIFACTS, DEFAULT_CARGO, DEFAULT_FEATURE_PREFIX, DEFAULT_OUT_DIR_NAME, DEFAULT_PACKAGE,
  DEFAULT_SNAPSHOT_ROOT, DEFAULT_TARGET_DIR,
};
use crate::runner::ToolCommand;
use crate::variant::FeatureVariant;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read config file {path}: {source}")]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config file {path}: {source}")]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("package name must not be empty")]
  EmptyPackage,

  #[error("artifact list must not be empty")]
  NoArtifacts,

  #[error("invalid artifact name '{0}': expected a plain file name")]
  InvalidArtifact(String),
}

/// Cargo build profile the artifacts are captured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
  #[default]
  Debug,
  Release,
}

impl Profile {
  /// Directory name of this profile under the target directory.
  pub fn dir_name(self) -> &'static str {
    match self {
      Profile::Debug => "debug",
      Profile::Release => "release",
    }
  }
}

impl fmt::Display for Profile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.dir_name())
  }
}

/// On-disk shape of `prebuild.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct ConfigFile {
  package: Option<String>,
  snapshot_root: Option<PathBuf>,
  target_dir: Option<PathBuf>,
  profile: Option<Profile>,
  feature_prefix: Option<String>,
  artifacts: Option<Vec<String>>,
  out_dir_name: Option<String>,
  cargo: Option<String>,
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
  pub package: Option<String>,
  pub snapshot_root: Option<PathBuf>,
  pub target_dir: Option<PathBuf>,
  pub profile: Option<Profile>,
  pub cargo: Option<String>,
  pub artifacts: Option<Vec<String>>,
}

/// Everything a sync run needs to know, fixed before the first variant starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
  /// Directory the toolchain runs in; relative paths below resolve against it.
  pub workspace: PathBuf,
  pub package: String,
  pub snapshot_root: PathBuf,
  pub target_dir: PathBuf,
  pub profile: Profile,
  pub feature_prefix: String,
  pub artifacts: Vec<String>,
  pub out_dir_name: String,
  pub cargo: String,
}

impl SyncConfig {
  /// Default configuration rooted at `workspace`.
  pub fn new(workspace: impl Into<PathBuf>) -> Self {
    Self {
      workspace: workspace.into(),
      package: DEFAULT_PACKAGE.to_string(),
      snapshot_root: PathBuf::from(DEFAULT_SNAPSHOT_ROOT),
      target_dir: PathBuf::from(DEFAULT_TARGET_DIR),
      profile: Profile::default(),
      feature_prefix: DEFAULT_FEATURE_PREFIX.to_string(),
      artifacts: DEFAULT_ARTIFACTS.iter().map(|s| s.to_string()).collect(),
      out_dir_name: DEFAULT_OUT_DIR_NAME.to_string(),
      cargo: DEFAULT_CARGO.to_string(),
    }
  }

  /// Load configuration for `workspace`.
  ///
  /// Reads `explicit` when given (it must exist), otherwise
  /// `<workspace>/prebuild.toml` if present. Missing keys keep their defaults.
  pub fn load(workspace: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
    let mut config = Self::new(workspace);

    let path = match explicit {
      Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
      Some(path) => path.to_path_buf(),
      None => workspace.join(CONFIG_FILENAME),
    };

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound && explicit.is_none() => {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(config);
      }
      Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.clone(),
      source,
    })?;
    debug!(path = %path.display(), "loaded config file");

    config.merge_file(file);
    Ok(config)
  }

  fn merge_file(&mut self, file: ConfigFile) {
    if let Some(package) = file.package {
      self.package = package;
    }
    if let Some(root) = file.snapshot_root {
      self.snapshot_root = root;
    }
    if let Some(target) = file.target_dir {
      self.target_dir = target;
    }
    if let Some(profile) = file.profile {
      self.profile = profile;
    }
    if let Some(prefix) = file.feature_prefix {
      self.feature_prefix = prefix;
    }
    if let Some(artifacts) = file.artifacts {
      self.artifacts = artifacts;
    }
    if let Some(out) = file.out_dir_name {
      self.out_dir_name = out;
    }
    if let Some(cargo) = file.cargo {
      self.cargo = cargo;
    }
  }

  /// Apply command-line overrides on top of the loaded values.
  pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
    if let Some(package) = overrides.package {
      self.package = package;
    }
    if let Some(root) = overrides.snapshot_root {
      self.snapshot_root = root;
    }
    if let Some(target) = overrides.target_dir {
      self.target_dir = target;
    }
    if let Some(profile) = overrides.profile {
      self.profile = profile;
    }
    if let Some(cargo) = overrides.cargo {
      self.cargo = cargo;
    }
    if let Some(artifacts) = overrides.artifacts {
      self.artifacts = artifacts;
    }
    self
  }

  /// Reject configurations the orchestrator cannot act on.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.package.trim().is_empty() {
      return Err(ConfigError::EmptyPackage);
    }
    if self.artifacts.is_empty() {
      return Err(ConfigError::NoArtifacts);
    }
    for name in &self.artifacts {
      let plain = !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\']);
      if !plain {
        return Err(ConfigError::InvalidArtifact(name.clone()));
      }
    }
    Ok(())
  }

  /// Absolute (or workspace-relative) snapshot root.
  pub fn snapshot_root_path(&self) -> PathBuf {
    self.workspace.join(&self.snapshot_root)
  }

  /// Parent directory of the build script output directories for the profile.
  pub fn build_dir(&self) -> PathBuf {
    self
      .workspace
      .join(&self.target_dir)
      .join(self.profile.dir_name())
      .join("build")
  }

  /// `--target-dir` arguments, only when the target directory was moved.
  ///
  /// Cargo must clean and build where [`build_dir`](Self::build_dir) looks.
  fn target_dir_args(&self) -> Vec<String> {
    if self.target_dir == Path::new(DEFAULT_TARGET_DIR) {
      return Vec::new();
    }
    let target = self.workspace.join(&self.target_dir);
    vec!["--target-dir".to_string(), target.display().to_string()]
  }

  /// `cargo clean`, removing every cached artifact of the workspace.
  pub fn clean_command(&self) -> ToolCommand {
    ToolCommand::new(&self.cargo)
      .arg("clean")
      .args(self.target_dir_args())
      .current_dir(&self.workspace)
  }

  /// `cargo build` with only `variant`'s feature enabled.
  pub fn build_command(&self, variant: &FeatureVariant) -> ToolCommand {
    let mut command = ToolCommand::new(&self.cargo)
      .args(["build", "--no-default-features", "--features"])
      .arg(&variant.feature)
      .args(self.target_dir_args())
      .current_dir(&self.workspace);
    if self.profile == Profile::Release {
      command = command.arg("--release");
    }
    command
  }
}
