/// Config file looked up in the workspace when `--config` is not given.
pub const CONFIG_FILENAME: &str = "prebuild.toml";

/// The package whose build script output is captured.
pub const DEFAULT_PACKAGE: &str = "musb";

/// Snapshot root, relative to the workspace.
pub const DEFAULT_SNAPSHOT_ROOT: &str = "src/prebuilds";

/// Cargo target directory, relative to the workspace.
pub const DEFAULT_TARGET_DIR: &str = "target";

/// Prefix turning a snapshot directory name into a cargo feature.
pub const DEFAULT_FEATURE_PREFIX: &str = "builtin-";

/// Subdirectory of a build script directory that holds `OUT_DIR` content.
pub const DEFAULT_OUT_DIR_NAME: &str = "out";

pub const DEFAULT_CARGO: &str = "cargo";

/// Files copied from `OUT_DIR` into each snapshot directory, in order.
pub const DEFAULT_ARTIFACTS: &[&str] = &["_generated.rs", "regs.rs", "features.txt"];
