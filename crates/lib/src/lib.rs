//! prebuild-lib: Core logic for refreshing per-feature prebuilt artifacts
//!
//! This crate provides the pieces the `prebuild` CLI wires together:
//! - `SyncConfig`: immutable description of the package, directories and artifacts
//! - `runner`: blocking execution of toolchain commands (`cargo clean`, `cargo build`)
//! - `locate`: finding the freshest hash-suffixed build script `OUT_DIR`
//! - `artifacts`: copying generated files into a snapshot directory
//! - `orchestrate`: the per-variant clean, build, locate and sync loop

pub mod artifacts;
pub mod config;
pub mod consts;
pub mod locate;
pub mod orchestrate;
pub mod report;
pub mod runner;
pub mod variant;

pub use artifacts::{ArtifactOutcome, SyncReport};
pub use config::{ConfigError, ConfigOverrides, Profile, SyncConfig};
pub use locate::LocateError;
pub use orchestrate::{Orchestrator, SyncError, SyncOutcome, SyncSummary, VariantSummary};
pub use report::{Reporter, Step, SyncEvent};
pub use runner::{CommandRunner, ProcessRunner, RunError, ToolCommand};
pub use variant::FeatureVariant;
