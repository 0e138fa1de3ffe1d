//! Feature variant discovery.
//!
//! Variants are not declared anywhere: each subdirectory of the snapshot root
//! is one variant, and its name (prefixed) is the cargo feature that selects it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

/// One mutually exclusive built-in configuration of the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureVariant {
  /// Short name, identical to the snapshot subdirectory name.
  pub name: String,
  /// Cargo feature enabling this variant.
  pub feature: String,
  /// Where this variant's artifacts are kept.
  pub snapshot_dir: PathBuf,
}

impl FeatureVariant {
  pub fn new(name: &str, prefix: &str, snapshot_root: &Path) -> Self {
    Self {
      name: name.to_string(),
      feature: format!("{}{}", prefix, name),
      snapshot_dir: snapshot_root.join(name),
    }
  }
}

/// List the variants under `snapshot_root`, sorted by name.
///
/// Only directories count; files and entries whose names are not valid UTF-8
/// are ignored. The caller checks that `snapshot_root` exists.
pub fn discover_variants(snapshot_root: &Path, prefix: &str) -> io::Result<Vec<FeatureVariant>> {
  let mut names = Vec::new();

  for entry in fs::read_dir(snapshot_root)? {
    let entry = entry?;
    if !entry.path().is_dir() {
      continue;
    }
    match entry.file_name().into_string() {
      Ok(name) => names.push(name),
      Err(name) => debug!(name = ?name, "skipping non-UTF-8 snapshot directory"),
    }
  }

  names.sort();
  Ok(
    names
      .iter()
      .map(|name| FeatureVariant::new(name, prefix, snapshot_root))
      .collect(),
  )
}
