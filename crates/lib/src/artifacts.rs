//! Copying generated artifacts into a snapshot directory.
//!
//! Each file is handled on its own: a missing source file or a failed copy is
//! recorded and the next file is attempted. Nothing here returns an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactOutcome {
  Copied { name: String, bytes: u64 },
  Missing { name: String, path: PathBuf },
  Failed { name: String, error: String },
}

impl ArtifactOutcome {
  pub fn name(&self) -> &str {
    match self {
      ArtifactOutcome::Copied { name, .. }
      | ArtifactOutcome::Missing { name, .. }
      | ArtifactOutcome::Failed { name, .. } => name,
    }
  }
}

/// Per-file outcomes of one synchronization, in artifact list order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
  pub outcomes: Vec<ArtifactOutcome>,
}

impl SyncReport {
  /// Number of files actually copied.
  pub fn copied(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|o| matches!(o, ArtifactOutcome::Copied { .. }))
      .count()
  }

  pub fn missing(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|o| matches!(o, ArtifactOutcome::Missing { .. }))
      .count()
  }

  pub fn failed(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|o| matches!(o, ArtifactOutcome::Failed { .. }))
      .count()
  }
}

/// Copy each of `filenames` from `source_dir` to `dest_dir`, overwriting.
///
/// `dest_dir` must already exist; it is not created.
pub fn sync_artifacts(source_dir: &Path, dest_dir: &Path, filenames: &[String]) -> SyncReport {
  let mut report = SyncReport::default();

  for name in filenames {
    let src = source_dir.join(name);
    let outcome = if !src.exists() {
      debug!(path = %src.display(), "artifact not produced by build");
      ArtifactOutcome::Missing {
        name: name.clone(),
        path: src,
      }
    } else {
      match fs::copy(&src, dest_dir.join(name)) {
        Ok(bytes) => {
          debug!(name = %name, bytes, "copied artifact");
          ArtifactOutcome::Copied {
            name: name.clone(),
            bytes,
          }
        }
        Err(e) => {
          warn!(name = %name, error = %e, "failed to copy artifact");
          ArtifactOutcome::Failed {
            name: name.clone(),
            error: e.to_string(),
          }
        }
      }
    };
    report.outcomes.push(outcome);
  }

  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  struct Dirs {
    _temp: TempDir,
    out: PathBuf,
    dest: PathBuf,
  }

  fn dirs() -> Dirs {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out");
    let dest = temp.path().join("snapshot");
    fs::create_dir(&out).unwrap();
    fs::create_dir(&dest).unwrap();
    Dirs { _temp: temp, out, dest }
  }

  #[test]
  fn copies_present_files_and_skips_missing() {
    let d = dirs();
    fs::write(d.out.join("regs.rs"), "pub struct Regs;").unwrap();

    let report = sync_artifacts(&d.out, &d.dest, &names(&["_generated.rs", "regs.rs", "features.txt"]));

    assert_eq!(report.copied(), 1);
    assert_eq!(report.missing(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(fs::read_to_string(d.dest.join("regs.rs")).unwrap(), "pub struct Regs;");
    assert!(!d.dest.join("_generated.rs").exists());
    assert!(!d.dest.join("features.txt").exists());

    let order: Vec<_> = report.outcomes.iter().map(ArtifactOutcome::name).collect();
    assert_eq!(order, ["_generated.rs", "regs.rs", "features.txt"]);
  }

  #[test]
  fn overwrites_existing_snapshot_files() {
    let d = dirs();
    fs::write(d.out.join("features.txt"), "fresh").unwrap();
    fs::write(d.dest.join("features.txt"), "stale").unwrap();

    let report = sync_artifacts(&d.out, &d.dest, &names(&["features.txt"]));

    assert_eq!(report.copied(), 1);
    assert_eq!(fs::read_to_string(d.dest.join("features.txt")).unwrap(), "fresh");
  }

  #[test]
  fn nothing_present_copies_nothing() {
    let d = dirs();
    let report = sync_artifacts(&d.out, &d.dest, &names(&["a", "b"]));

    assert_eq!(report.copied(), 0);
    assert_eq!(report.missing(), 2);
    assert_eq!(fs::read_dir(&d.dest).unwrap().count(), 0);
  }

  #[test]
  fn copy_failure_does_not_stop_remaining_files() {
    let d = dirs();
    // A directory in place of a file cannot be copied.
    fs::create_dir(d.out.join("_generated.rs")).unwrap();
    fs::write(d.out.join("regs.rs"), "regs").unwrap();

    let report = sync_artifacts(&d.out, &d.dest, &names(&["_generated.rs", "regs.rs"]));

    assert_eq!(report.failed(), 1);
    assert_eq!(report.copied(), 1);
    assert!(matches!(&report.outcomes[0], ArtifactOutcome::Failed { name, .. } if name == "_generated.rs"));
    assert!(d.dest.join("regs.rs").exists());
  }

  #[test]
  fn missing_destination_is_not_created() {
    let d = dirs();
    fs::write(d.out.join("regs.rs"), "regs").unwrap();
    let dest = d.dest.join("does-not-exist");

    let report = sync_artifacts(&d.out, &dest, &names(&["regs.rs"]));

    assert_eq!(report.failed(), 1);
    assert!(!dest.exists());
  }
}
