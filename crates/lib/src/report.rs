//! Progress events emitted while a sync runs.
//!
//! The orchestrator never prints. It hands [`SyncEvent`]s to a [`Reporter`],
//! which the CLI renders to the terminal and tests simply collect.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::artifacts::ArtifactOutcome;

/// A pipeline step that can abort the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
  Clean,
  Build,
  Locate,
}

impl Step {
  /// Human-readable step name used in diagnostics.
  pub fn description(self) -> &'static str {
    match self {
      Step::Clean => "Project cleanup",
      Step::Build => "Cargo build",
      Step::Locate => "OUT_DIR lookup",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
  VariantsFound {
    names: Vec<String>,
  },
  VariantStarted {
    name: String,
    feature: String,
    index: usize,
    total: usize,
  },
  CommandStarted {
    step: Step,
    command: String,
  },
  StepSucceeded {
    step: Step,
  },
  StepFailed {
    step: Step,
    message: String,
    /// Captured standard error of a failed command, printed verbatim.
    stderr: Option<String>,
  },
  OutDirLocated {
    path: PathBuf,
  },
  CopyStarted {
    dest_dir: PathBuf,
  },
  Artifact {
    outcome: ArtifactOutcome,
  },
  /// None of the configured artifacts were copied for this variant.
  NothingCopied {
    name: String,
  },
  VariantFinished {
    name: String,
    copied: usize,
    total: usize,
    elapsed: Duration,
  },
}

/// Receives progress events in the order they happen.
pub trait Reporter {
  fn report(&mut self, event: SyncEvent);
}

impl Reporter for Vec<SyncEvent> {
  fn report(&mut self, event: SyncEvent) {
    self.push(event);
  }
}
