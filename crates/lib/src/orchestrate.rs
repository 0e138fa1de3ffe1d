//! The per-variant refresh loop.
//!
//! For every variant found under the snapshot root, in name order:
//! 1. `cargo clean`, so no output of the previous variant survives
//! 2. `cargo build --no-default-features --features <variant feature>`
//! 3. locate the fresh build script `OUT_DIR`
//! 4. copy the configured artifacts into the variant's snapshot directory
//!
//! A failure in steps 1-3 stops the whole run; remaining variants are left
//! untouched. Missing or uncopyable artifacts in step 4 never stop it.

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::artifacts::{SyncReport, sync_artifacts};
use crate::config::{ConfigError, SyncConfig};
use crate::locate::locate_out_dir;
use crate::report::{Reporter, Step, SyncEvent};
use crate::runner::{CommandRunner, ToolCommand};
use crate::variant::{FeatureVariant, discover_variants};

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum SyncError {
  #[error("prebuild directory '{0}' not found")]
  SnapshotRootMissing(PathBuf),

  #[error("failed to list prebuild directory '{path}': {source}")]
  ListVariants { path: PathBuf, source: io::Error },

  #[error("unknown variant '{name}' (available: {available})")]
  UnknownVariant { name: String, available: String },

  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
  /// The snapshot root has no variant directories.
  NothingToDo,
  /// Every variant went through all steps.
  Completed,
  /// `step` failed for `variant`; later variants were not processed.
  Aborted {
    variant: String,
    step: Step,
    message: String,
  },
}

/// Result of one fully processed variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSummary {
  pub name: String,
  pub feature: String,
  pub out_dir: PathBuf,
  pub artifacts: SyncReport,
  pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
  pub package: String,
  pub variants: Vec<VariantSummary>,
  /// Variants never started because the run was aborted.
  pub skipped: Vec<String>,
  pub outcome: SyncOutcome,
}

impl SyncSummary {
  /// Names of processed variants that received no artifact at all.
  pub fn variants_without_artifacts(&self) -> Vec<&str> {
    self
      .variants
      .iter()
      .filter(|v| v.artifacts.copied() == 0)
      .map(|v| v.name.as_str())
      .collect()
  }
}

/// A failed step, carried out of the variant loop.
struct Abort {
  step: Step,
  message: String,
}

/// Drives every variant through clean, build, locate and copy.
pub struct Orchestrator<R> {
  config: SyncConfig,
  runner: R,
  only: Vec<String>,
}

impl<R: CommandRunner> Orchestrator<R> {
  pub fn new(config: SyncConfig, runner: R) -> Self {
    Self {
      config,
      runner,
      only: Vec::new(),
    }
  }

  /// Restrict the run to the named variants. Empty means all.
  pub fn only(mut self, names: Vec<String>) -> Self {
    self.only = names;
    self
  }

  pub fn config(&self) -> &SyncConfig {
    &self.config
  }

  #[cfg(test)]
  fn into_runner(self) -> R {
    self.runner
  }

  /// Discover the variants this run would process.
  pub fn variants(&self) -> Result<Vec<FeatureVariant>, SyncError> {
    let root = self.config.snapshot_root_path();
    if !root.is_dir() {
      return Err(SyncError::SnapshotRootMissing(root));
    }

    let variants = discover_variants(&root, &self.config.feature_prefix)
      .map_err(|source| SyncError::ListVariants { path: root, source })?;

    if self.only.is_empty() {
      return Ok(variants);
    }

    if let Some(unknown) = self.only.iter().find(|name| !variants.iter().any(|v| &v.name == *name)) {
      let available = variants.iter().map(|v| v.name.as_str()).collect::<Vec<_>>().join(", ");
      return Err(SyncError::UnknownVariant {
        name: unknown.clone(),
        available,
      });
    }

    Ok(variants.into_iter().filter(|v| self.only.contains(&v.name)).collect())
  }

  /// Process all variants, stopping at the first clean, build or locate failure.
  pub fn run(&mut self, reporter: &mut dyn Reporter) -> Result<SyncSummary, SyncError> {
    self.config.validate()?;
    let variants = self.variants()?;

    let mut summary = SyncSummary {
      package: self.config.package.clone(),
      variants: Vec::new(),
      skipped: Vec::new(),
      outcome: SyncOutcome::Completed,
    };

    if variants.is_empty() {
      let root = self.config.snapshot_root_path();
      debug!(root = %root.display(), "no variant directories");
      summary.outcome = SyncOutcome::NothingToDo;
      return Ok(summary);
    }

    reporter.report(SyncEvent::VariantsFound {
      names: variants.iter().map(|v| v.name.clone()).collect(),
    });

    let total = variants.len();
    for (index, variant) in variants.iter().enumerate() {
      match self.process(variant, index, total, reporter) {
        Ok(done) => summary.variants.push(done),
        Err(abort) => {
          warn!(variant = %variant.name, step = ?abort.step, "aborting remaining variants");
          summary.skipped = variants[index + 1..].iter().map(|v| v.name.clone()).collect();
          summary.outcome = SyncOutcome::Aborted {
            variant: variant.name.clone(),
            step: abort.step,
            message: abort.message,
          };
          break;
        }
      }
    }

    Ok(summary)
  }

  fn process(
    &mut self,
    variant: &FeatureVariant,
    index: usize,
    total: usize,
    reporter: &mut dyn Reporter,
  ) -> Result<VariantSummary, Abort> {
    let start = Instant::now();
    info!(variant = %variant.name, feature = %variant.feature, "processing variant");
    reporter.report(SyncEvent::VariantStarted {
      name: variant.name.clone(),
      feature: variant.feature.clone(),
      index,
      total,
    });

    let clean = self.config.clean_command();
    self.run_step(Step::Clean, &clean, reporter)?;

    let build = self.config.build_command(variant);
    self.run_step(Step::Build, &build, reporter)?;

    let out_dir = match locate_out_dir(&self.config.build_dir(), &self.config.package, &self.config.out_dir_name) {
      Ok(dir) => dir,
      Err(e) => {
        let message = e.to_string();
        reporter.report(SyncEvent::StepFailed {
          step: Step::Locate,
          message: message.clone(),
          stderr: None,
        });
        return Err(Abort {
          step: Step::Locate,
          message,
        });
      }
    };
    reporter.report(SyncEvent::OutDirLocated { path: out_dir.clone() });

    reporter.report(SyncEvent::CopyStarted {
      dest_dir: variant.snapshot_dir.clone(),
    });
    let artifacts = sync_artifacts(&out_dir, &variant.snapshot_dir, &self.config.artifacts);
    for outcome in &artifacts.outcomes {
      reporter.report(SyncEvent::Artifact {
        outcome: outcome.clone(),
      });
    }

    let copied = artifacts.copied();
    if copied == 0 {
      warn!(variant = %variant.name, "no artifacts copied");
      reporter.report(SyncEvent::NothingCopied {
        name: variant.name.clone(),
      });
    }

    let elapsed = start.elapsed();
    info!(variant = %variant.name, copied, "variant done");
    reporter.report(SyncEvent::VariantFinished {
      name: variant.name.clone(),
      copied,
      total: self.config.artifacts.len(),
      elapsed,
    });

    Ok(VariantSummary {
      name: variant.name.clone(),
      feature: variant.feature.clone(),
      out_dir,
      artifacts,
      elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    })
  }

  fn run_step(&mut self, step: Step, command: &ToolCommand, reporter: &mut dyn Reporter) -> Result<(), Abort> {
    reporter.report(SyncEvent::CommandStarted {
      step,
      command: command.to_string(),
    });

    match self.runner.run(command, step.description()) {
      Ok(()) => {
        reporter.report(SyncEvent::StepSucceeded { step });
        Ok(())
      }
      Err(e) => {
        let message = e.to_string();
        reporter.report(SyncEvent::StepFailed {
          step,
          message: message.clone(),
          stderr: e.stderr().map(str::to_string),
        });
        Err(Abort { step, message })
      }
    }
  }
}
