//! Implementation of the `prebuild sync` command.
//!
//! Runs the clean, build, locate and copy loop for every variant and prints
//! progress as it goes. The exit code tells callers how the run ended.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;

use prebuild_lib::{ArtifactOutcome, Orchestrator, ProcessRunner, Reporter, Step, SyncConfig, SyncError, SyncEvent};
use prebuild_lib::{SyncOutcome, SyncSummary};

use super::exit;
use crate::output::{
  OutputFormat, format_duration, print_error, print_header, print_info, print_json, print_stat, print_step,
  print_success, print_warning,
};

/// Renders sync events to the terminal.
///
/// In JSON mode only failures are shown (on stderr), so stdout carries
/// nothing but the final summary.
struct TerminalReporter {
  quiet: bool,
}

impl Reporter for TerminalReporter {
  fn report(&mut self, event: SyncEvent) {
    if self.quiet {
      if let SyncEvent::StepFailed { step, message, stderr } = event {
        print_step_failure(step, &message, stderr.as_deref());
      }
      return;
    }

    match event {
      SyncEvent::VariantsFound { names } => {
        print_info(&format!("Found features to update: {}", names.join(", ")));
      }
      SyncEvent::VariantStarted {
        feature, index, total, ..
      } => {
        print_header(&format!("--- Processing feature: {} ({}/{}) ---", feature, index + 1, total));
      }
      SyncEvent::CommandStarted { command, .. } => print_step(&format!("Running: {}", command)),
      SyncEvent::StepSucceeded { step } => print_success(&format!("{} successful", step.description())),
      SyncEvent::StepFailed { step, message, stderr } => print_step_failure(step, &message, stderr.as_deref()),
      SyncEvent::OutDirLocated { path } => print_stat("Found OUT_DIR", &path.display().to_string()),
      SyncEvent::CopyStarted { dest_dir } => {
        print_stat("Copying generated files to", &dest_dir.display().to_string());
      }
      SyncEvent::Artifact { outcome } => match outcome {
        ArtifactOutcome::Copied { name, .. } => print_success(&format!("Copied {}", name)),
        ArtifactOutcome::Missing { path, .. } => {
          print_warning(&format!("Source file not found, skipping: {}", path.display()));
        }
        ArtifactOutcome::Failed { name, error } => print_error(&format!("Error copying {}: {}", name, error)),
      },
      SyncEvent::NothingCopied { name } => print_warning(&format!(
        "No files were copied for '{}'. Please check the build script output.",
        name
      )),
      SyncEvent::VariantFinished {
        copied, total, elapsed, ..
      } => print_stat(
        "Done",
        &format!("{}/{} file(s) copied in {}", copied, total, format_duration(elapsed)),
      ),
    }
  }
}

fn print_step_failure(step: Step, message: &str, stderr: Option<&str>) {
  print_error(&format!("Error during '{}': {}", step.description(), message));
  if let Some(stderr) = stderr {
    eprintln!("{}", stderr);
  }
}

/// Execute the sync command.
///
/// Returns the process exit code:
/// - `0` all variants processed, or nothing to do
/// - `2` invalid configuration, prebuild directory missing or unknown `--only` variant
/// - `3` clean or build failed
/// - `4` build output directory not found
/// - `5` finished, but a variant received no artifacts
pub fn cmd_sync(config: SyncConfig, only: Vec<String>, output: OutputFormat) -> Result<ExitCode> {
  if !output.is_json() {
    print_info(&format!("Operating on crate: '{}' ({})", config.package, config.profile));
  }

  let mut orchestrator = Orchestrator::new(config, ProcessRunner).only(only);
  let mut reporter = TerminalReporter {
    quiet: output.is_json(),
  };

  let summary = match orchestrator.run(&mut reporter) {
    Ok(summary) => summary,
    Err(e @ (SyncError::Config(_) | SyncError::SnapshotRootMissing(_) | SyncError::UnknownVariant { .. })) => {
      print_error(&format!("Error: {}", e));
      return Ok(ExitCode::from(exit::CONFIG));
    }
    Err(e) => return Err(e.into()),
  };

  if output.is_json() {
    print_json(&summary)?;
  } else {
    print_summary(&summary, orchestrator.config());
  }

  Ok(ExitCode::from(exit_code(&summary)))
}

fn print_summary(summary: &SyncSummary, config: &SyncConfig) {
  match &summary.outcome {
    SyncOutcome::NothingToDo => {
      print_info(&format!(
        "No feature directories found in '{}'. Nothing to do.",
        config.snapshot_root_path().display()
      ));
    }
    SyncOutcome::Aborted { variant, step, .. } => {
      print_error(&format!(
        "{} failed for '{}', stopping.",
        step.description(),
        variant
      ));
      if !summary.skipped.is_empty() {
        print_warning(&format!("Not processed: {}", summary.skipped.join(", ")));
      }
    }
    SyncOutcome::Completed => {}
  }

  let empty = summary.variants_without_artifacts();
  if !empty.is_empty() {
    print_warning(&format!("No artifacts captured for: {}", empty.join(", ")));
  }

  print_header("--- Prebuild update process finished. ---");
  let totals = FileTotals::of(summary);
  let elapsed: u64 = summary.variants.iter().map(|v| v.elapsed_ms).sum();
  print_stat("Variants updated", &summary.variants.len().to_string());
  print_stat("Files copied", &totals.copied.to_string());
  if totals.missing > 0 {
    print_stat("Files not produced", &totals.missing.to_string());
  }
  if totals.failed > 0 {
    print_stat("Copy errors", &totals.failed.to_string());
  }
  print_stat("Duration", &format_duration(Duration::from_millis(elapsed)));
}

/// Artifact counts over every processed variant.
#[derive(Debug, Default, PartialEq, Eq)]
struct FileTotals {
  copied: usize,
  missing: usize,
  failed: usize,
}

impl FileTotals {
  fn of(summary: &SyncSummary) -> Self {
    summary.variants.iter().fold(Self::default(), |acc, v| Self {
      copied: acc.copied + v.artifacts.copied(),
      missing: acc.missing + v.artifacts.missing(),
      failed: acc.failed + v.artifacts.failed(),
    })
  }
}

fn exit_code(summary: &SyncSummary) -> u8 {
  match &summary.outcome {
    SyncOutcome::Aborted {
      step: Step::Clean | Step::Build,
      ..
    } => exit::TOOLCHAIN,
    SyncOutcome::Aborted { step: Step::Locate, .. } => exit::DISCOVERY,
    SyncOutcome::Completed if !summary.variants_without_artifacts().is_empty() => exit::PARTIAL,
    SyncOutcome::Completed | SyncOutcome::NothingToDo => exit::SUCCESS,
  }
}
