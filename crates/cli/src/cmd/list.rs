//! Implementation of the `prebuild list` command.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use prebuild_lib::{FeatureVariant, Orchestrator, ProcessRunner, SyncConfig, SyncError};

use super::exit;
use crate::output::{OutputFormat, print_error, print_info, print_json, symbols};

/// List the variants the `sync` command would process, without building anything.
pub fn cmd_list(config: SyncConfig, output: OutputFormat) -> Result<ExitCode> {
  let orchestrator = Orchestrator::new(config, ProcessRunner);

  let variants = match orchestrator.variants() {
    Ok(variants) => variants,
    Err(e @ SyncError::SnapshotRootMissing(_)) => {
      print_error(&format!("Error: {}", e));
      return Ok(ExitCode::from(exit::CONFIG));
    }
    Err(e) => return Err(e.into()),
  };

  if output.is_json() {
    #[derive(Serialize)]
    struct ListOutput<'a> {
      package: &'a str,
      count: usize,
      variants: &'a [FeatureVariant],
    }

    print_json(&ListOutput {
      package: &orchestrator.config().package,
      count: variants.len(),
      variants: &variants,
    })?;
    return Ok(ExitCode::SUCCESS);
  }

  if variants.is_empty() {
    print_info(&format!(
      "No feature directories found in '{}'",
      orchestrator.config().snapshot_root_path().display()
    ));
    return Ok(ExitCode::SUCCESS);
  }

  for variant in &variants {
    println!(
      "  {} {} {} {} ({})",
      symbols::INFO,
      variant.name,
      symbols::ARROW,
      variant.feature,
      variant.snapshot_dir.display()
    );
  }
  print_info(&format!("{} variant(s) total", variants.len()));

  Ok(ExitCode::SUCCESS)
}
