mod cmd;
mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use prebuild_lib::{ConfigOverrides, Profile, SyncConfig};

use crate::output::{OutputFormat, print_error};

/// prebuild - Refresh the per-feature prebuilt build script output of a package
#[derive(Parser)]
#[command(name = "prebuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Config file (default: <workspace>/prebuild.toml if present)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Clean, rebuild and capture generated files for every feature variant
  Sync {
    #[command(flatten)]
    args: ConfigArgs,

    /// Only process these variants (repeatable)
    #[arg(long, value_name = "VARIANT")]
    only: Vec<String>,
  },

  /// List the feature variants found in the prebuild directory
  List {
    #[command(flatten)]
    args: ConfigArgs,
  },
}

/// Settings shared by every subcommand. Flags override the config file.
#[derive(Args, Debug)]
struct ConfigArgs {
  /// Workspace directory the toolchain runs in
  #[arg(short = 'C', long, default_value = ".")]
  workspace: PathBuf,

  /// Package whose build script output is captured
  #[arg(long)]
  package: Option<String>,

  /// Directory holding one subdirectory per variant
  #[arg(long)]
  snapshot_root: Option<PathBuf>,

  /// Cargo target directory
  #[arg(long)]
  target_dir: Option<PathBuf>,

  /// Capture artifacts from a release build
  #[arg(long)]
  release: bool,

  /// Toolchain program to invoke
  #[arg(long)]
  cargo: Option<String>,

  /// Artifact file name to copy (repeatable, replaces the configured list)
  #[arg(long = "artifact", value_name = "FILE")]
  artifacts: Vec<String>,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  output: OutputFormat,
}

impl ConfigArgs {
  fn load(&self, config_file: Option<&Path>) -> Result<SyncConfig> {
    let config = SyncConfig::load(&self.workspace, config_file).context("Failed to load configuration")?;

    let overrides = ConfigOverrides {
      package: self.package.clone(),
      snapshot_root: self.snapshot_root.clone(),
      target_dir: self.target_dir.clone(),
      profile: self.release.then_some(Profile::Release),
      cargo: self.cargo.clone(),
      artifacts: (!self.artifacts.is_empty()).then(|| self.artifacts.clone()),
    };

    Ok(config.with_overrides(overrides))
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);
  debug!(version = env!("CARGO_PKG_VERSION"), "prebuild starting");

  let config_file = cli.config.as_deref();
  let result = match cli.command {
    Commands::Sync { args, only } => args
      .load(config_file)
      .and_then(|config| cmd::cmd_sync(config, only, args.output)),
    Commands::List { args } => args.load(config_file).and_then(|config| cmd::cmd_list(config, args.output)),
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::from(cmd::exit::FAILURE)
    }
  }
}

fn init_logging(verbose: bool) {
  let filter = if std::env::var_os("RUST_LOG").is_some() {
    EnvFilter::from_default_env()
  } else if verbose {
    EnvFilter::new("prebuild=debug,prebuild_lib=debug")
  } else {
    EnvFilter::new("error")
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
