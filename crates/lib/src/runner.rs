//! Toolchain command execution.
//!
//! Commands run to completion before the caller continues: output is captured
//! (not streamed) and only surfaced when the command fails. There is no
//! timeout, so a hung build blocks the run.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors from running a toolchain command.
#[derive(Debug, Error)]
pub enum RunError {
  /// The program could not be found on the search path.
  #[error("command '{program}' not found. Is it installed and in your PATH?")]
  NotFound { program: String },

  /// The program ran and exited unsuccessfully.
  #[error("{description} failed with exit code {code:?}")]
  Failed {
    description: String,
    code: Option<i32>,
    stderr: String,
  },

  /// The program could not be started for another reason.
  #[error("failed to start '{program}': {source}")]
  Spawn { program: String, source: io::Error },
}

impl RunError {
  /// Captured standard error of a failed command.
  pub fn stderr(&self) -> Option<&str> {
    match self {
      RunError::Failed { stderr, .. } => Some(stderr),
      _ => None,
    }
  }
}

/// A program invocation: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
  program: String,
  args: Vec<String>,
  current_dir: Option<PathBuf>,
}

impl ToolCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      current_dir: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.current_dir = Some(dir.into());
    self
  }

  #[cfg(test)]
  pub(crate) fn program(&self) -> &str {
    &self.program
  }

  pub fn get_args(&self) -> &[String] {
    &self.args
  }

  pub fn get_current_dir(&self) -> Option<&Path> {
    self.current_dir.as_deref()
  }
}

impl fmt::Display for ToolCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.program)?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Executes toolchain commands on behalf of the orchestrator.
pub trait CommandRunner {
  /// Run `command` to completion. `description` names the step in errors.
  fn run(&mut self, command: &ToolCommand, description: &str) -> Result<(), RunError>;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
  fn run(&mut self, command: &ToolCommand, description: &str) -> Result<(), RunError> {
    let mut process = Command::new(&command.program);
    process.args(&command.args);

    if let Some(dir) = &command.current_dir {
      // A missing cwd makes spawn fail with NotFound, which would be misreported
      // as a missing program.
      if !dir.is_dir() {
        return Err(RunError::Spawn {
          program: command.program.clone(),
          source: io::Error::new(
            io::ErrorKind::NotFound,
            format!("working directory {} does not exist", dir.display()),
          ),
        });
      }
      process.current_dir(dir);
    }

    debug!(command = %command, cwd = ?command.current_dir, "spawning process");

    let output = process.output().map_err(|e| match e.kind() {
      io::ErrorKind::NotFound => RunError::NotFound {
        program: command.program.clone(),
      },
      _ => RunError::Spawn {
        program: command.program.clone(),
        source: e,
      },
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }

    if !output.status.success() {
      return Err(RunError::Failed {
        description: description.to_string(),
        code: output.status.code(),
        stderr: stderr.into_owned(),
      });
    }

    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }

    Ok(())
  }
}
