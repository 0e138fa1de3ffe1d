//! Build script output discovery.
//!
//! Cargo writes build script output to `<target>/<profile>/build/<package>-<hash>/out`,
//! with a hash that cannot be predicted from outside. Stale directories from
//! earlier builds may sit next to the current one, so the most recently
//! modified candidate is taken. The orchestrator cleans before every build,
//! which normally leaves exactly one.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, warn};

/// Why no output directory could be returned.
#[derive(Debug, Error)]
pub enum LocateError {
  #[error("package name must not be empty")]
  EmptyPackage,

  #[error("build directory '{0}' does not exist")]
  BuildDirMissing(PathBuf),

  #[error("no build directories found for package '{package}' in '{build_dir}'")]
  NoCandidates { package: String, build_dir: PathBuf },

  #[error("'{out_dir_name}' subdirectory not found in '{candidate}'")]
  OutDirMissing { candidate: PathBuf, out_dir_name: String },

  #[error("failed to read build directory '{path}': {source}")]
  Read { path: PathBuf, source: io::Error },
}

/// A `<package>-<hash>` directory and its modification time.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
  path: PathBuf,
  modified: SystemTime,
}

/// Find the output directory of the newest build of `package` under `build_dir`.
///
/// Never touches the filesystem beyond reading it.
pub fn locate_out_dir(build_dir: &Path, package: &str, out_dir_name: &str) -> Result<PathBuf, LocateError> {
  if package.is_empty() {
    return Err(LocateError::EmptyPackage);
  }

  if !build_dir.is_dir() {
    return Err(LocateError::BuildDirMissing(build_dir.to_path_buf()));
  }

  let candidates = find_candidates(build_dir, package)?;
  debug!(package, count = candidates.len(), "found build directory candidates");

  let latest = select_latest(candidates).ok_or_else(|| LocateError::NoCandidates {
    package: package.to_string(),
    build_dir: build_dir.to_path_buf(),
  })?;
  debug!(path = %latest.path.display(), "selected build directory");

  let out_dir = latest.path.join(out_dir_name);
  if !out_dir.is_dir() {
    return Err(LocateError::OutDirMissing {
      candidate: latest.path,
      out_dir_name: out_dir_name.to_string(),
    });
  }

  Ok(out_dir)
}

/// Whether `name` is `<package>-<hex hash>`.
///
/// Requiring a pure hex suffix keeps `musb-readconf-1a2b` from counting as a
/// build of `musb`.
fn is_build_dir_of(name: &str, package: &str) -> bool {
  name
    .strip_prefix(package)
    .and_then(|rest| rest.strip_prefix('-'))
    .is_some_and(|hash| !hash.is_empty() && hash.chars().all(|c| c.is_ascii_hexdigit()))
}

fn find_candidates(build_dir: &Path, package: &str) -> Result<Vec<Candidate>, LocateError> {
  let entries = fs::read_dir(build_dir).map_err(|source| LocateError::Read {
    path: build_dir.to_path_buf(),
    source,
  })?;

  let mut candidates = Vec::new();
  for entry in entries {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) => {
        warn!(path = %build_dir.display(), error = %e, "failed to read build directory entry");
        continue;
      }
    };
    let matches = entry
      .file_name()
      .to_str()
      .is_some_and(|name| is_build_dir_of(name, package));
    if !matches {
      continue;
    }

    let path = entry.path();
    let metadata = match fs::metadata(&path) {
      Ok(metadata) => metadata,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "skipping unreadable build directory candidate");
        continue;
      }
    };
    if !metadata.is_dir() {
      continue;
    }

    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    candidates.push(Candidate { path, modified });
  }

  Ok(candidates)
}

/// Newest candidate; equal times fall back to the greatest path.
fn select_latest(candidates: Vec<Candidate>) -> Option<Candidate> {
  candidates.into_iter().max_by(compare_candidates)
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
  a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path))
}
