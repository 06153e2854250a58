//! Startup checks.
//!
//! # Responsibilities
//! - Verify every required binary resolves on `PATH`
//! - Optionally require an effective uid of 0
//! - Optionally dump the environment at DEBUG
//!
//! # Design Decisions
//! - Fail fast: any missing prerequisite is fatal
//! - All missing binaries are reported together, not one at a time

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::error::LifecycleError;

/// Binaries required by the skeleton itself.
pub const DEFAULT_REQUIRED_BINARIES: &[&str] = &["sh"];

/// Locate `name` the way a shell would.
///
/// Names containing a path separator are checked directly; bare names are
/// searched for in each `PATH` entry.
pub fn resolve_binary(name: &str) -> Option<PathBuf> {
    resolve_in(name, env::var_os("PATH").as_deref())
}

fn resolve_in(name: &str, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let cwd = env::current_dir().unwrap_or_default();
    which::which_in(name, search_path, cwd).ok()
}

/// Check that every required binary is available.
pub fn check_prerequisites<S: AsRef<str>>(required: &[S]) -> Result<(), LifecycleError> {
    let missing: Vec<String> = required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| resolve_binary(name).is_none())
        .map(str::to_owned)
        .collect();

    if !missing.is_empty() {
        return Err(LifecycleError::MissingPrerequisite { missing });
    }

    tracing::debug!(count = required.len() as u64, "all prerequisites met");
    Ok(())
}

/// Check the process runs with an effective uid of 0.
#[cfg(unix)]
pub fn check_root() -> Result<(), LifecycleError> {
    if nix::unistd::geteuid().is_root() {
        Ok(())
    } else {
        Err(LifecycleError::NotRoot)
    }
}

#[cfg(not(unix))]
pub fn check_root() -> Result<(), LifecycleError> {
    Err(LifecycleError::NotRoot)
}

/// Log every environment variable at DEBUG, sorted by key.
pub fn debug_env() {
    let mut vars: Vec<(String, String)> = env::vars_os()
        .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
        .collect();
    vars.sort();

    for (key, value) in vars {
        tracing::debug!(key = %key, value = %value, "env");
    }
}
