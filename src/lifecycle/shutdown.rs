//! Outcome reporting and exit codes.
//!
//! # Responsibilities
//! - Log the final outcome exactly once
//! - Map the outcome to the process exit code
//! - Turn a caught panic payload into a fault detail

use std::any::Any;

use crate::config::ConfigError;
use crate::critical;
use crate::error::LifecycleError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Log the outcome of a run and return its exit code.
pub fn report(outcome: &Result<(), LifecycleError>) -> i32 {
    match outcome {
        Ok(()) => {
            tracing::info!("process completed successfully");
            EXIT_SUCCESS
        }
        Err(err) => {
            log_failure(err);
            EXIT_FAILURE
        }
    }
}

fn log_failure(err: &LifecycleError) {
    let kind = err.kind();
    match err {
        LifecycleError::MissingPrerequisite { missing } => critical!(
            error = kind,
            missing = %missing.join(", "),
            count = missing.len() as u64,
            "missing required binaries"
        ),
        LifecycleError::NotRoot => critical!(error = kind, "this script must be run as root"),
        LifecycleError::Config(config_err) => {
            let path = config_err.path().display();
            match config_err {
                ConfigError::NotFound { .. } => {
                    critical!(error = kind, path = %path, "config file not found")
                }
                ConfigError::Read { source, .. } => {
                    critical!(error = kind, path = %path, fault = %source, "config file unreadable")
                }
                _ => critical!(error = kind, path = %path, fault = %config_err, "invalid config file"),
            }
        }
        LifecycleError::LogSinkSetup { path, source } => critical!(
            error = kind,
            path = %path.display(),
            fault = %source,
            "failed to open log file"
        ),
        LifecycleError::SignalSetup(source) => {
            critical!(error = kind, fault = %source, "failed to install signal handlers")
        }
        LifecycleError::Runtime(source) => {
            critical!(error = kind, fault = %source, "failed to build runtime")
        }
        LifecycleError::ExecutionFault(source) => {
            critical!(error = kind, fault = %source, "execution failed")
        }
        LifecycleError::UnhandledFault { detail } => {
            critical!(error = kind, fault = %detail, "unhandled fault")
        }
        LifecycleError::SignalInterrupt { signal } => {
            tracing::warn!(error = kind, signal = %signal, "terminated by signal")
        }
        LifecycleError::UnexpectedSignal { signal } => {
            critical!(error = kind, signal = %signal, "terminating on unknown signal")
        }
    }
}

/// Describe a panic payload.
pub fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
