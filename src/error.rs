//! Error taxonomy for the process lifecycle.
//!
//! Every variant is terminal: the controller logs it once and exits with 1.
//! Nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::lifecycle::signals::Signal;

/// Error returned by an execution routine.
pub type ExecutionError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LifecycleError {
    /// One or more required binaries are not on `PATH`.
    #[error("missing required binaries: {}", .missing.join(", "))]
    MissingPrerequisite { missing: Vec<String> },

    #[error("this script must be run as root")]
    NotRoot,

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The secondary log file could not be opened.
    #[error("failed to open log file {}: {source}", .path.display())]
    LogSinkSetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install signal handlers: {0}")]
    SignalSetup(#[source] std::io::Error),

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The execution routine returned an error.
    #[error("execution failed: {0}")]
    ExecutionFault(#[source] ExecutionError),

    /// A panic escaped one of the lifecycle stages.
    #[error("unhandled fault: {detail}")]
    UnhandledFault { detail: String },

    #[error("terminated by signal {signal}")]
    SignalInterrupt { signal: Signal },

    #[error("terminating on unknown signal {signal}")]
    UnexpectedSignal { signal: Signal },
}

impl LifecycleError {
    /// Whether this error came from the signal disposition table.
    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            LifecycleError::SignalInterrupt { .. } | LifecycleError::UnexpectedSignal { .. }
        )
    }

    /// Short machine-readable name, logged as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleError::MissingPrerequisite { .. } => "missing_prerequisite",
            LifecycleError::NotRoot => "not_root",
            LifecycleError::Config(ConfigError::NotFound { .. }) => "config_not_found",
            LifecycleError::Config(ConfigError::Read { .. }) => "config_unreadable",
            LifecycleError::Config(_) => "config_parse_error",
            LifecycleError::LogSinkSetup { .. } => "log_sink_setup",
            LifecycleError::SignalSetup(_) => "signal_setup",
            LifecycleError::Runtime(_) => "runtime",
            LifecycleError::ExecutionFault(_) => "execution_fault",
            LifecycleError::UnhandledFault { .. } => "unhandled_fault",
            LifecycleError::SignalInterrupt { .. } => "signal_interrupt",
            LifecycleError::UnexpectedSignal { .. } => "unexpected_signal",
        }
    }
}
