//! Command-line script skeleton.
//!
//! A starting point for small operational programs: JSON-lines logging, a
//! config loader, prerequisite checks, signal handling and a placeholder
//! routine, driven by a single lifecycle controller.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod task;

pub use config::ConfigMap;
pub use context::{RunContext, RunOptions};
pub use error::{ExecutionError, LifecycleError};
pub use lifecycle::Controller;
pub use task::{Routine, Skeleton};
