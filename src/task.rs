//! Execution routines.
//!
//! [`Routine`] is the seam where real work plugs in. [`Skeleton`] is the
//! placeholder shipped with the binary: it logs what it would do and reads a
//! single config key.

use std::future::Future;

use serde_json::Value;

use crate::config::ConfigMap;
use crate::context::RunContext;
use crate::error::ExecutionError;

/// Work performed while the lifecycle is RUNNING.
///
/// Returning `Err` is a recoverable fault: the controller drains and exits
/// with 1. A panic is an unhandled fault and is caught by the controller.
pub trait Routine {
    fn execute(&self, ctx: &RunContext<'_>) -> impl Future<Output = Result<(), ExecutionError>>;
}

/// Placeholder routine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Skeleton;

impl Routine for Skeleton {
    async fn execute(&self, ctx: &RunContext<'_>) -> Result<(), ExecutionError> {
        let foo = ctx.options.foo.as_deref().unwrap_or_default();

        if ctx.is_dry_run() {
            tracing::info!(foo = %foo, "dry run: would execute");
            tracing::info!("dry run: would call bar()");
            return Ok(());
        }

        tracing::info!(foo = %foo, "executing");
        bar(ctx.config);
        Ok(())
    }
}

/// Read `BAR` from the config, falling back to `"BAR not set"`.
///
/// Any JSON value is returned as configured.
pub fn bar(config: &ConfigMap) -> Value {
    let value = config
        .get("BAR")
        .cloned()
        .unwrap_or_else(|| Value::from("BAR not set"));
    match value.as_str() {
        Some(text) => tracing::debug!(BAR = %text, "bar executed"),
        None => tracing::debug!(BAR = %value, "bar executed"),
    }
    value
}
