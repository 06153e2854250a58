//! Process lifecycle controller.
//!
//! # Responsibilities
//! - Own the lifecycle state and record every transition
//! - Install signal dispositions before anything else runs
//! - Sequence prerequisite checks, config loading and the routine
//! - Decide the exit code and report the outcome exactly once
//!
//! # Design Decisions
//! - One thread: a current-thread Tokio runtime drives the whole sequence
//! - Each stage runs inside `interruptible`, so signals are handled at safe
//!   points and a stopping signal skips DRAINING
//! - Panics are caught at this boundary and never propagate further

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::config::{load_config, ConfigMap};
use crate::context::{RunContext, RunOptions};
use crate::error::LifecycleError;
use crate::lifecycle::shutdown::{self, panic_detail};
use crate::lifecycle::signals::{self, interruptible, SignalReceiver};
use crate::lifecycle::startup;
use crate::lifecycle::state::LifecycleState;
use crate::observability::logging;
use crate::task::Routine;

/// Drives one run of the program from STARTING to TERMINATED.
///
/// A controller is single-use: call [`run`](Self::run) or
/// [`run_async`](Self::run_async) once.
pub struct Controller<R> {
    options: RunOptions,
    routine: R,
    signals: Option<SignalReceiver>,
    state: LifecycleState,
    history: Vec<LifecycleState>,
}

impl<R: Routine> Controller<R> {
    pub fn new(options: RunOptions, routine: R) -> Self {
        Self {
            options,
            routine,
            signals: None,
            state: LifecycleState::Starting,
            history: vec![LifecycleState::Starting],
        }
    }

    /// Use `signals` instead of registering OS handlers.
    pub fn with_signals(mut self, signals: SignalReceiver) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Every state visited so far, in order.
    pub fn history(&self) -> &[LifecycleState] {
        &self.history
    }

    /// Install the global log sinks, then run the lifecycle to completion.
    ///
    /// Returns the process exit code.
    pub fn run(mut self) -> i32 {
        if let Err(err) = logging::init(&self.options.log_options()) {
            return self.finish(Err(err));
        }

        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => return self.finish(Err(LifecycleError::Runtime(e))),
        };

        runtime.block_on(self.run_async())
    }

    /// Run the lifecycle on the current runtime, logging through whatever
    /// subscriber is active. Returns the process exit code.
    pub async fn run_async(&mut self) -> i32 {
        let outcome = AssertUnwindSafe(self.drive())
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(LifecycleError::UnhandledFault {
                    detail: panic_detail(payload.as_ref()),
                })
            });

        self.finish(outcome)
    }

    async fn drive(&mut self) -> Result<(), LifecycleError> {
        let mut rx = match self.signals.take() {
            Some(rx) => rx,
            None => signals::install().map_err(LifecycleError::SignalSetup)?,
        };

        self.transition(LifecycleState::CheckingPrereqs);
        interruptible(&mut rx, async {
            if self.options.debug_env {
                startup::debug_env();
            }
            if self.options.require_root {
                startup::check_root()?;
            }
            startup::check_prerequisites(&self.options.required_binaries)
        })
        .await?;

        self.transition(LifecycleState::LoadingConfig);
        let config = interruptible(&mut rx, async {
            match &self.options.config {
                Some(path) => {
                    let config = load_config(path)?;
                    tracing::info!(path = %path.display(), keys = config.len() as u64, "config loaded");
                    Ok::<_, LifecycleError>(config)
                }
                None => {
                    tracing::debug!("no config file specified, using defaults");
                    Ok(ConfigMap::new())
                }
            }
        })
        .await?;

        self.transition(LifecycleState::Running);
        let ctx = RunContext::new(&self.options, &config);
        let executed = interruptible(&mut rx, async {
            self.routine
                .execute(&ctx)
                .await
                .map_err(LifecycleError::ExecutionFault)
        })
        .await;

        let executed = match executed {
            Err(err) if err.is_signal() => return Err(err),
            Ok(()) => signals::checkpoint(&mut rx).await,
            fault => fault,
        };

        self.transition(LifecycleState::Draining);
        executed
    }

    fn finish(&mut self, outcome: Result<(), LifecycleError>) -> i32 {
        let code = shutdown::report(&outcome);
        self.transition(LifecycleState::Terminated);
        code
    }

    fn transition(&mut self, next: LifecycleState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal lifecycle transition {} → {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "lifecycle transition");
        self.state = next;
        self.history.push(next);
    }
}
