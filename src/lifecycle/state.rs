//! Process lifecycle state machine.
//!
//! # States
//! - Starting: signal dispositions being installed
//! - CheckingPrereqs: required binaries (and root) being verified
//! - LoadingConfig: config file being read
//! - Running: execution routine in flight
//! - Draining: routine returned, outcome being reported
//! - Terminated: exit code decided
//!
//! # State Transitions
//! ```text
//! Starting → CheckingPrereqs → LoadingConfig → Running → Draining → Terminated
//! any non-terminal state → Terminated: failure, signal or fault
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Starting,
    CheckingPrereqs,
    LoadingConfig,
    Running,
    Draining,
    Terminated,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Starting => "STARTING",
            LifecycleState::CheckingPrereqs => "CHECKING_PREREQS",
            LifecycleState::LoadingConfig => "LOADING_CONFIG",
            LifecycleState::Running => "RUNNING",
            LifecycleState::Draining => "DRAINING",
            LifecycleState::Terminated => "TERMINATED",
        }
    }

    /// Whether the machine may move from `self` to `next`.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::{CheckingPrereqs, Draining, LoadingConfig, Running, Starting, Terminated};

        matches!(
            (self, next),
            (Starting, CheckingPrereqs)
                | (CheckingPrereqs, LoadingConfig)
                | (LoadingConfig, Running)
                | (Running, Draining)
        ) || (self != Terminated && next == Terminated)
    }

    pub fn is_terminal(self) -> bool {
        self == LifecycleState::Terminated
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
