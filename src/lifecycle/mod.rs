//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Controller (controller.rs):
//!     Install signals → Check prereqs → Load config → Run routine → Drain → Exit
//!
//! Startup (startup.rs):
//!     Required binaries on PATH, optional root check, optional env dump
//!
//! Signals (signals.rs):
//!     INT/TERM/QUIT/ABRT → terminate (exit 1)
//!     HUP/ALRM → warning only
//!
//! Shutdown (shutdown.rs):
//!     Outcome → one log event → exit code
//! ```
//!
//! # Design Decisions
//! - Ordered startup: signals first, then prerequisites, then config
//! - Fail fast: every startup error is fatal
//! - Exactly one event explains every exit

pub mod controller;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use controller::Controller;
pub use signals::Signal;
pub use state::LifecycleState;
