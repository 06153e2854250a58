//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controller, routine, collaborators:
//!     → tracing macros (info!, warn!, critical!, ...)
//!     → format.rs (JsonLines: event → LogEvent → one JSON line)
//!     → logging.rs sinks (stdout, optional log file)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - One record per line, written whole
//! - Reserved fields cannot be overwritten by caller fields

pub mod format;
pub mod logging;

pub use format::{JsonLines, LogEvent, Severity};
pub use logging::{init, json_layer, LogOptions};
