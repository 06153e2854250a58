//! Configuration management.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader.rs (read & parse)
//!     → ConfigMap (plain key → value data, immutable)
//!     → borrowed by the execution routine through RunContext
//! ```
//!
//! # Design Decisions
//! - Config is data only; nothing in the file is ever evaluated
//! - No config path means an empty map (defaults apply)
//! - Missing, unreadable or malformed files are fatal at startup

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::ConfigMap;
