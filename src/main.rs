//! Command-line script skeleton.
//!
//! # Lifecycle
//!
//! ```text
//!  STARTING ──▶ CHECKING_PREREQS ──▶ LOADING_CONFIG ──▶ RUNNING ──▶ DRAINING ──▶ TERMINATED
//!     │               │                   │               │                         ▲
//!     └───────────────┴───────────────────┴───────────────┴─────────────────────────┘
//!                 missing prerequisite / bad config / signal / panic (exit 1)
//! ```
//!
//! Every transition and every exit is logged as one JSON line on stdout.

use std::process::ExitCode;

use clap::Parser;

use script_skeleton::cli::Cli;
use script_skeleton::{Controller, Skeleton};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() { 1 } else { 0 });
        }
    };

    // Panics are reported by the controller as CRITICAL events.
    std::panic::set_hook(Box::new(|_| {}));

    let code = Controller::new(cli.into_options(), Skeleton).run();
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
