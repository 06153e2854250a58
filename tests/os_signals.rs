//! Real OS signal delivery.
//!
//! Kept in its own test binary with a single test: raised signals reach every
//! registered listener in the process.

#![cfg(unix)]

use std::time::Duration;

use nix::sys::signal::{kill, raise, Signal as Sys};
use nix::unistd::getpid;
use script_skeleton::lifecycle::LifecycleState::Draining;
use script_skeleton::{Controller, ExecutionError, Routine, RunContext, RunOptions};

mod common;
use common::CapturedLogs;

struct Raise {
    signal: Sys,
    wait: Option<Duration>,
}

impl Routine for Raise {
    async fn execute(&self, _ctx: &RunContext<'_>) -> Result<(), ExecutionError> {
        raise(self.signal)?;
        match self.wait {
            Some(wait) => tokio::time::sleep(wait).await,
            None => std::future::pending::<()>().await,
        }
        Ok(())
    }
}

/// Blocks the runtime thread while another thread signals the process.
struct BlockingWork {
    signal: Sys,
}

impl Routine for BlockingWork {
    async fn execute(&self, _ctx: &RunContext<'_>) -> Result<(), ExecutionError> {
        let signal = self.signal;
        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            kill(getpid(), signal)
        });
        std::thread::sleep(Duration::from_millis(300));
        sender.join().map_err(|_| "signal thread panicked")??;
        Ok(())
    }
}

fn options() -> RunOptions {
    RunOptions {
        required_binaries: Vec::new(),
        ..Default::default()
    }
}

#[tokio::test]
async fn os_signals_follow_disposition_table() {
    // SIGHUP: warning only, run completes.
    {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let routine = Raise {
            signal: Sys::SIGHUP,
            wait: Some(Duration::from_millis(200)),
        };
        let mut controller = Controller::new(options(), routine);

        assert_eq!(controller.run_async().await, 0);

        let warnings = logs.at_level("WARNING");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0]["signal"], "HUP");
    }

    // SIGTERM: stops a routine that would otherwise never return.
    {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let routine = Raise {
            signal: Sys::SIGTERM,
            wait: None,
        };
        let mut controller = Controller::new(options(), routine);

        let code = tokio::time::timeout(Duration::from_secs(5), controller.run_async())
            .await
            .expect("SIGTERM did not stop the run");
        assert_eq!(code, 1);
        assert!(!controller.history().contains(&Draining));

        let warnings = logs.at_level("WARNING");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0]["message"], "terminated by signal");
        assert_eq!(warnings[0]["signal"], "TERM");
    }

    // SIGTERM while the routine blocks without yielding: still bypasses DRAINING.
    {
        let logs = CapturedLogs::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let routine = BlockingWork {
            signal: Sys::SIGTERM,
        };
        let mut controller = Controller::new(options(), routine);

        assert_eq!(controller.run_async().await, 1);
        assert!(!controller.history().contains(&Draining));
        assert!(controller.state().is_terminal());

        let warnings = logs.at_level("WARNING");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0]["signal"], "TERM");
        assert!(!logs
            .messages()
            .contains(&"process completed successfully".to_string()));
    }
}
