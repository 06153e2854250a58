//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for INT, TERM, QUIT, ABRT, HUP and ALRM
//! - Forward deliveries into a channel the controller polls
//! - Apply the disposition table at safe points
//!
//! # Disposition Table
//! ```text
//! INT, TERM, QUIT, ABRT → WARNING, then terminate (exit 1)
//! HUP, ALRM             → WARNING, keep going
//! anything else         → CRITICAL, terminate (exit 1)
//! ```
//!
//! # Design Decisions
//! - Uses Tokio's signal handling; no work happens in signal context
//! - Signals are only acted on at safe points, never mid-write
//! - The same channel accepts injected signals, so tests drive it directly

use std::fmt;
use std::future::Future;
use std::io;

use tokio::sync::mpsc;

use crate::error::LifecycleError;

/// Signals the controller knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Interrupt,
    Terminate,
    Quit,
    Abort,
    Hangup,
    Alarm,
    /// Any other raw signal number.
    Other(i32),
}

/// What the controller does when a signal arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Log a warning and terminate with exit code 1.
    Terminate,
    /// Log a warning and continue.
    Notify,
    /// Log a critical event and terminate with exit code 1.
    Fatal,
}

impl Signal {
    /// Signals with a registered OS handler.
    pub const HANDLED: [Signal; 6] = [
        Signal::Interrupt,
        Signal::Terminate,
        Signal::Hangup,
        Signal::Quit,
        Signal::Abort,
        Signal::Alarm,
    ];

    pub fn disposition(&self) -> Disposition {
        match self {
            Signal::Interrupt | Signal::Terminate | Signal::Quit | Signal::Abort => {
                Disposition::Terminate
            }
            Signal::Hangup | Signal::Alarm => Disposition::Notify,
            Signal::Other(_) => Disposition::Fatal,
        }
    }

    #[cfg(unix)]
    pub fn from_raw(raw: i32) -> Self {
        use nix::sys::signal::Signal as Sys;

        match Sys::try_from(raw) {
            Ok(Sys::SIGINT) => Signal::Interrupt,
            Ok(Sys::SIGTERM) => Signal::Terminate,
            Ok(Sys::SIGQUIT) => Signal::Quit,
            Ok(Sys::SIGABRT) => Signal::Abort,
            Ok(Sys::SIGHUP) => Signal::Hangup,
            Ok(Sys::SIGALRM) => Signal::Alarm,
            _ => Signal::Other(raw),
        }
    }

    #[cfg(unix)]
    pub fn as_raw(&self) -> i32 {
        use nix::sys::signal::Signal as Sys;

        match self {
            Signal::Interrupt => Sys::SIGINT as i32,
            Signal::Terminate => Sys::SIGTERM as i32,
            Signal::Quit => Sys::SIGQUIT as i32,
            Signal::Abort => Sys::SIGABRT as i32,
            Signal::Hangup => Sys::SIGHUP as i32,
            Signal::Alarm => Sys::SIGALRM as i32,
            Signal::Other(raw) => *raw,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => f.write_str("INT"),
            Signal::Terminate => f.write_str("TERM"),
            Signal::Quit => f.write_str("QUIT"),
            Signal::Abort => f.write_str("ABRT"),
            Signal::Hangup => f.write_str("HUP"),
            Signal::Alarm => f.write_str("ALRM"),
            Signal::Other(raw) => write!(f, "UNKNOWN({raw})"),
        }
    }
}

pub type SignalSender = mpsc::UnboundedSender<Signal>;
pub type SignalReceiver = mpsc::UnboundedReceiver<Signal>;

/// Create an empty signal channel.
pub fn channel() -> (SignalSender, SignalReceiver) {
    mpsc::unbounded_channel()
}

/// Register OS handlers and forward every delivery into a new channel.
///
/// Must be called from within a Tokio runtime. Registration replaces the
/// default disposition for the handled signals for the rest of the process.
#[cfg(unix)]
pub fn install() -> io::Result<SignalReceiver> {
    use tokio::signal::unix::{signal, SignalKind};

    let (tx, rx) = channel();
    for sig in Signal::HANDLED {
        let mut stream = signal(SignalKind::from_raw(sig.as_raw()))?;
        let tx = tx.clone();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                if tx.send(sig).is_err() {
                    break;
                }
            }
        });
    }
    tracing::debug!("signal handlers installed");
    Ok(rx)
}

#[cfg(not(unix))]
pub fn install() -> io::Result<SignalReceiver> {
    let (tx, rx) = channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(Signal::Interrupt).is_err() {
                break;
            }
        }
    });
    tracing::debug!("signal handlers installed");
    Ok(rx)
}

/// Apply the disposition for one signal. `Err` means the process must stop.
fn apply(signal: Signal) -> Result<(), LifecycleError> {
    match signal.disposition() {
        Disposition::Notify => {
            tracing::warn!(signal = %signal, "signal received");
            Ok(())
        }
        Disposition::Terminate => Err(LifecycleError::SignalInterrupt { signal }),
        Disposition::Fatal => Err(LifecycleError::UnexpectedSignal { signal }),
    }
}

/// Yields needed on a current-thread runtime before a raised signal reaches
/// the channel. The driver dispatches on one tick and the forwarder sends on
/// the next.
const SETTLE_YIELDS: usize = 3;

/// Give the signal driver and forwarding tasks a chance to run.
///
/// Synchronous work never yields, so signals raised during it are still in
/// the driver until this runs.
async fn settle() {
    for _ in 0..SETTLE_YIELDS {
        tokio::task::yield_now().await;
    }
}

/// Run `stage` until it completes or a stopping signal arrives.
///
/// Pending signals are handled before the stage is polled. A stopping signal
/// drops the stage future, so no further stage code runs.
pub async fn interruptible<F, T>(signals: &mut SignalReceiver, stage: F) -> Result<T, LifecycleError>
where
    F: Future<Output = Result<T, LifecycleError>>,
{
    settle().await;

    tokio::pin!(stage);
    loop {
        tokio::select! {
            biased;
            Some(signal) = signals.recv() => apply(signal)?,
            out = &mut stage => return out,
        }
    }
}

/// Safe point between stages: deliver anything raised so far, then apply it.
pub async fn checkpoint(signals: &mut SignalReceiver) -> Result<(), LifecycleError> {
    settle().await;
    drain_pending(signals)
}

/// Handle every signal already queued without waiting for more.
pub fn drain_pending(signals: &mut SignalReceiver) -> Result<(), LifecycleError> {
    while let Ok(signal) = signals.try_recv() {
        apply(signal)?;
    }
    Ok(())
}
