//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global subscriber (stdout plus optional log file)
//! - Provide the `critical!` macro for CRITICAL events
//! - Pick the level from `--verbose` or `RUST_LOG`
//!
//! # Design Decisions
//! - Uses the tracing crate; every sink shares the `JsonLines` format
//! - A line is formatted in full before it is written, so sinks never see
//!   partial records
//! - The log file is opened before anything is installed; if that fails the
//!   stdout sink is still installed so the failure can be reported

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::format::DefaultFields;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::LifecycleError;
use crate::observability::format::JsonLines;

/// Emit an event at CRITICAL severity.
///
/// Accepts the same arguments as `tracing::error!`.
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        $crate::observability::logging::__tracing::error!(severity = "CRITICAL", $($arg)+)
    };
}

#[doc(hidden)]
pub use tracing as __tracing;

/// Sink configuration.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Value of the `logger` field.
    pub logger: String,
    /// Emit DEBUG events.
    pub verbose: bool,
    /// Secondary sink, appended to.
    pub file: Option<PathBuf>,
}

impl LogOptions {
    fn default_directive(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Build a fmt layer that writes JSON lines to `writer`.
pub fn json_layer<S, W>(logger: &str, writer: W) -> fmt::Layer<S, DefaultFields, JsonLines, W>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .event_format(JsonLines::new(logger))
        .with_writer(writer)
}

/// Open the secondary log file for appending, creating it if needed.
pub fn open_log_file(path: &Path) -> Result<File, LifecycleError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LifecycleError::LogSinkSetup {
            path: path.to_path_buf(),
            source,
        })
}

/// Install the global subscriber.
///
/// Returns `LogSinkSetup` if the log file could not be opened; stdout logging
/// is active either way. A subscriber installed earlier is left in place.
pub fn init(options: &LogOptions) -> Result<(), LifecycleError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    let (file, failure) = match options.file.as_deref().map(open_log_file).transpose() {
        Ok(file) => (file, None),
        Err(e) => (None, Some(e)),
    };
    let file_layer = file.map(|f| json_layer(&options.logger, Mutex::new(f)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer(&options.logger, io::stdout))
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already installed, keeping it");
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;
    use tracing_subscriber::filter::LevelFilter;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn layer_writes_one_line_per_event() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::DEBUG)
            .with(json_layer("unit", buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(path = "app.json", "config loaded");
            tracing::warn!(signal = "HUP", "signal received");
            crate::critical!(missing = "jq, curl", count = 2u64, "missing required binaries");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["logger"], "unit");
        assert_eq!(lines[0]["path"], "app.json");
        assert_eq!(lines[1]["level"], "WARNING");
        assert_eq!(lines[2]["level"], "CRITICAL");
        assert_eq!(lines[2]["count"], 2);
        assert!(lines[2].get("severity").is_none());
    }

    #[test]
    fn caller_fields_never_replace_record_fields() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::DEBUG)
            .with(json_layer("unit", buffer.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(time = "t", level = "l", logger = "other", "msg");
            tracing::info!(field_level = "caller", level = "spoofed", "msg");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["logger"], "unit");
        assert_ne!(lines[0]["time"], "t");
        assert_eq!(lines[0]["field_time"], "t");
        assert_eq!(lines[0]["field_level"], "l");
        assert_eq!(lines[0]["field_logger"], "other");

        assert_eq!(lines[1]["level"], "INFO");
        assert_eq!(lines[1]["field_level"], "caller");
        assert_eq!(lines[1]["field_field_level"], "spoofed");
    }

    #[test]
    fn unopenable_log_file_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.log");

        let err = open_log_file(&path).unwrap_err();
        assert!(matches!(err, LifecycleError::LogSinkSetup { .. }));
    }

    #[test]
    fn log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.log");
        std::fs::write(&path, "existing\n").unwrap();

        let mut file = open_log_file(&path).unwrap();
        file.write_all(b"next\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\nnext\n");
    }
}
