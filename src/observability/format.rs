//! JSON-lines event format.
//!
//! Each `tracing` event becomes one [`LogEvent`], serialized as a single line:
//!
//! ```text
//! {"time":"2026-01-01T00:00:00.000Z","level":"INFO","logger":"script-skeleton","message":"config loaded","path":"app.json"}
//! ```
//!
//! # Field Rules
//! - `message` is the event's message
//! - `severity = "CRITICAL"` raises the level to CRITICAL and is not emitted as a field
//! - `fault` becomes the event's fault detail
//! - any other caller field named `time`, `level`, `logger`, `message` or `fault`
//!   is renamed to `field_<name>`; the reserved field always wins
//! - a field whose name is already taken is prefixed with `field_` again until
//!   it is free; the first field keeps its name

use std::fmt::{self, Write as _};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Field names owned by the record itself.
pub const RESERVED_FIELDS: [&str; 5] = ["time", "level", "logger", "message", "fault"];

/// Prefix applied to caller fields that collide with [`RESERVED_FIELDS`].
pub const RENAMED_FIELD_PREFIX: &str = "field_";

/// Log levels as they appear in the `level` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DEBUG" => Some(Severity::Debug),
            "INFO" => Some(Severity::Info),
            "WARNING" => Some(Severity::Warning),
            "ERROR" => Some(Severity::Error),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl From<&Level> for Severity {
    fn from(level: &Level) -> Self {
        match *level {
            Level::TRACE | Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Info,
            Level::WARN => Severity::Warning,
            Level::ERROR => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured log record.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub time: String,
    pub level: Severity,
    pub logger: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl LogEvent {
    /// Create an event stamped with the current UTC time.
    pub fn new(level: Severity, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            logger: logger.into(),
            message: message.into(),
            fault: None,
            extra: Map::new(),
        }
    }

    /// Attach a caller field, renaming it if it collides with a reserved name.
    ///
    /// A field that lands on a name already taken is prefixed again, so no
    /// earlier field is ever overwritten.
    pub fn insert_extra(&mut self, key: &str, value: Value) {
        let mut key = if RESERVED_FIELDS.contains(&key) {
            format!("{RENAMED_FIELD_PREFIX}{key}")
        } else {
            key.to_owned()
        };
        while self.extra.contains_key(&key) {
            key = format!("{RENAMED_FIELD_PREFIX}{key}");
        }
        self.extra.insert(key, value);
    }

    /// Serialize as one line of JSON, without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Collects the fields of a `tracing` event.
#[derive(Default)]
struct EventVisitor {
    message: String,
    severity: Option<Severity>,
    fault: Option<String>,
    extra: Vec<(&'static str, Value)>,
}

impl EventVisitor {
    fn record_value(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => {
                self.message = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                }
            }
            "severity" => match value.as_str().and_then(Severity::parse) {
                Some(severity) => self.severity = Some(severity),
                None => self.extra.push(("severity", value)),
            },
            "fault" => {
                self.fault = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
            }
            name => self.extra.push((name, value)),
        }
    }

    fn into_event(self, level: &Level, logger: &str) -> LogEvent {
        let mut event = LogEvent::new(
            self.severity.unwrap_or_else(|| Severity::from(level)),
            logger,
            self.message,
        );
        event.fault = self.fault;
        for (key, value) in self.extra {
            event.insert_extra(key, value);
        }
        event
    }
}

impl Visit for EventVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.record_value(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, Value::from(format!("{value:?}")));
    }
}

/// `tracing-subscriber` event formatter producing one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonLines {
    logger: String,
}

impl JsonLines {
    /// `logger` is written as the `logger` field of every record.
    pub fn new(logger: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonLines
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let record = visitor.into_event(event.metadata().level(), &self.logger);
        let line = record.to_json_line().map_err(|_| fmt::Error)?;
        writer.write_str(&line)?;
        writer.write_char('\n')
    }
}
