//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use script_skeleton::observability::json_layer;
use serde_json::Value;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;

/// In-memory log sink using the production JSON format.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Subscriber writing DEBUG and above into this buffer.
    pub fn subscriber(&self) -> impl Subscriber + Send + Sync {
        tracing_subscriber::registry()
            .with(LevelFilter::DEBUG)
            .with(json_layer("test", self.clone()))
    }

    /// Every record captured so far, parsed.
    pub fn events(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).expect("log line is not JSON"))
            .collect()
    }

    /// Records at one level (`"INFO"`, `"WARNING"`, `"CRITICAL"`, ...).
    pub fn at_level(&self, level: &str) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter(|event| event["level"] == level)
            .collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|event| event["message"].as_str().map(str::to_owned))
            .collect()
    }

    /// Whether any record came from the execution stage.
    pub fn has_execution_events(&self) -> bool {
        self.messages()
            .iter()
            .any(|m| m == "executing" || m.starts_with("dry run:") || m == "bar executed")
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
