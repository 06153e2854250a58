//! Run options and the per-run context handed to collaborators.

use std::path::PathBuf;

use crate::config::ConfigMap;
use crate::lifecycle::startup::DEFAULT_REQUIRED_BINARIES;
use crate::observability::LogOptions;

/// Already-validated options for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Name of the program, used as the `logger` field.
    pub script_name: String,
    /// Config file to load. `None` means defaults.
    pub config: Option<PathBuf>,
    /// Placeholder value passed through to the routine.
    pub foo: Option<String>,
    pub verbose: bool,
    pub dry_run: bool,
    /// Secondary log sink.
    pub log_file: Option<PathBuf>,
    /// Binaries that must resolve on `PATH`.
    pub required_binaries: Vec<String>,
    pub require_root: bool,
    /// Log every environment variable at DEBUG during startup.
    pub debug_env: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            script_name: env!("CARGO_PKG_NAME").to_string(),
            config: None,
            foo: None,
            verbose: false,
            dry_run: false,
            log_file: None,
            required_binaries: DEFAULT_REQUIRED_BINARIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            require_root: false,
            debug_env: false,
        }
    }
}

impl RunOptions {
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            logger: self.script_name.clone(),
            verbose: self.verbose,
            file: self.log_file.clone(),
        }
    }
}

/// Everything a routine may read during a run.
///
/// Built once by the controller after config loading.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub options: &'a RunOptions,
    pub config: &'a ConfigMap,
}

impl<'a> RunContext<'a> {
    pub fn new(options: &'a RunOptions, config: &'a ConfigMap) -> Self {
        Self { options, config }
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }
}
