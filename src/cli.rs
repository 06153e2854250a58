//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::context::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "script-skeleton", version)]
#[command(about = "Command-line script skeleton with structured JSON logging", long_about = None)]
pub struct Cli {
    /// Path to a JSON (or .toml) config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Generic placeholder value
    #[arg(short, long, value_name = "VALUE")]
    pub foo: Option<String>,

    /// Enable verbose debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Also append log lines to this file
    #[arg(short, long, value_name = "PATH", env = "SKELETON_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Additional binary that must be on PATH (repeatable)
    #[arg(long = "require", value_name = "BIN")]
    pub require: Vec<String>,

    /// Refuse to run unless the effective user is root
    #[arg(long)]
    pub require_root: bool,

    /// Log every environment variable at debug level
    #[arg(long)]
    pub debug_env: bool,
}

impl Cli {
    pub fn into_options(self) -> RunOptions {
        let mut options = RunOptions {
            config: self.config,
            foo: self.foo,
            verbose: self.verbose,
            dry_run: self.dry_run,
            log_file: self.log_file,
            require_root: self.require_root,
            debug_env: self.debug_env,
            ..RunOptions::default()
        };
        for bin in self.require {
            if !options.required_binaries.contains(&bin) {
                options.required_binaries.push(bin);
            }
        }
        options
    }
}
