//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "cruise", version, about = "Cruise-control motor speed controller")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/cruise_config.toml")]
    pub config: PathBuf,

    /// Emit telemetry, summaries and errors as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the control loop until Ctrl-C
    Run {
        /// Stop after this many ticks
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Replay operator input from a CSV (at_ms,button,pot_raw); simulator only
        #[arg(long, value_name = "CSV")]
        script: Option<PathBuf>,
        /// Print tick latency statistics on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },
    /// Build the backend and run a single tick
    SelfCheck,
}
