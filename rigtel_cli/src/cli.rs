//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "rigtel", version, about = "Rig telemetry CLI")]
pub struct Cli {
    /// Path to config TOML (built-in defaults are used when it is absent)
    #[arg(long, value_name = "FILE", default_value = "etc/rigtel.toml")]
    pub config: PathBuf,

    /// Optional calibration CSV (strict header: channel,scale,offset,min,max)
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Emit readings and errors as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire telemetry and print the newest reading as it arrives
    Watch {
        /// Print interval in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 1000)]
        interval_ms: u64,
        /// Stop after this many seconds (runs until Ctrl-C when omitted)
        #[arg(long, value_name = "SECS")]
        duration_s: Option<u64>,
        /// Skip the serial transport and stream synthetic data
        #[arg(long, action = ArgAction::SetTrue)]
        simulate: bool,
        /// Serial port override (takes precedence over config and auto-detect)
        #[arg(long, value_name = "PORT")]
        port: Option<String>,
        /// Baud rate override
        #[arg(long, value_name = "BAUD")]
        baud: Option<u32>,
        /// After stopping, also print the most recent N readings
        #[arg(long, value_name = "N", default_value_t = 0)]
        points: usize,
    },
    /// List serial ports and mark the one auto-detection would pick
    Ports,
    /// Quick health check (synthetic pipeline end to end)
    SelfCheck,
}
