//! CLI argument definitions for the `collective` binary.
//!
//! There are no subcommands: the binary always opens one interactive room.
//! Everything else happens through in-chat slash commands.

pub mod chat;

use std::path::PathBuf;

use clap::Parser;

/// Chat with a room full of AI personas.
#[derive(Parser)]
#[command(name = "collective", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding config.toml and saved room state.
    #[arg(long, env = "COLLECTIVE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Your display name in the transcript (overrides config).
    #[arg(long)]
    pub name: Option<String>,

    /// Suppress all log output except errors.
    #[arg(long)]
    pub quiet: bool,

    /// Detailed log output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long)]
    pub otel: bool,
}
