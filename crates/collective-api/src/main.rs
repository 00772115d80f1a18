//! Collective terminal entry point.
//!
//! Binary name: `collective`
//!
//! Parses CLI arguments, sets up tracing, loads the room and personas from
//! the data directory, then runs the interactive chat loop.

mod cli;
mod state;

use clap::Parser;

use cli::Cli;
use collective_infra::config::resolve_data_dir;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,collective=debug",
        _ => "trace",
    };
    collective_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let data_dir = cli.data_dir.unwrap_or_else(resolve_data_dir);
    let result = match AppState::init(data_dir, cli.name).await {
        Ok(mut state) => cli::chat::loop_runner::run_chat_loop(&mut state).await,
        Err(e) => Err(e),
    };

    collective_observe::tracing_setup::shutdown_tracing();
    result
}
