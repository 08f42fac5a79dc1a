//! Codipop CLI entry point.
//!
//! Binary name: `codipop`
//!
//! Parses CLI arguments, initializes the database and services, then
//! dispatches to the appropriate command handler.

mod cli;
mod state;

use std::process::ExitCode;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,codipop=debug",
        _ => "trace",
    };

    codipop_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "codipop", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let state = AppState::init(&cli.user).await?;

    let result = match cli.command {
        Commands::Fit {
            person,
            garments,
            output,
        } => cli::fit::fit(&state, &person, &garments, output.as_deref(), cli.json).await,
        Commands::Quota => cli::quota::show_quota(&state, cli.json).await,
        Commands::History { action } => {
            cli::history::handle_history_command(action, &state, cli.json).await
        }
        Commands::Wardrobe { action } => {
            cli::wardrobe::handle_wardrobe_command(action, &state, cli.json).await
        }
        Commands::Onboarding { action } => {
            cli::onboarding::handle_onboarding_command(action, &state, cli.json).await
        }
        Commands::Completions { .. } => Ok(()),
    };

    codipop_observe::tracing_setup::shutdown_tracing();

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => match cli::reported_exit_code(&e) {
            Some(code) => Ok(ExitCode::from(code)),
            None => Err(e),
        },
    }
}
