//! pathtrigger CLI entrypoint.

use clap::Parser;
use console::style;
use pathtrigger_trace::init_tracing;
use std::process::ExitCode;
use tracing::error;

mod commands;
mod config;
mod handlers;


use commands::Commands;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "pathtrigger")]
#[command(author, version, about = "Trigger the pipelines whose paths a commit touched", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: CliConfig,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = init_tracing(&cli.config.tracing()) {
        eprintln!("{} {}", style("!").yellow(), e);
    }

    let result = match &cli.command {
        Commands::Handle { event } => handlers::handle(&cli.config, event.as_deref()).await,
        Commands::Resolve { paths, json } => handlers::resolve(&cli.config, paths, *json),
    };

    match result {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            error!(error = %format!("{:#}", err), "Invocation failed");
            eprintln!("{} {:#}", style("✗").red(), err);
            ExitCode::from(handlers::EXIT_FATAL)
        }
    }
}
