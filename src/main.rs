//! COI language server entry point.
//!
//! With no subcommand the server runs on stdio. `fmt` and `index` run the
//! formatter and the declaration indexer from the command line.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coi_lsp::cli::{format_files, format_options, index_json, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coi_lsp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            coi_lsp::server::run().await;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Fmt {
            check,
            indent,
            tabs,
            files,
        } => {
            let options = format_options(&std::env::current_dir()?, indent, tabs)?;
            match format_files(&files, &options, check)? {
                true => Ok(ExitCode::SUCCESS),
                false => Ok(ExitCode::FAILURE),
            }
        }
        Commands::Index { dir } => {
            println!("{}", index_json(&dir)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
