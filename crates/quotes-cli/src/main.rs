//! Quotes CLI - collect, filter, and sync quotes from the command line

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::categories::run_categories;
use crate::commands::common::{resolve_db_path, RunContext};
use crate::commands::export::run_export;
use crate::commands::import::run_import;
use crate::commands::list::run_list;
use crate::commands::random::run_random;
use crate::commands::review::run_review;
use crate::commands::sync::{run_sync, run_sync_watch};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "quotes=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = RunContext {
        db_path: resolve_db_path(cli.db_path)?,
        server_url: cli.server_url,
        offline: cli.offline,
    };

    match cli.command {
        Some(Commands::Add { text, category }) => run_add(&text, &category, &ctx).await?,
        Some(Commands::List { category, json }) => {
            run_list(category.as_deref(), json, &ctx).await?;
        }
        Some(Commands::Random { category, seed }) => {
            run_random(category.as_deref(), seed, &ctx).await?;
        }
        Some(Commands::Categories) => run_categories(&ctx).await?,
        Some(Commands::Import { path }) => run_import(&path, &ctx).await?,
        Some(Commands::Export { output }) => run_export(output.as_deref(), &ctx).await?,
        Some(Commands::Sync { watch, interval }) => {
            if watch {
                run_sync_watch(interval, &ctx).await?;
            } else {
                run_sync(&ctx).await?;
            }
        }
        Some(Commands::Review { command }) => run_review(command, &ctx).await?,
        None => {
            Cli::command().print_help().map_err(CliError::Io)?;
            println!();
        }
    }

    Ok(())
}
