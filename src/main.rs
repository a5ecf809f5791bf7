//! gh - a plugin-extensible command-line client for the GitHub REST API.
//!
//! This is the main binary: it parses global flags, installs logging and
//! hands the remaining arguments to the [`Dispatcher`].

mod cli;
mod commands;
mod dispatch;
mod hooks;

use std::process::ExitCode;

use clap::Parser;
use gh_config::ConfigStore;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::dispatch::Dispatcher;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store = ConfigStore::from_env()?;
    let mut dispatcher = Dispatcher::new(store);

    if cli.help {
        dispatcher.help(cli.args.first().map(String::as_str)).await
    } else {
        dispatcher.dispatch(&cli.args).await
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .init();
}
