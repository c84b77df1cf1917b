//! Entry point of the `helpdesk` command-line client.
//!
//! Loads the configuration, restores the persisted session, runs one command
//! and prints the rendered view plus the current flash message. Logs go to
//! stderr so stdout carries only the rendered output.

use anyhow::{Context, Result};
use clap::Parser;
use helpdesk_client::app::AppContext;
use helpdesk_client::cli::{self, Cli, Command};
use helpdesk_client::config::Config;
use std::process::ExitCode;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    let ctx = AppContext::new(config).context("failed to initialise the client")?;

    if !matches!(cli.command, Command::Health) {
        ctx.start().await;
    }

    let mut out = String::new();
    let result = cli::run(&ctx, cli.command, &mut out).await;
    print!("{out}");
    if let Some(flash) = ctx.flash.current() {
        println!("[{}] {}", flash.kind, flash.text);
    }

    ctx.shutdown();
    result
}
