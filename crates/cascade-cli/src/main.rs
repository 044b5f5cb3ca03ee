//! Cascade CLI - look-through valuation of nested fund holdings.
//!
//! # Usage
//!
//! ```bash
//! # Value an investor
//! cascade --data-dir ./data value --investor Investor1 --date 2020-01-01
//!
//! # Break the value down by direct holding
//! cascade value --investor Investor1 --date 2020-01-01 --breakdown
//!
//! # Answer investorId;date lines from stdin
//! cascade repl
//!
//! # Show what an investor holds, through all funds
//! cascade tree --investor Investor1
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod error;
mod output;

use cli::{Cli, Commands};
use config::CascadeConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cascade=debug"))
    } else if cli.quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cascade=warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cascade=info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CascadeConfig::resolve(cli.config.as_deref(), &cli.data_dir)?;
    let files = config.data_files(&cli.data_dir);
    let format = cli.format;

    // Execute command
    match cli.command {
        Commands::Value(args) => commands::value::execute(args, &files, format)?,
        Commands::Repl(args) => commands::repl::execute(args, &files, cli.quiet)?,
        Commands::Tree(args) => commands::tree::execute(args, &files, format)?,
        Commands::Stats(args) => commands::stats::execute(args, &files, format)?,
    }

    Ok(())
}
