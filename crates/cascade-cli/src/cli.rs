//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{ReplArgs, StatsArgs, TreeArgs, ValueArgs};

/// Cascade - Look-through valuation of nested fund holdings
#[derive(Parser)]
#[command(name = "cascade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding Investments.csv, Quotes.csv and Transactions.csv
    #[arg(
        short,
        long,
        env = "CASCADE_DATA_DIR",
        default_value = ".",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Configuration file (default: cascade.toml in the data directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Value an investor or fund as of one or more dates
    Value(ValueArgs),

    /// Read `investorId;date` lines from stdin and value each
    Repl(ReplArgs),

    /// Show the ownership tree of an investor or fund
    Tree(TreeArgs),

    /// Show statistics of the loaded data
    Stats(StatsArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Minimal output (just the value)
    Minimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_value_command() {
        let cli = Cli::try_parse_from([
            "cascade",
            "--data-dir",
            "/data",
            "value",
            "--investor",
            "Investor1",
            "--date",
            "2020-01-01",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, PathBuf::from("/data"));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Value(args) => {
                assert_eq!(args.investor, "Investor1");
                assert_eq!(args.dates, ["2020-01-01"]);
                assert!(!args.breakdown);
            }
            _ => panic!("expected value command"),
        }
    }
}
