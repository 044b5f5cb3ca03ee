//! Stats command implementation.

use anyhow::Result;
use clap::Args;

use cascade_ext_file::{load_snapshot, DataFiles};

use crate::cli::OutputFormat;
use crate::output::{print_header, print_json, print_output, KeyValue};

/// Arguments for the stats command.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Also list every owner id
    #[arg(long)]
    pub owners: bool,
}

/// Execute the stats command.
pub fn execute(args: StatsArgs, files: &DataFiles, format: OutputFormat) -> Result<()> {
    let snapshot = load_snapshot(files)?;
    let stats = snapshot.stats();

    if format == OutputFormat::Json {
        return print_json(&stats);
    }

    let results = vec![
        KeyValue::new("Investments file", files.investments.display().to_string()),
        KeyValue::new("Quotes file", files.quotes.display().to_string()),
        KeyValue::new("Transactions file", files.transactions.display().to_string()),
        KeyValue::new("Ownership records", stats.ownership_records.to_string()),
        KeyValue::new("Owners", stats.owners.to_string()),
        KeyValue::new("Instruments", snapshot.quotes().instrument_count().to_string()),
        KeyValue::new("Price points", stats.price_points.to_string()),
        KeyValue::new("Positions", snapshot.ledger().position_count().to_string()),
        KeyValue::new("Transactions", stats.position_events.to_string()),
    ];

    if format == OutputFormat::Table {
        print_header("Loaded Data");
    }
    print_output(&results, format)?;

    if args.owners {
        let owners: Vec<_> = snapshot
            .graph()
            .owners()
            .map(|o| KeyValue::new("Owner", o.as_str()))
            .collect();
        if format == OutputFormat::Table {
            print_header("Owners");
        }
        print_output(&owners, format)?;
    }

    Ok(())
}
