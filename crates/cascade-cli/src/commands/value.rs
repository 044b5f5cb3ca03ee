//! Value command implementation.
//!
//! Values one owner as of one or more dates, optionally broken down by
//! direct holding.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use cascade_core::batch::{BatchConfig, ValuationQuery};
use cascade_core::valuation::Contribution;
use cascade_ext_file::{load_snapshot, DataFiles};

use crate::cli::OutputFormat;
use crate::commands::parse_date;
use crate::output::{format_value, print_header, print_json, print_output, print_table};

/// Arguments for the value command.
#[derive(Args, Debug)]
pub struct ValueArgs {
    /// Investor or fund id
    #[arg(short, long)]
    pub investor: String,

    /// As-of date (YYYY-MM-DD); repeat for several dates
    #[arg(long = "date", required = true)]
    pub dates: Vec<String>,

    /// Show the value of each direct holding
    #[arg(short, long)]
    pub breakdown: bool,
}

/// One valuation result row.
#[derive(Debug, Clone, Serialize, Tabled)]
struct ValuationRow {
    #[tabled(rename = "Investor")]
    investor: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// One direct holding's contribution.
#[derive(Debug, Clone, Serialize, Tabled)]
struct ContributionRow {
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Asset")]
    asset: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&Contribution> for ContributionRow {
    fn from(c: &Contribution) -> Self {
        Self {
            position: c.position_id.to_string(),
            kind: c.kind.as_str().to_string(),
            asset: c.asset_key.clone(),
            value: c.value.map_or_else(|| "-".to_string(), format_value),
        }
    }
}

/// JSON shape of one valuation.
#[derive(Debug, Serialize)]
struct ValuationReport {
    investor: String,
    date: String,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<Vec<ContributionRow>>,
}

/// Execute the value command.
pub fn execute(args: ValueArgs, files: &DataFiles, format: OutputFormat) -> Result<()> {
    let queries = args
        .dates
        .iter()
        .map(|d| -> Result<ValuationQuery> {
            Ok(ValuationQuery::new(args.investor.as_str(), parse_date(d)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let snapshot = load_snapshot(files)?;
    let values = snapshot.valuate_many(&queries, &BatchConfig::default())?;

    let mut reports = Vec::with_capacity(queries.len());
    for (query, value) in queries.iter().zip(values) {
        let breakdown = if args.breakdown {
            let parts = snapshot.breakdown(query.owner.as_str(), query.date)?;
            Some(parts.iter().map(ContributionRow::from).collect::<Vec<_>>())
        } else {
            None
        };
        reports.push(ValuationReport {
            investor: query.owner.to_string(),
            date: query.date.to_string(),
            value: format_value(value),
            breakdown,
        });
    }

    match format {
        OutputFormat::Json => print_json(&reports),
        OutputFormat::Minimal => {
            let rows: Vec<_> = reports.iter().map(summary_row).collect();
            print_output(&rows, format)
        }
        OutputFormat::Table => {
            let rows: Vec<_> = reports.iter().map(summary_row).collect();
            print_header("Valuation");
            print_table(&rows)?;
            for report in &reports {
                if let Some(parts) = &report.breakdown {
                    print_header(&format!("Holdings of {} as of {}", report.investor, report.date));
                    print_table(parts)?;
                }
            }
            Ok(())
        }
    }
}

fn summary_row(report: &ValuationReport) -> ValuationRow {
    ValuationRow {
        investor: report.investor.clone(),
        date: report.date.clone(),
        value: report.value.clone(),
    }
}
