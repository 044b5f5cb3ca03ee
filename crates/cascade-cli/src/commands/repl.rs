//! Interactive valuation loop.
//!
//! Reads `investorId;YYYY-MM-DD` lines until an empty line or end of input
//! and answers each with `Valuation of {id} as of {date} is {value}`. The
//! line `:reload` re-reads the data files; if that fails the loop keeps
//! answering from the data it had.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Args;

use cascade_core::Valuator;
use cascade_ext_file::{reload, DataFiles};

use crate::commands::parse_query;
use crate::output::{format_value, print_error, print_info};

/// Arguments for the repl command.
#[derive(Args, Debug)]
pub struct ReplArgs {}

/// Execute the repl command.
pub fn execute(_args: ReplArgs, files: &DataFiles, quiet: bool) -> Result<()> {
    let valuator = Valuator::new();
    reload(&valuator, files)?;

    if !quiet {
        print_info("Enter investorId;YYYY-MM-DD (empty line to quit)");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(&valuator, files, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Answers queries read from `input` until an empty line or end of input.
///
/// Returns the number of queries answered.
pub fn run<R: BufRead, W: Write>(
    valuator: &Valuator,
    files: &DataFiles,
    input: R,
    mut out: W,
) -> Result<usize> {
    let mut answered = 0;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        if line == ":reload" {
            match reload(valuator, files) {
                Ok(snapshot) => {
                    writeln!(out, "Reloaded (version {})", snapshot.version())?;
                    out.flush()?;
                }
                Err(e) => print_error(&e.to_string()),
            }
            continue;
        }

        let query = match parse_query(line) {
            Ok(query) => query,
            Err(e) => {
                print_error(&e.to_string());
                continue;
            }
        };

        match valuator.valuate(query.owner.as_str(), query.date) {
            Ok(value) => {
                writeln!(
                    out,
                    "Valuation of {} as of {} is {}",
                    query.owner,
                    query.date,
                    format_value(value)
                )?;
                out.flush()?;
                answered += 1;
            }
            Err(e) => print_error(&e.to_string()),
        }
    }

    Ok(answered)
}
