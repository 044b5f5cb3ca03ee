//! # Cascade Ext File
//!
//! File-based inputs for the Cascade valuation engine.
//!
//! Reads the three semicolon-delimited CSV files (with header row) that
//! describe a dataset:
//! - `Investments.csv`: `InvestorId;InvestmentId;InvestmentType;ISIN;City;FondsInvestor`
//! - `Quotes.csv`: `ISIN;Date;PricePerShare`
//! - `Transactions.csv`: `InvestmentId;Type;Date;Value`
//!
//! and builds a [`cascade_core::Snapshot`] from them.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod files;
mod records;

pub use error::{FileError, FileResult};
pub use files::{load_snapshot, reload, DataFiles};
pub use records::{read_ownership_rows, read_position_rows, read_price_rows};
