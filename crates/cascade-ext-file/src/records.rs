//! Semicolon-delimited CSV readers for the three input files.
//!
//! Readers only split the files into raw rows keyed by header name. Every
//! field comes back as an optional string; checking required fields and
//! parsing dates and numbers is left to the stores.

use std::fs::File;
use std::path::Path;

use cascade_core::types::{OwnershipRow, PositionRow, PriceRow};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{FileError, FileResult};

// =============================================================================
// CSV RECORDS
// =============================================================================

/// CSV record for investments.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InvestmentRecord {
    #[serde(rename = "InvestorId")]
    investor_id: Option<String>,
    #[serde(rename = "InvestmentId")]
    investment_id: Option<String>,
    #[serde(rename = "InvestmentType")]
    investment_type: Option<String>,
    #[serde(rename = "ISIN")]
    isin: Option<String>,
    #[serde(rename = "City")]
    city: Option<String>,
    #[serde(rename = "FondsInvestor")]
    fonds_investor: Option<String>,
}

impl From<InvestmentRecord> for OwnershipRow {
    fn from(record: InvestmentRecord) -> Self {
        Self {
            owner_id: record.investor_id,
            position_id: record.investment_id,
            kind: record.investment_type,
            isin: record.isin,
            city: record.city,
            fund_owner_id: record.fonds_investor,
        }
    }
}

/// CSV record for quotes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteRecord {
    #[serde(rename = "ISIN")]
    isin: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "PricePerShare")]
    price_per_share: Option<String>,
}

impl From<QuoteRecord> for PriceRow {
    fn from(record: QuoteRecord) -> Self {
        Self {
            instrument_key: record.isin,
            date: record.date,
            price: record.price_per_share,
        }
    }
}

/// CSV record for transactions. The `Type` column is informational.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TransactionRecord {
    #[serde(rename = "InvestmentId")]
    investment_id: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Value")]
    value: Option<String>,
}

impl From<TransactionRecord> for PositionRow {
    fn from(record: TransactionRecord) -> Self {
        Self {
            position_id: record.investment_id,
            date: record.date,
            value: record.value,
        }
    }
}

// =============================================================================
// READERS
// =============================================================================

/// Reads an investments file into ownership rows.
pub fn read_ownership_rows(path: impl AsRef<Path>) -> FileResult<Vec<OwnershipRow>> {
    read_rows::<InvestmentRecord, _>(path.as_ref())
}

/// Reads a quotes file into price rows.
pub fn read_price_rows(path: impl AsRef<Path>) -> FileResult<Vec<PriceRow>> {
    read_rows::<QuoteRecord, _>(path.as_ref())
}

/// Reads a transactions file into position rows.
pub fn read_position_rows(path: impl AsRef<Path>) -> FileResult<Vec<PositionRow>> {
    read_rows::<TransactionRecord, _>(path.as_ref())
}

fn read_rows<R, T>(path: &Path) -> FileResult<Vec<T>>
where
    R: DeserializeOwned,
    T: From<R>,
{
    let file = File::open(path).map_err(|e| FileError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let record: R = result.map_err(|e| FileError::csv(path, e))?;
        rows.push(T::from(record));
    }

    debug!(path = %path.display(), rows = rows.len(), "Read data file");
    Ok(rows)
}
