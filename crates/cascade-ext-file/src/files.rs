//! Loading a snapshot from a set of data files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cascade_core::ledger::TransactionLedger;
use cascade_core::ownership::OwnershipGraph;
use cascade_core::quotes::QuoteStore;
use cascade_core::{Snapshot, Valuator};
use tracing::{info, warn};

use crate::error::{FileError, FileResult};
use crate::records::{read_ownership_rows, read_position_rows, read_price_rows};

/// Locations of the three input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    /// Ownership records.
    pub investments: PathBuf,
    /// Instrument prices.
    pub quotes: PathBuf,
    /// Position flows.
    pub transactions: PathBuf,
}

impl DataFiles {
    /// Default investments file name.
    pub const INVESTMENTS: &'static str = "Investments.csv";
    /// Default quotes file name.
    pub const QUOTES: &'static str = "Quotes.csv";
    /// Default transactions file name.
    pub const TRANSACTIONS: &'static str = "Transactions.csv";

    /// The default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            investments: dir.join(Self::INVESTMENTS),
            quotes: dir.join(Self::QUOTES),
            transactions: dir.join(Self::TRANSACTIONS),
        }
    }

    /// Replaces the investments file.
    #[must_use]
    pub fn with_investments(mut self, path: impl Into<PathBuf>) -> Self {
        self.investments = path.into();
        self
    }

    /// Replaces the quotes file.
    #[must_use]
    pub fn with_quotes(mut self, path: impl Into<PathBuf>) -> Self {
        self.quotes = path.into();
        self
    }

    /// Replaces the transactions file.
    #[must_use]
    pub fn with_transactions(mut self, path: impl Into<PathBuf>) -> Self {
        self.transactions = path.into();
        self
    }
}

/// Reads and validates all three files into a new snapshot.
///
/// Files are read in the order quotes, investments, transactions; the first
/// failure is returned with the offending file's path.
pub fn load_snapshot(files: &DataFiles) -> FileResult<Snapshot> {
    info!(
        investments = %files.investments.display(),
        quotes = %files.quotes.display(),
        transactions = %files.transactions.display(),
        "Loading data files"
    );

    let price_rows = read_price_rows(&files.quotes)?;
    let quotes =
        QuoteStore::from_rows(&price_rows).map_err(|e| FileError::load(&files.quotes, e))?;

    let ownership_rows = read_ownership_rows(&files.investments)?;
    let graph = OwnershipGraph::from_rows(&ownership_rows)
        .map_err(|e| FileError::load(&files.investments, e))?;

    let position_rows = read_position_rows(&files.transactions)?;
    let ledger = TransactionLedger::from_rows(&position_rows)
        .map_err(|e| FileError::load(&files.transactions, e))?;

    let snapshot = Snapshot::from_parts(graph, quotes, ledger);
    let stats = snapshot.stats();
    info!(
        records = stats.ownership_records,
        owners = stats.owners,
        quotes = stats.price_points,
        transactions = stats.position_events,
        "Loaded data files"
    );
    Ok(snapshot)
}

/// Loads the files and makes the result `valuator`'s current snapshot.
///
/// On error the valuator keeps what it had.
pub fn reload(valuator: &Valuator, files: &DataFiles) -> FileResult<Arc<Snapshot>> {
    match load_snapshot(files) {
        Ok(snapshot) => Ok(valuator.install(snapshot)),
        Err(e) => {
            warn!(error = %e, loaded = valuator.is_loaded(), "Reload failed, keeping current state");
            Err(e)
        }
    }
}
