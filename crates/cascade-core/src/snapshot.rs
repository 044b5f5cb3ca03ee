//! Immutable loaded state and the holder that swaps it.
//!
//! A [`Snapshot`] owns one load of all three indexes. It is never modified
//! after construction, so any number of valuations can read it concurrently.
//! A [`Valuator`] holds the current snapshot and replaces it in one step when
//! a new load succeeds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::batch::{maybe_parallel_map, BatchConfig, ValuationQuery};
use crate::error::{CascadeError, CascadeResult};
use crate::ledger::TransactionLedger;
use crate::ownership::{OwnerTree, OwnershipGraph};
use crate::quotes::QuoteStore;
use crate::types::{Date, OwnershipRow, PositionRow, PriceRow};
use crate::valuation::{Contribution, ValuationEngine};

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Fact counts of a snapshot, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    /// Load generation of the snapshot.
    pub version: u64,
    /// Ownership records loaded.
    pub ownership_records: usize,
    /// Owners with at least one record.
    pub owners: usize,
    /// Price points loaded.
    pub price_points: usize,
    /// Position events loaded.
    pub position_events: usize,
}

/// One complete, immutable load of ownership, prices and positions.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    graph: OwnershipGraph,
    quotes: QuoteStore,
    ledger: TransactionLedger,
}

impl Snapshot {
    /// Validates and indexes all three inputs.
    ///
    /// Nothing is shared with any previous snapshot; on error no snapshot
    /// exists and whatever the caller held before is untouched.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::Input` naming the failing collection
    /// (`quotes`, `investments` or `transactions`) and wrapping the first
    /// `CascadeError::Validation` found in it, or the
    /// `CascadeError::CyclicOwnership` if any fund holds itself.
    pub fn load_all(
        ownership: &[OwnershipRow],
        prices: &[PriceRow],
        positions: &[PositionRow],
    ) -> CascadeResult<Self> {
        let quotes = QuoteStore::from_rows(prices).map_err(|e| e.in_input("quotes"))?;
        let graph = OwnershipGraph::from_rows(ownership).map_err(|e| e.in_input("investments"))?;
        let ledger =
            TransactionLedger::from_rows(positions).map_err(|e| e.in_input("transactions"))?;

        let snapshot = Self::from_parts(graph, quotes, ledger);
        let stats = snapshot.stats();
        info!(
            records = stats.ownership_records,
            owners = stats.owners,
            quotes = stats.price_points,
            transactions = stats.position_events,
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Assembles a snapshot from already-built indexes.
    ///
    /// Each snapshot gets a version higher than every snapshot built before
    /// it in this process.
    pub fn from_parts(graph: OwnershipGraph, quotes: QuoteStore, ledger: TransactionLedger) -> Self {
        Self {
            version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
            graph,
            quotes,
            ledger,
        }
    }

    /// Load generation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Engine reading this snapshot's indexes.
    pub fn engine(&self) -> ValuationEngine<'_, &QuoteStore, &TransactionLedger> {
        ValuationEngine::new(&self.graph, &self.quotes, &self.ledger)
    }

    /// Total value of `owner`'s holdings as of `date`.
    pub fn valuate(&self, owner: &str, date: Date) -> CascadeResult<Decimal> {
        self.engine().valuate(owner, date)
    }

    /// Value of each direct holding of `owner` as of `date`.
    pub fn breakdown(&self, owner: &str, date: Date) -> CascadeResult<Vec<Contribution>> {
        self.engine().breakdown(owner, date)
    }

    /// Values every query, in order.
    ///
    /// # Errors
    ///
    /// Fails with the first arithmetic error of any query.
    pub fn valuate_many(
        &self,
        queries: &[ValuationQuery],
        config: &BatchConfig,
    ) -> CascadeResult<Vec<Decimal>> {
        let engine = self.engine();
        maybe_parallel_map(queries, config, |q| engine.valuate(q.owner.as_str(), q.date))
            .into_iter()
            .collect()
    }

    /// Holdings tree of `owner`.
    pub fn owner_tree(&self, owner: &str) -> OwnerTree {
        self.graph.owner_tree(owner)
    }

    /// The ownership graph.
    pub fn graph(&self) -> &OwnershipGraph {
        &self.graph
    }

    /// The quote store.
    pub fn quotes(&self) -> &QuoteStore {
        &self.quotes
    }

    /// The transaction ledger.
    pub fn ledger(&self) -> &TransactionLedger {
        &self.ledger
    }

    /// Fact counts.
    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            version: self.version,
            ownership_records: self.graph.record_count(),
            owners: self.graph.owner_count(),
            price_points: self.quotes.fact_count(),
            position_events: self.ledger.fact_count(),
        }
    }
}

/// Holder of the current snapshot.
///
/// Readers clone the current `Arc<Snapshot>` and value against it without
/// holding the lock. Loads build off to the side and swap under the write
/// lock, so a reader sees either the previous or the new snapshot in full.
#[derive(Debug, Default)]
pub struct Valuator {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl Valuator {
    /// Creates a holder with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads all inputs into a new snapshot and makes it current.
    ///
    /// On error the current snapshot (or the not-loaded state) is kept.
    pub fn load_all(
        &self,
        ownership: &[OwnershipRow],
        prices: &[PriceRow],
        positions: &[PositionRow],
    ) -> CascadeResult<Arc<Snapshot>> {
        match Snapshot::load_all(ownership, prices, positions) {
            Ok(snapshot) => Ok(self.install(snapshot)),
            Err(e) => {
                warn!(error = %e, loaded = self.is_loaded(), "Load failed, keeping current state");
                Err(e)
            }
        }
    }

    /// Makes `snapshot` current.
    pub fn install(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// The current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::NotLoaded` if nothing was loaded yet.
    pub fn snapshot(&self) -> CascadeResult<Arc<Snapshot>> {
        self.current.read().clone().ok_or(CascadeError::NotLoaded)
    }

    /// Returns true once a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Values `owner` as of `date` against the current snapshot.
    pub fn valuate(&self, owner: &str, date: Date) -> CascadeResult<Decimal> {
        self.snapshot()?.valuate(owner, date)
    }
}
