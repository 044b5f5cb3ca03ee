//! # Cascade Core
//!
//! Point-in-time valuation of nested fund holdings.
//!
//! An owner (an investor or a fund) holds positions in stocks, real estate
//! and other funds. Valuing an owner walks through every fund it holds,
//! transitively, and prices each leaf as of a date:
//!
//! - **Quote store**: latest instrument price strictly before a date
//! - **Transaction ledger**: cumulative position quantity strictly before a date
//! - **Ownership graph**: per-owner holdings trees with shared fund subtrees
//! - **Valuation engine**: recursive look-through valuation where missing
//!   data counts as zero
//! - **Snapshot**: one immutable load of all three, swapped atomically
//!
//! ## Example
//!
//! ```rust
//! use cascade_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let graph = OwnershipGraph::from_records([
//!     OwnershipRecord::fund("Investor1", "I1", "Fonds1"),
//!     OwnershipRecord::stock("Fonds1", "F1", "ISIN0"),
//! ])
//! .unwrap();
//!
//! let day = Date::from_ymd(2022, 6, 1).unwrap();
//! let quotes = QuoteStore::from_points([PricePoint::new("ISIN0", day, dec!(1000))]);
//! let ledger = TransactionLedger::from_events([
//!     PositionEvent::new("I1", day, dec!(0.5)),
//!     PositionEvent::new("F1", day, dec!(100)),
//! ])
//! .unwrap();
//!
//! let snapshot = Snapshot::from_parts(graph, quotes, ledger);
//! let value = snapshot.valuate("Investor1", day.next_day()).unwrap();
//! assert_eq!(value, dec!(500));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod batch;
pub mod error;
pub mod ledger;
pub mod ownership;
pub mod quotes;
pub mod snapshot;
pub mod traits;
pub mod types;
pub mod valuation;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::batch::{BatchConfig, ValuationQuery};
    pub use crate::error::{CascadeError, CascadeResult};
    pub use crate::ledger::TransactionLedger;
    pub use crate::ownership::{OwnerTree, OwnershipGraph, OwnershipNode};
    pub use crate::quotes::QuoteStore;
    pub use crate::snapshot::{Snapshot, SnapshotStats, Valuator};
    pub use crate::traits::{PositionSource, PriceSource};
    pub use crate::types::{
        Date, HoldingKind, InstrumentKey, OwnerId, OwnershipRecord, OwnershipRow, PositionEvent,
        PositionId, PositionRow, PricePoint, PriceRow,
    };
    pub use crate::valuation::{Contribution, ValuationEngine};
}

// Re-export commonly used types at crate root
pub use error::{CascadeError, CascadeResult};
pub use snapshot::{Snapshot, SnapshotStats, Valuator};
pub use types::{Date, OwnerId, PositionId};
