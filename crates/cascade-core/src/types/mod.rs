//! Domain types for holdings valuation.
//!
//! - [`Date`]: Effective and as-of dates
//! - [`OwnerId`], [`PositionId`], [`InstrumentKey`]: Identifiers
//! - [`OwnershipRow`], [`PriceRow`], [`PositionRow`]: Unvalidated input rows
//! - [`OwnershipRecord`], [`PricePoint`], [`PositionEvent`]: Validated facts

mod date;
mod ids;
mod records;

pub use date::Date;
pub use ids::{InstrumentKey, OwnerId, PositionId};
pub use records::{
    HoldingKind, OwnershipRecord, OwnershipRow, PositionEvent, PositionRow, PricePoint, PriceRow,
};
