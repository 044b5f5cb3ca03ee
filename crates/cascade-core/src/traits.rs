//! Lookup traits the valuation engine reads through.
//!
//! [`QuoteStore`](crate::quotes::QuoteStore) and
//! [`TransactionLedger`](crate::ledger::TransactionLedger) are the loaded
//! implementations. Anything else answering the same point-in-time questions
//! can be valued against, which is how the engine is tested in isolation.
//!
//! The two traits deliberately signal "no data" differently: a price source
//! answers `None` when nothing is known, a position source answers zero.

use rust_decimal::Decimal;

use crate::types::Date;

/// Point-in-time price lookup.
pub trait PriceSource {
    /// Most recent price of `instrument` effective strictly before `date`,
    /// or `None` if the instrument is unknown or had no price by then.
    fn price_as_of(&self, instrument: &str, date: Date) -> Option<Decimal>;
}

/// Point-in-time cumulative position lookup.
pub trait PositionSource {
    /// Sum of all quantities booked against `position` strictly before
    /// `date`. Zero when the position is unknown or had no flows by then.
    fn cumulative_as_of(&self, position: &str, date: Date) -> Decimal;
}

impl<T: PriceSource + ?Sized> PriceSource for &T {
    fn price_as_of(&self, instrument: &str, date: Date) -> Option<Decimal> {
        (**self).price_as_of(instrument, date)
    }
}

impl<T: PositionSource + ?Sized> PositionSource for &T {
    fn cumulative_as_of(&self, position: &str, date: Date) -> Decimal {
        (**self).cumulative_as_of(position, date)
    }
}
