//! Quote store: per-instrument price history with point-in-time lookup.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::CascadeResult;
use crate::traits::PriceSource;
use crate::types::{Date, InstrumentKey, PricePoint, PriceRow};

/// Price history indexed by instrument, each history ordered by date.
///
/// A date holds at most one price per instrument; a later point for the same
/// instrument and date replaces the earlier one.
///
/// # Example
///
/// ```rust
/// use cascade_core::quotes::QuoteStore;
/// use cascade_core::types::{Date, PricePoint};
/// use rust_decimal::Decimal;
///
/// let june = Date::from_ymd(2022, 6, 1).unwrap();
/// let store = QuoteStore::from_points([PricePoint::new("ISIN0", june, Decimal::from(100))]);
///
/// // Prices become visible the day after they are effective.
/// assert_eq!(store.price_as_of("ISIN0", june), None);
/// assert_eq!(store.price_as_of("ISIN0", june.next_day()), Some(Decimal::from(100)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QuoteStore {
    quotes: HashMap<InstrumentKey, BTreeMap<Date, Decimal>>,
}

impl QuoteStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from already-validated price points.
    pub fn from_points(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut quotes: HashMap<InstrumentKey, BTreeMap<Date, Decimal>> = HashMap::new();
        for point in points {
            quotes
                .entry(point.instrument)
                .or_default()
                .insert(point.date, point.price);
        }
        Self { quotes }
    }

    /// Validates raw rows and builds a new store from them.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::Validation` naming the first row with a missing
    /// instrument key, date or price, or an unparseable date or price.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a PriceRow>) -> CascadeResult<Self> {
        let points = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| PricePoint::try_from(row).map_err(|e| e.at_record(i + 1)))
            .collect::<CascadeResult<Vec<_>>>()?;
        Ok(Self::from_points(points))
    }

    /// Replaces the store's contents with the given rows.
    ///
    /// The new index is built completely before it replaces the current one,
    /// so on error the store is left as it was.
    pub fn load<'a>(&mut self, rows: impl IntoIterator<Item = &'a PriceRow>) -> CascadeResult<()> {
        info!("Loading quotes");
        let loaded = Self::from_rows(rows)?;
        *self = loaded;
        info!(
            points = self.fact_count(),
            instruments = self.instrument_count(),
            "Loaded quotes"
        );
        Ok(())
    }

    /// Most recent price strictly before `date`.
    ///
    /// Returns `None` if the instrument is unknown or has no earlier price.
    pub fn price_as_of(&self, instrument: &str, date: Date) -> Option<Decimal> {
        let Some(history) = self.quotes.get(instrument) else {
            debug!(instrument, "No quotes for instrument");
            return None;
        };

        let price = history.range(..date).next_back().map(|(_, price)| *price);
        if price.is_none() {
            debug!(instrument, %date, "No quotes for instrument before date");
        }
        price
    }

    /// Total number of price points held.
    pub fn fact_count(&self) -> usize {
        self.quotes.values().map(BTreeMap::len).sum()
    }

    /// Number of instruments with at least one price.
    pub fn instrument_count(&self) -> usize {
        self.quotes.len()
    }

    /// Returns true if no prices are held.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl PriceSource for QuoteStore {
    fn price_as_of(&self, instrument: &str, date: Date) -> Option<Decimal> {
        QuoteStore::price_as_of(self, instrument, date)
    }
}

impl From<Vec<PricePoint>> for QuoteStore {
    fn from(points: Vec<PricePoint>) -> Self {
        Self::from_points(points)
    }
}
