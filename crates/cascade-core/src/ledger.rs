//! Transaction ledger: per-position signed flows with cumulative lookup.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{CascadeError, CascadeResult};
use crate::traits::PositionSource;
use crate::types::{Date, PositionEvent, PositionId, PositionRow};

/// Running totals per position, keyed by effective date.
///
/// Each entry holds the position's net quantity after every flow up to and
/// including that date, so the cumulative quantity as of any date is one
/// ordered-map lookup. Flows sharing a date add up.
///
/// # Example
///
/// ```rust
/// use cascade_core::ledger::TransactionLedger;
/// use cascade_core::types::{Date, PositionEvent};
/// use rust_decimal::Decimal;
///
/// let day = Date::from_ymd(2016, 1, 3).unwrap();
/// let ledger = TransactionLedger::from_events([
///     PositionEvent::new("I1", day, Decimal::from(10)),
///     PositionEvent::new("I1", day, Decimal::from(-4)),
/// ])
/// .unwrap();
///
/// assert_eq!(ledger.cumulative_as_of("I1", day), Decimal::ZERO);
/// assert_eq!(ledger.cumulative_as_of("I1", day.next_day()), Decimal::from(6));
/// assert_eq!(ledger.cumulative_as_of("unknown", day.next_day()), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionLedger {
    totals: HashMap<PositionId, BTreeMap<Date, Decimal>>,
    events: usize,
}

impl TransactionLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from already-validated events.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::Arithmetic` if a position's running total
    /// overflows.
    pub fn from_events(events: impl IntoIterator<Item = PositionEvent>) -> CascadeResult<Self> {
        let mut flows: HashMap<PositionId, BTreeMap<Date, Decimal>> = HashMap::new();
        let mut count = 0;

        for event in events {
            let slot = flows
                .entry(event.position)
                .or_default()
                .entry(event.date)
                .or_insert(Decimal::ZERO);
            *slot = slot
                .checked_add(event.quantity)
                .ok_or_else(|| CascadeError::arithmetic("position flows overflow"))?;
            count += 1;
        }

        let mut totals = HashMap::with_capacity(flows.len());
        for (position, by_date) in flows {
            let mut running = Decimal::ZERO;
            let mut cumulative = BTreeMap::new();
            for (date, flow) in by_date {
                running = running.checked_add(flow).ok_or_else(|| {
                    CascadeError::arithmetic(format!("running total of {position} overflows"))
                })?;
                cumulative.insert(date, running);
            }
            totals.insert(position, cumulative);
        }

        Ok(Self {
            totals,
            events: count,
        })
    }

    /// Validates raw rows and builds a new ledger from them.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::Validation` naming the first row with a missing
    /// position id, date or value, or an unparseable date or value.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a PositionRow>) -> CascadeResult<Self> {
        let events = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| PositionEvent::try_from(row).map_err(|e| e.at_record(i + 1)))
            .collect::<CascadeResult<Vec<_>>>()?;
        Self::from_events(events)
    }

    /// Replaces the ledger's contents with the given rows.
    ///
    /// On error the ledger is left as it was.
    pub fn load<'a>(
        &mut self,
        rows: impl IntoIterator<Item = &'a PositionRow>,
    ) -> CascadeResult<()> {
        info!("Loading transactions");
        let loaded = Self::from_rows(rows)?;
        *self = loaded;
        info!(
            events = self.event_count(),
            positions = self.position_count(),
            "Loaded transactions"
        );
        Ok(())
    }

    /// Net quantity of `position` from all flows strictly before `date`.
    pub fn cumulative_as_of(&self, position: &str, date: Date) -> Decimal {
        let Some(history) = self.totals.get(position) else {
            debug!(position, "No transactions for position");
            return Decimal::ZERO;
        };

        history
            .range(..date)
            .next_back()
            .map_or(Decimal::ZERO, |(_, total)| *total)
    }

    /// Number of events loaded.
    pub fn fact_count(&self) -> usize {
        self.event_count()
    }

    /// Number of events loaded, counting same-date events separately.
    pub fn event_count(&self) -> usize {
        self.events
    }

    /// Number of distinct positions with at least one event.
    pub fn position_count(&self) -> usize {
        self.totals.len()
    }
}

impl PositionSource for TransactionLedger {
    fn cumulative_as_of(&self, position: &str, date: Date) -> Decimal {
        TransactionLedger::cumulative_as_of(self, position, date)
    }
}
