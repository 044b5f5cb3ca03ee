//! Input rows and the validated facts built from them.
//!
//! Rows are what an input adapter hands over: every field optional, text as
//! read. Facts are immutable and satisfy the record invariants. Conversion
//! from row to fact is the only place per-record validation happens.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Date, InstrumentKey, OwnerId, PositionId};
use crate::error::{CascadeError, CascadeResult};

// =============================================================================
// HOLDING KIND
// =============================================================================

/// What an ownership record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoldingKind {
    /// Listed shares, priced per unit by ISIN.
    Stock,
    /// Property whose transactions carry absolute amounts.
    RealEstate,
    /// A percentage share in another owner's holdings.
    Fund,
}

impl HoldingKind {
    /// Name used in input files.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HoldingKind::Stock => "Stock",
            HoldingKind::RealEstate => "RealEstate",
            HoldingKind::Fund => "Fonds",
        }
    }

    /// Name of the field carrying the asset key for this kind.
    #[must_use]
    pub fn asset_field(&self) -> &'static str {
        match self {
            HoldingKind::Stock => "ISIN",
            HoldingKind::RealEstate => "city",
            HoldingKind::Fund => "fund owner id",
        }
    }
}

impl fmt::Display for HoldingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldingKind {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Stock" => Ok(HoldingKind::Stock),
            "RealEstate" => Ok(HoldingKind::RealEstate),
            "Fonds" | "Fund" => Ok(HoldingKind::Fund),
            other => Err(CascadeError::malformed(0, "kind", other)),
        }
    }
}

// =============================================================================
// RAW ROWS
// =============================================================================

/// One unvalidated ownership row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRow {
    /// Owning investor or fund.
    pub owner_id: Option<String>,
    /// Position the owner books transactions against.
    pub position_id: Option<String>,
    /// Holding kind as text.
    pub kind: Option<String>,
    /// ISIN, for stocks.
    pub isin: Option<String>,
    /// Locality key, for real estate.
    pub city: Option<String>,
    /// Owned fund's owner id, for funds.
    pub fund_owner_id: Option<String>,
}

/// One unvalidated price row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRow {
    /// Instrument key (ISIN).
    pub instrument_key: Option<String>,
    /// Effective date as text.
    pub date: Option<String>,
    /// Price per unit as text.
    pub price: Option<String>,
}

/// One unvalidated position row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRow {
    /// Position the quantity is booked against.
    pub position_id: Option<String>,
    /// Effective date as text.
    pub date: Option<String>,
    /// Signed quantity as text.
    pub value: Option<String>,
}

// =============================================================================
// VALIDATED FACTS
// =============================================================================

/// A validated ownership fact: `owner_id` holds `asset_key` through `position_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnershipRecord {
    /// Owning investor or fund.
    pub owner_id: OwnerId,
    /// Position the owner books transactions against.
    pub position_id: PositionId,
    /// What is held.
    pub kind: HoldingKind,
    /// ISIN for stocks, locality for real estate, owned fund's id for funds.
    pub asset_key: String,
}

impl OwnershipRecord {
    /// Creates a record from already-validated parts.
    pub fn new(
        owner_id: impl Into<String>,
        position_id: impl Into<String>,
        kind: HoldingKind,
        asset_key: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: OwnerId::new(owner_id),
            position_id: PositionId::new(position_id),
            kind,
            asset_key: asset_key.into(),
        }
    }

    /// Shorthand for a stock holding.
    pub fn stock(owner_id: &str, position_id: &str, isin: &str) -> Self {
        Self::new(owner_id, position_id, HoldingKind::Stock, isin)
    }

    /// Shorthand for a real estate holding.
    pub fn real_estate(owner_id: &str, position_id: &str, city: &str) -> Self {
        Self::new(owner_id, position_id, HoldingKind::RealEstate, city)
    }

    /// Shorthand for a fund holding.
    pub fn fund(owner_id: &str, position_id: &str, fund_owner_id: &str) -> Self {
        Self::new(owner_id, position_id, HoldingKind::Fund, fund_owner_id)
    }
}

impl TryFrom<&OwnershipRow> for OwnershipRecord {
    type Error = CascadeError;

    /// Validates owner id, then kind, then position id, then the asset key
    /// the kind calls for. The kind has to be known before its asset key can
    /// be picked.
    fn try_from(row: &OwnershipRow) -> CascadeResult<Self> {
        let owner_id = required(row.owner_id.as_deref(), "owner id")?;
        let kind: HoldingKind = required(row.kind.as_deref(), "kind")?.parse()?;
        let position_id = required(row.position_id.as_deref(), "position id")?;
        let asset_key = match kind {
            HoldingKind::Stock => row.isin.as_deref(),
            HoldingKind::RealEstate => row.city.as_deref(),
            HoldingKind::Fund => row.fund_owner_id.as_deref(),
        };
        let asset_key = required(asset_key, kind.asset_field())?;

        Ok(Self::new(owner_id, position_id, kind, asset_key))
    }
}

/// A validated price: `instrument` traded at `price` on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Priced instrument.
    pub instrument: InstrumentKey,
    /// Effective date.
    pub date: Date,
    /// Price per unit.
    pub price: Decimal,
}

impl PricePoint {
    /// Creates a price point.
    pub fn new(instrument: impl Into<String>, date: Date, price: Decimal) -> Self {
        Self {
            instrument: InstrumentKey::new(instrument),
            date,
            price,
        }
    }
}

impl TryFrom<&PriceRow> for PricePoint {
    type Error = CascadeError;

    fn try_from(row: &PriceRow) -> CascadeResult<Self> {
        let instrument = required(row.instrument_key.as_deref(), "instrument key")?;
        let date = parse_date(row.date.as_deref())?;
        let price = parse_decimal(row.price.as_deref(), "price")?;

        Ok(Self::new(instrument, date, price))
    }
}

/// A validated position flow: `quantity` booked against `position` on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEvent {
    /// Position the quantity is booked against.
    pub position: PositionId,
    /// Effective date.
    pub date: Date,
    /// Signed quantity: units, currency amount or fund percentage by kind.
    pub quantity: Decimal,
}

impl PositionEvent {
    /// Creates a position event.
    pub fn new(position: impl Into<String>, date: Date, quantity: Decimal) -> Self {
        Self {
            position: PositionId::new(position),
            date,
            quantity,
        }
    }
}

impl TryFrom<&PositionRow> for PositionEvent {
    type Error = CascadeError;

    fn try_from(row: &PositionRow) -> CascadeResult<Self> {
        let position = required(row.position_id.as_deref(), "position id")?;
        let date = parse_date(row.date.as_deref())?;
        let quantity = parse_decimal(row.value.as_deref(), "value")?;

        Ok(Self::new(position, date, quantity))
    }
}

// =============================================================================
// FIELD HELPERS
// =============================================================================

/// Returns the trimmed field, or a validation error if it is absent or blank.
fn required<'a>(value: Option<&'a str>, field: &'static str) -> CascadeResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CascadeError::missing(0, field)),
    }
}

fn parse_date(value: Option<&str>) -> CascadeResult<Date> {
    let text = required(value, "date")?;
    Date::parse(text).map_err(|_| CascadeError::malformed(0, "date", text))
}

fn parse_decimal(value: Option<&str>, field: &'static str) -> CascadeResult<Decimal> {
    let text = required(value, field)?;
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| CascadeError::malformed(0, field, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Fonds".parse::<HoldingKind>().unwrap(), HoldingKind::Fund);
        assert_eq!("Fund".parse::<HoldingKind>().unwrap(), HoldingKind::Fund);
        assert_eq!("RealEstate".parse::<HoldingKind>().unwrap(), HoldingKind::RealEstate);
        assert!("Bond".parse::<HoldingKind>().is_err());
        assert!("stock".parse::<HoldingKind>().is_err());
    }

    #[test]
    fn test_ownership_row_picks_kind_specific_key() {
        let row = OwnershipRow {
            owner_id: some("Investor1"),
            position_id: some("I4"),
            kind: some("RealEstate"),
            isin: some("ISIN9"),
            city: some("Bratislava"),
            fund_owner_id: None,
        };
        let record = OwnershipRecord::try_from(&row).unwrap();
        assert_eq!(record, OwnershipRecord::real_estate("Investor1", "I4", "Bratislava"));
    }

    #[test]
    fn test_ownership_row_validation_order() {
        let row = OwnershipRow::default();
        let err = OwnershipRecord::try_from(&row).unwrap_err();
        assert!(matches!(err, CascadeError::Validation { field: "owner id", .. }));

        let row = OwnershipRow {
            owner_id: some("Investor1"),
            kind: some("Fonds"),
            position_id: some("I1"),
            isin: some("ISIN0"),
            ..OwnershipRow::default()
        };
        let err = OwnershipRecord::try_from(&row).unwrap_err();
        assert!(matches!(err, CascadeError::Validation { field: "fund owner id", .. }));

        let row = OwnershipRow {
            owner_id: some("Investor1"),
            kind: some("Gold"),
            ..OwnershipRow::default()
        };
        let err = OwnershipRecord::try_from(&row).unwrap_err();
        assert!(matches!(err, CascadeError::Validation { field: "kind", .. }));
    }

    #[test]
    fn test_blank_fields_are_missing() {
        let row = OwnershipRow {
            owner_id: some("   "),
            ..OwnershipRow::default()
        };
        assert!(OwnershipRecord::try_from(&row).is_err());
    }

    #[test]
    fn test_price_row() {
        let row = PriceRow {
            instrument_key: some("ISIN1"),
            date: some("2016-06-07"),
            price: some("299.462"),
        };
        let point = PricePoint::try_from(&row).unwrap();
        assert_eq!(point.price, dec!(299.462));
        assert_eq!(point.date, Date::from_ymd(2016, 6, 7).unwrap());

        let row = PriceRow {
            price: some("n/a"),
            ..row
        };
        let err = PricePoint::try_from(&row).unwrap_err();
        assert!(matches!(err, CascadeError::Validation { field: "price", .. }));
    }

    #[test]
    fn test_position_row() {
        let row = PositionRow {
            position_id: some("Investment1"),
            date: some("2016-01-03"),
            value: some("-1.5e1"),
        };
        let event = PositionEvent::try_from(&row).unwrap();
        assert_eq!(event.quantity, dec!(-15));

        let row = PositionRow { date: None, ..row };
        let err = PositionEvent::try_from(&row).unwrap_err();
        assert!(matches!(err, CascadeError::Validation { field: "date", .. }));
    }
}
