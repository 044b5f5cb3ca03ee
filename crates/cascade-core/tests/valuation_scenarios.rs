//! Integration tests for cascade-core.
//!
//! These tests load raw rows into a snapshot and value owners end to end.

use std::sync::Arc;

use cascade_core::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// TEST FIXTURES
// =============================================================================

fn s(v: &str) -> Option<String> {
    Some(v.to_string())
}

fn stock(owner: &str, position: &str, isin: &str) -> OwnershipRow {
    OwnershipRow {
        owner_id: s(owner),
        position_id: s(position),
        kind: s("Stock"),
        isin: s(isin),
        ..OwnershipRow::default()
    }
}

fn real_estate(owner: &str, position: &str, city: &str) -> OwnershipRow {
    OwnershipRow {
        owner_id: s(owner),
        position_id: s(position),
        kind: s("RealEstate"),
        city: s(city),
        ..OwnershipRow::default()
    }
}

fn fund(owner: &str, position: &str, fund_owner: &str) -> OwnershipRow {
    OwnershipRow {
        owner_id: s(owner),
        position_id: s(position),
        kind: s("Fonds"),
        fund_owner_id: s(fund_owner),
        ..OwnershipRow::default()
    }
}

fn price(isin: &str, date: &str, value: &str) -> PriceRow {
    PriceRow {
        instrument_key: s(isin),
        date: s(date),
        price: s(value),
    }
}

fn flow(position: &str, date: &str, value: &str) -> PositionRow {
    PositionRow {
        position_id: s(position),
        date: s(date),
        value: s(value),
    }
}

fn as_of() -> Date {
    Date::parse("2023-01-01").unwrap()
}

/// Investor1 -> Fonds1 -> Fonds2 -> 100 x ISIN0, plus a direct stock and a
/// property, and Investor2 sharing Fonds2.
fn nested_snapshot() -> Snapshot {
    let ownership = vec![
        fund("Investor1", "I1", "Fonds1"),
        stock("Investor1", "I2", "ISIN1"),
        real_estate("Investor1", "I3", "Frankfurt"),
        fund("Investor2", "I4", "Fonds2"),
        fund("Fonds1", "F1", "Fonds2"),
        stock("Fonds2", "F2", "ISIN0"),
    ];
    let prices = vec![
        price("ISIN0", "2022-06-01", "1000"),
        price("ISIN1", "2022-06-01", "100"),
    ];
    let positions = vec![
        flow("I1", "2022-06-01", "0.5"),
        flow("I2", "2022-06-01", "3"),
        flow("I3", "2022-06-01", "250000"),
        flow("I4", "2022-06-01", "10"),
        flow("F1", "2022-06-01", "0.2"),
        flow("F2", "2022-06-01", "100"),
    ];
    Snapshot::load_all(&ownership, &prices, &positions).unwrap()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_stock_uses_latest_earlier_price() {
    let snapshot = Snapshot::load_all(
        &[stock("Investor1", "I1", "ISIN0")],
        &[price("ISIN0", "2022-06-01", "100"), price("ISIN0", "2023-01-01", "120")],
        &[flow("I1", "2022-06-01", "100")],
    )
    .unwrap();

    assert_eq!(snapshot.quotes().price_as_of("ISIN0", as_of()), Some(dec!(100)));
    assert_eq!(snapshot.valuate("Investor1", as_of()).unwrap(), dec!(10000));
}

#[test]
fn test_single_fund_look_through() {
    let snapshot = Snapshot::load_all(
        &[fund("Investor1", "I1", "F"), stock("F", "F1", "ISIN0")],
        &[price("ISIN0", "2022-06-01", "1000")],
        &[flow("I1", "2022-06-01", "0.5"), flow("F1", "2022-06-01", "100")],
    )
    .unwrap();

    assert_eq!(snapshot.valuate("F", as_of()).unwrap(), dec!(100000));
    assert_eq!(snapshot.valuate("Investor1", as_of()).unwrap(), dec!(500));
}

#[test]
fn test_nested_funds() {
    let snapshot = nested_snapshot();

    assert_eq!(snapshot.valuate("Fonds2", as_of()).unwrap(), dec!(100000));
    assert_eq!(snapshot.valuate("Fonds1", as_of()).unwrap(), dec!(200));

    // 0.5 * 200 / 100 + 3 * 100 + 250000
    assert_eq!(snapshot.valuate("Investor1", as_of()).unwrap(), dec!(250301));
    // 10 * 100000 / 100
    assert_eq!(snapshot.valuate("Investor2", as_of()).unwrap(), dec!(10000));
}

#[test]
fn test_breakdown_matches_total() {
    let snapshot = nested_snapshot();
    let parts = snapshot.breakdown("Investor1", as_of()).unwrap();

    let amounts: Vec<_> = parts.iter().map(|c| (c.position_id.as_str(), c.amount())).collect();
    assert_eq!(amounts, [("I1", dec!(1)), ("I2", dec!(300)), ("I3", dec!(250000))]);

    let total: Decimal = parts.iter().map(Contribution::amount).sum();
    assert_eq!(total, snapshot.valuate("Investor1", as_of()).unwrap());
}

#[test]
fn test_missing_leaf_zeroes_its_chain_only() {
    let ownership = vec![
        fund("Investor1", "I1", "Fonds1"),
        stock("Investor1", "I2", "ISIN1"),
        fund("Fonds1", "F1", "Fonds2"),
        stock("Fonds2", "F2", "ISIN9"),
    ];
    let prices = vec![price("ISIN1", "2022-06-01", "100")];
    let positions = vec![
        flow("I1", "2022-06-01", "0.5"),
        flow("I2", "2022-06-01", "3"),
        flow("F1", "2022-06-01", "0.2"),
        flow("F2", "2022-06-01", "100"),
    ];
    let snapshot = Snapshot::load_all(&ownership, &prices, &positions).unwrap();

    assert_eq!(snapshot.valuate("Fonds2", as_of()).unwrap(), Decimal::ZERO);
    assert_eq!(snapshot.valuate("Fonds1", as_of()).unwrap(), Decimal::ZERO);
    assert_eq!(snapshot.valuate("Investor1", as_of()).unwrap(), dec!(300));
}

#[test]
fn test_zero_position_zeroes_contribution() {
    let snapshot = Snapshot::load_all(
        &[stock("Investor1", "I1", "ISIN0")],
        &[price("ISIN0", "2022-06-01", "100")],
        &[flow("I1", "2022-06-01", "5"), flow("I1", "2022-07-01", "-5")],
    )
    .unwrap();

    assert_eq!(snapshot.valuate("Investor1", as_of()).unwrap(), Decimal::ZERO);
    assert_eq!(
        snapshot.valuate("Investor1", Date::parse("2022-06-15").unwrap()).unwrap(),
        dec!(500)
    );
}

#[test]
fn test_unknown_owner_is_zero() {
    let snapshot = nested_snapshot();
    assert_eq!(snapshot.valuate("Nobody", as_of()).unwrap(), Decimal::ZERO);
    assert!(snapshot.owner_tree("Nobody").is_empty());
}

#[test]
fn test_values_before_first_event_are_zero() {
    let snapshot = nested_snapshot();
    let day = Date::parse("2022-06-01").unwrap();
    assert_eq!(snapshot.valuate("Investor1", day).unwrap(), Decimal::ZERO);
}

#[test]
fn test_shared_fund_subtree() {
    let snapshot = nested_snapshot();
    let graph = snapshot.graph();

    let via_investor = graph.owner_tree("Investor2");
    let via_fund = graph.owner_tree("Fonds1");
    let a = via_investor.holdings()[0].children_handle();
    let b = via_fund.holdings()[0].children_handle();

    assert!(Arc::ptr_eq(a, b));
    assert_eq!(graph.owner_tree("Investor1"), graph.owner_tree("Investor1"));
}

#[test]
fn test_layered_shared_funds() {
    // Every fund in a layer holds 50% of both funds in the next layer.
    const LAYERS: usize = 40;
    let mut ownership = vec![fund("Investor1", "I1", "L0A")];
    let mut positions = vec![flow("I1", "2022-06-01", "100")];
    for layer in 0..LAYERS {
        for side in ["A", "B"] {
            let owner = format!("L{layer}{side}");
            if layer + 1 == LAYERS {
                let position = format!("{owner}-S");
                ownership.push(stock(&owner, &position, "ISIN0"));
                positions.push(flow(&position, "2022-06-01", "10"));
            } else {
                for next in ["A", "B"] {
                    let position = format!("{owner}-{next}");
                    ownership.push(fund(&owner, &position, &format!("L{}{next}", layer + 1)));
                    positions.push(flow(&position, "2022-06-01", "50"));
                }
            }
        }
    }
    let snapshot =
        Snapshot::load_all(&ownership, &[price("ISIN0", "2022-06-01", "100")], &positions).unwrap();

    assert_eq!(snapshot.valuate("Investor1", as_of()).unwrap(), dec!(1000));
    assert_eq!(snapshot.valuate("L0B", as_of()).unwrap(), dec!(1000));

    let parts = snapshot.breakdown("L0A", as_of()).unwrap();
    let amounts: Vec<_> = parts.iter().map(Contribution::amount).collect();
    assert_eq!(amounts, [dec!(500), dec!(500)]);
}

#[test]
fn test_deep_fund_chain() {
    const DEPTH: usize = 10_000;
    let mut ownership = Vec::with_capacity(DEPTH + 1);
    let mut positions = Vec::with_capacity(DEPTH + 1);
    for level in 0..DEPTH {
        let position = format!("P{level}");
        ownership.push(fund(&format!("C{level}"), &position, &format!("C{}", level + 1)));
        positions.push(flow(&position, "2022-06-01", "100"));
    }
    ownership.push(stock(&format!("C{DEPTH}"), "S", "ISIN0"));
    positions.push(flow("S", "2022-06-01", "7"));

    let snapshot =
        Snapshot::load_all(&ownership, &[price("ISIN0", "2022-06-01", "3")], &positions).unwrap();
    assert_eq!(snapshot.valuate("C0", as_of()).unwrap(), dec!(21));

    let mut depth = 0;
    snapshot.owner_tree("C0").walk(|d, _| depth = depth.max(d));
    assert_eq!(depth, DEPTH);
}

#[test]
fn test_cycle_fails_load() {
    let err = Snapshot::load_all(
        &[
            fund("Investor1", "I1", "Fonds2"),
            fund("Fonds2", "F1", "Fonds4"),
            fund("Fonds4", "F2", "Fonds2"),
        ],
        &[],
        &[],
    )
    .unwrap_err();

    assert_eq!(
        err.root(),
        &CascadeError::CyclicOwnership {
            path: vec!["Fonds2".into(), "Fonds4".into(), "Fonds2".into()],
        }
    );
    assert!(matches!(err, CascadeError::Input { input: "investments", .. }));
}

#[test]
fn test_valuator_reload_cycle() {
    let valuator = Valuator::new();
    assert_eq!(valuator.valuate("Investor1", as_of()), Err(CascadeError::NotLoaded));

    let first = valuator
        .load_all(
            &[stock("Investor1", "I1", "ISIN0")],
            &[price("ISIN0", "2022-06-01", "10")],
            &[flow("I1", "2022-06-01", "2")],
        )
        .unwrap();
    assert_eq!(valuator.valuate("Investor1", as_of()).unwrap(), dec!(20));

    let bad = valuator.load_all(
        &[stock("Investor1", "I1", "ISIN0")],
        &[price("ISIN0", "2022-06-01", "ten")],
        &[],
    );
    let err = bad.unwrap_err();
    assert!(matches!(err, CascadeError::Input { input: "quotes", .. }));
    assert!(matches!(
        err.root(),
        CascadeError::Validation {
            record: 1,
            field: "price",
            ..
        }
    ));
    assert_eq!(valuator.snapshot().unwrap().version(), first.version());

    let second = valuator
        .load_all(
            &[stock("Investor1", "I1", "ISIN0")],
            &[price("ISIN0", "2022-06-01", "11")],
            &[flow("I1", "2022-06-01", "2")],
        )
        .unwrap();
    assert!(second.version() > first.version());
    assert_eq!(valuator.valuate("Investor1", as_of()).unwrap(), dec!(22));
}

#[test]
fn test_batch_matches_single_valuations() {
    let snapshot = nested_snapshot();
    let owners = ["Investor1", "Investor2", "Fonds1", "Fonds2", "Nobody"];
    let queries: Vec<_> = owners
        .iter()
        .cycle()
        .take(500)
        .map(|o| ValuationQuery::new(*o, as_of()))
        .collect();

    let batch = snapshot
        .valuate_many(&queries, &BatchConfig::new().with_parallel_threshold(10))
        .unwrap();
    for (query, value) in queries.iter().zip(&batch) {
        assert_eq!(*value, snapshot.valuate(query.owner.as_str(), query.date).unwrap());
    }
}
