//! Property-based tests for store and valuation invariants.
//!
//! - Prices behave as a step function over strictly earlier dates
//! - Cumulative quantity equals the sum of strictly earlier flows
//! - Reloading replaces facts
//! - Self-holding funds fail to load
//! - Valuation is additive over sibling holdings

use cascade_core::prelude::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// GENERATORS
// =============================================================================

fn base() -> Date {
    Date::from_ymd(2020, 1, 1).unwrap()
}

fn day(offset: u32) -> Date {
    let mut d = base();
    for _ in 0..offset {
        d = d.next_day();
    }
    d
}

/// Decimal with two fractional digits.
fn amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_price_is_latest_strictly_earlier(
        points in prop::collection::vec((0u32..60, positive_amount()), 0..20),
        query in 0u32..70,
    ) {
        let store = QuoteStore::from_points(
            points.iter().map(|(o, p)| PricePoint::new("ISIN0", day(*o), *p)),
        );

        // Last write wins for a repeated date.
        let expected = points
            .iter()
            .enumerate()
            .filter(|(_, (o, _))| *o < query)
            .max_by_key(|(i, (o, _))| (*o, *i))
            .map(|(_, (_, p))| *p);

        prop_assert_eq!(store.price_as_of("ISIN0", day(query)), expected);
    }

    #[test]
    fn prop_cumulative_is_sum_of_earlier_flows(
        flows in prop::collection::vec((0u32..60, amount()), 0..30),
        query in 0u32..70,
    ) {
        let ledger = TransactionLedger::from_events(
            flows.iter().map(|(o, q)| PositionEvent::new("P1", day(*o), *q)),
        )
        .unwrap();

        let expected: Decimal = flows
            .iter()
            .filter(|(o, _)| *o < query)
            .map(|(_, q)| *q)
            .sum();

        prop_assert_eq!(ledger.cumulative_as_of("P1", day(query)), expected);
        prop_assert_eq!(ledger.cumulative_as_of("P2", day(query)), Decimal::ZERO);
        prop_assert_eq!(ledger.fact_count(), flows.len());
    }

    #[test]
    fn prop_reload_replaces_facts(
        first in prop::collection::vec((0u32..60, amount()), 0..20),
        second in prop::collection::vec((0u32..60, amount()), 0..20),
    ) {
        let rows = |flows: &[(u32, Decimal)]| -> Vec<PositionRow> {
            flows
                .iter()
                .map(|(o, q)| PositionRow {
                    position_id: Some("P1".into()),
                    date: Some(day(*o).to_string()),
                    value: Some(q.to_string()),
                })
                .collect()
        };

        let mut ledger = TransactionLedger::new();
        ledger.load(&rows(first.as_slice())).unwrap();
        ledger.load(&rows(second.as_slice())).unwrap();

        let expected: Decimal = second.iter().map(|(_, q)| *q).sum();
        prop_assert_eq!(ledger.fact_count(), second.len());
        prop_assert_eq!(ledger.cumulative_as_of("P1", day(100)), expected);
    }

    #[test]
    fn prop_fund_chain_closing_on_itself_fails(len in 1usize..8) {
        let mut records: Vec<_> = (0..len)
            .map(|i| {
                OwnershipRecord::fund(
                    &format!("Fund{i}"),
                    &format!("P{i}"),
                    &format!("Fund{}", (i + 1) % len),
                )
            })
            .collect();
        records.push(OwnershipRecord::fund("Investor", "IP", "Fund0"));

        let err = OwnershipGraph::from_records(records).unwrap_err();
        match err {
            CascadeError::CyclicOwnership { path } => {
                prop_assert_eq!(path.len(), len + 1);
                prop_assert_eq!(path.first(), path.last());
            }
            other => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_valuation_is_additive(
        units_a in positive_amount(),
        units_b in positive_amount(),
        price_a in positive_amount(),
        price_b in positive_amount(),
    ) {
        let bought = day(0);
        let as_of = day(1);
        let quotes = QuoteStore::from_points([
            PricePoint::new("ISIN_A", bought, price_a),
            PricePoint::new("ISIN_B", bought, price_b),
        ]);
        let ledger = TransactionLedger::from_events([
            PositionEvent::new("A", bought, units_a),
            PositionEvent::new("B", bought, units_b),
        ])
        .unwrap();

        let both = OwnershipGraph::from_records([
            OwnershipRecord::stock("Owner", "A", "ISIN_A"),
            OwnershipRecord::stock("Owner", "B", "ISIN_B"),
        ])
        .unwrap();
        let only_a = OwnershipGraph::from_records([OwnershipRecord::stock("Owner", "A", "ISIN_A")]).unwrap();
        let only_b = OwnershipGraph::from_records([OwnershipRecord::stock("Owner", "B", "ISIN_B")]).unwrap();

        let value = |graph: &OwnershipGraph| {
            ValuationEngine::new(graph, &quotes, &ledger)
                .valuate("Owner", as_of)
                .unwrap()
        };

        prop_assert_eq!(value(&both), value(&only_a) + value(&only_b));
    }
}
