//! Look-through valuation of ownership trees.
//!
//! Each holding is valued by kind:
//!
//! - **Stock**: units held × latest price before the valuation date.
//! - **Real estate**: the cumulative transaction amount itself.
//! - **Fund**: percentage held × value of the fund's own holdings / 100.
//!
//! A holding whose value cannot be determined (no units, no price, empty fund)
//! contributes nothing to its parent. It never aborts the valuation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CascadeError, CascadeResult};
use crate::ownership::{OwnershipGraph, OwnershipNode};
use crate::traits::{PositionSource, PriceSource};
use crate::types::{Date, HoldingKind, PositionId};

/// Value of one direct holding of an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contribution {
    /// Position of the holding.
    pub position_id: PositionId,
    /// What is held.
    pub kind: HoldingKind,
    /// ISIN, locality or owned fund id.
    pub asset_key: String,
    /// Value as of the valuation date; `None` when it could not be determined.
    pub value: Option<Decimal>,
}

impl Contribution {
    /// Value counted towards the owner's total.
    pub fn amount(&self) -> Decimal {
        self.value.unwrap_or(Decimal::ZERO)
    }
}

/// Values owners' holdings against price and position sources.
///
/// # Example
///
/// ```rust
/// use cascade_core::ledger::TransactionLedger;
/// use cascade_core::ownership::OwnershipGraph;
/// use cascade_core::quotes::QuoteStore;
/// use cascade_core::types::{Date, OwnershipRecord, PositionEvent, PricePoint};
/// use cascade_core::valuation::ValuationEngine;
/// use rust_decimal::Decimal;
///
/// let bought = Date::from_ymd(2022, 6, 1).unwrap();
/// let graph = OwnershipGraph::from_records([OwnershipRecord::stock("Alice", "P1", "ISIN0")]).unwrap();
/// let quotes = QuoteStore::from_points([PricePoint::new("ISIN0", bought, Decimal::from(100))]);
/// let ledger = TransactionLedger::from_events([PositionEvent::new("P1", bought, Decimal::from(100))]).unwrap();
///
/// let engine = ValuationEngine::new(&graph, &quotes, &ledger);
/// let value = engine.valuate("Alice", Date::from_ymd(2023, 1, 1).unwrap()).unwrap();
/// assert_eq!(value, Decimal::from(10_000));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ValuationEngine<'a, Q, P> {
    graph: &'a OwnershipGraph,
    quotes: Q,
    positions: P,
}

impl<'a, Q, P> ValuationEngine<'a, Q, P>
where
    Q: PriceSource,
    P: PositionSource,
{
    /// Creates an engine over a graph and its two lookup sources.
    pub fn new(graph: &'a OwnershipGraph, quotes: Q, positions: P) -> Self {
        Self {
            graph,
            quotes,
            positions,
        }
    }

    /// Total value of everything `owner` holds, directly or through funds,
    /// as of `date`.
    ///
    /// Unknown owners are worth zero.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::Arithmetic` if a decimal operation overflows.
    /// Missing prices or positions are never errors.
    pub fn valuate(&self, owner: &str, date: Date) -> CascadeResult<Decimal> {
        debug!(owner, %date, "Valuation started");

        let tree = self.graph.owner_tree(owner);
        if tree.is_empty() {
            debug!(owner, "Owner has no holdings");
        }
        let value = self.value_holdings(None, tree.holdings(), date, &mut FundValues::new())?;

        info!(owner, %date, %value, "Valuation finished");
        Ok(value)
    }

    /// Value of each direct holding of `owner` as of `date`, in input order.
    ///
    /// The amounts add up to [`valuate`](Self::valuate).
    pub fn breakdown(&self, owner: &str, date: Date) -> CascadeResult<Vec<Contribution>> {
        let tree = self.graph.owner_tree(owner);
        let mut funds = FundValues::new();
        tree.holdings()
            .iter()
            .map(|node| -> CascadeResult<Contribution> {
                Ok(Contribution {
                    position_id: node.position_id().clone(),
                    kind: node.kind(),
                    asset_key: node.asset_key().to_string(),
                    value: self.value_node(node, date, &mut funds)?,
                })
            })
            .collect()
    }

    /// Sums `nodes`, expanding funds on an explicit stack.
    ///
    /// A fund is valued once per call and its total kept in `funds` under
    /// its owner id; every later holding of the same fund reuses it. When
    /// `fund` is set, the sum is recorded there too.
    fn value_holdings<'t>(
        &self,
        fund: Option<&'t str>,
        nodes: &'t [OwnershipNode],
        date: Date,
        funds: &mut FundValues<'t>,
    ) -> CascadeResult<Decimal> {
        let mut stack = vec![Pending::new(fund, nodes)];

        while let Some(top) = stack.last_mut() {
            let nodes = top.nodes;
            let Some(node) = nodes.get(top.next) else {
                let (fund, total) = (top.fund, top.total);
                stack.pop();
                if let Some(fund) = fund {
                    funds.insert(fund, total);
                }
                if stack.is_empty() {
                    return Ok(total);
                }
                continue;
            };

            if node.is_fund()
                && !funds.contains_key(node.asset_key())
                && self.fund_share(node, date).is_some()
            {
                stack.push(Pending::new(Some(node.asset_key()), node.children()));
                continue;
            }

            let value = self.value_node(node, date, funds)?;
            top.next += 1;
            if let Some(value) = value {
                top.total = top
                    .total
                    .checked_add(value)
                    .ok_or_else(|| CascadeError::arithmetic("holdings total overflows"))?;
            }
        }

        Ok(Decimal::ZERO)
    }

    fn value_node<'t>(
        &self,
        node: &'t OwnershipNode,
        date: Date,
        funds: &mut FundValues<'t>,
    ) -> CascadeResult<Option<Decimal>> {
        match node.kind() {
            HoldingKind::Stock => self.value_stock(node, date),
            HoldingKind::RealEstate => Ok(Some(self.value_real_estate(node, date))),
            HoldingKind::Fund => self.value_fund(node, date, funds),
        }
    }

    fn value_stock(&self, node: &OwnershipNode, date: Date) -> CascadeResult<Option<Decimal>> {
        let units = self
            .positions
            .cumulative_as_of(node.position_id().as_str(), date);
        if units.is_zero() {
            debug!(position = %node.position_id(), isin = node.asset_key(), "No units held");
            return Ok(None);
        }

        let Some(price) = self.quotes.price_as_of(node.asset_key(), date) else {
            debug!(
                position = %node.position_id(),
                isin = node.asset_key(),
                "Units held without a quote"
            );
            return Ok(None);
        };

        units
            .checked_mul(price)
            .map(Some)
            .ok_or_else(|| {
                CascadeError::arithmetic(format!("value of {} overflows", node.position_id()))
            })
    }

    /// Real estate transactions carry absolute amounts.
    fn value_real_estate(&self, node: &OwnershipNode, date: Date) -> Decimal {
        self.positions
            .cumulative_as_of(node.position_id().as_str(), date)
    }

    /// Percentage held in the fund, if the holding can carry any value.
    fn fund_share(&self, node: &OwnershipNode, date: Date) -> Option<Decimal> {
        let share_pct = self
            .positions
            .cumulative_as_of(node.position_id().as_str(), date);
        if share_pct.is_zero() || node.children().is_empty() {
            return None;
        }
        Some(share_pct)
    }

    fn value_fund<'t>(
        &self,
        node: &'t OwnershipNode,
        date: Date,
        funds: &mut FundValues<'t>,
    ) -> CascadeResult<Option<Decimal>> {
        let Some(share_pct) = self.fund_share(node, date) else {
            debug!(
                position = %node.position_id(),
                fund = node.asset_key(),
                "No share held in fund, or fund has no holdings"
            );
            return Ok(None);
        };

        let fund_value = match funds.get(node.asset_key()) {
            Some(&value) => value,
            None => self.value_holdings(Some(node.asset_key()), node.children(), date, funds)?,
        };

        share_pct
            .checked_mul(fund_value)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .map(Some)
            .ok_or_else(|| {
                CascadeError::arithmetic(format!("share of fund {} overflows", node.asset_key()))
            })
    }
}

/// Fund totals already computed during one valuation, by fund owner id.
type FundValues<'t> = HashMap<&'t str, Decimal>;

/// A holdings sequence being summed.
struct Pending<'t> {
    fund: Option<&'t str>,
    nodes: &'t [OwnershipNode],
    next: usize,
    total: Decimal,
}

impl<'t> Pending<'t> {
    fn new(fund: Option<&'t str>, nodes: &'t [OwnershipNode]) -> Self {
        Self {
            fund,
            nodes,
            next: 0,
            total: Decimal::ZERO,
        }
    }
}
