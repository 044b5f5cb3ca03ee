//! Ownership graph: per-owner holdings trees with shared fund subtrees.
//!
//! Flat ownership records are grouped by owner and expanded depth-first into
//! trees. A fund held by many owners is expanded once; every fund node that
//! refers to it holds a handle to the same child sequence.
//!
//! All trees are built while loading. A fund that holds itself, directly or
//! through other funds, fails the load with
//! [`CascadeError::CyclicOwnership`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::info;

use crate::error::{CascadeError, CascadeResult};
use crate::types::{HoldingKind, OwnerId, OwnershipRecord, OwnershipRow, PositionId};

/// Shared, immutable sequence of holdings.
pub type Holdings = Arc<[OwnershipNode]>;

// =============================================================================
// TREE TYPES
// =============================================================================

/// One holding in an owner's tree.
///
/// Stock and real estate nodes are leaves. A fund node's children are the
/// holdings of the owned fund, shared with every other node holding that fund.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipNode {
    position_id: PositionId,
    kind: HoldingKind,
    asset_key: String,
    children: Holdings,
}

impl OwnershipNode {
    /// Position the holding's transactions are booked against.
    pub fn position_id(&self) -> &PositionId {
        &self.position_id
    }

    /// What is held.
    pub fn kind(&self) -> HoldingKind {
        self.kind
    }

    /// ISIN, locality, or the owned fund's owner id.
    pub fn asset_key(&self) -> &str {
        &self.asset_key
    }

    /// Holdings of the owned fund; empty for leaves.
    pub fn children(&self) -> &[OwnershipNode] {
        &self.children
    }

    /// Shared handle to the children, for identity comparisons.
    pub fn children_handle(&self) -> &Holdings {
        &self.children
    }

    /// Returns true for fund holdings.
    pub fn is_fund(&self) -> bool {
        self.kind == HoldingKind::Fund
    }
}

/// Root of one owner's holdings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerTree {
    owner_id: OwnerId,
    holdings: Holdings,
}

impl OwnerTree {
    /// The owner this tree belongs to.
    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Direct holdings in input order.
    pub fn holdings(&self) -> &[OwnershipNode] {
        &self.holdings
    }

    /// Shared handle to the direct holdings.
    pub fn holdings_handle(&self) -> &Holdings {
        &self.holdings
    }

    /// Returns true if the owner holds nothing (or is unknown).
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Visits every node depth-first in input order, with its depth below
    /// the root (direct holdings are at depth 0).
    ///
    /// Shared fund subtrees are visited once per path leading to them.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &OwnershipNode),
    {
        let mut pending = vec![self.holdings.iter()];
        while let Some(level) = pending.last_mut() {
            match level.next() {
                Some(node) => {
                    visit(pending.len() - 1, node);
                    pending.push(node.children().iter());
                }
                None => {
                    pending.pop();
                }
            }
        }
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// Holdings trees for every owner of one load.
#[derive(Debug, Clone)]
pub struct OwnershipGraph {
    trees: HashMap<OwnerId, Holdings>,
    build_order: Vec<OwnerId>,
    owners: Vec<OwnerId>,
    records: usize,
    empty: Holdings,
}

impl Default for OwnershipGraph {
    fn default() -> Self {
        Self {
            trees: HashMap::new(),
            build_order: Vec::new(),
            owners: Vec::new(),
            records: 0,
            empty: Arc::from(Vec::new()),
        }
    }
}

impl OwnershipGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from already-validated records.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::CyclicOwnership` if any fund holds itself.
    pub fn from_records(records: impl IntoIterator<Item = OwnershipRecord>) -> CascadeResult<Self> {
        let mut by_owner: HashMap<OwnerId, Vec<OwnershipRecord>> = HashMap::new();
        let mut owners = Vec::new();
        let mut count = 0;

        for record in records {
            let slot = by_owner.entry(record.owner_id.clone()).or_insert_with(|| {
                owners.push(record.owner_id.clone());
                Vec::new()
            });
            slot.push(record);
            count += 1;
        }

        let empty: Holdings = Arc::from(Vec::new());
        let mut builder = TreeBuilder {
            index: &by_owner,
            built: HashMap::with_capacity(by_owner.len()),
            build_order: Vec::with_capacity(by_owner.len()),
            expanding: HashSet::new(),
            empty: Arc::clone(&empty),
        };
        for owner in &owners {
            builder.holdings_of(owner)?;
        }

        Ok(Self {
            trees: builder.built,
            build_order: builder.build_order,
            owners,
            records: count,
            empty,
        })
    }

    /// Validates raw rows and builds a new graph from them.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::Validation` naming the first invalid row, or
    /// `CascadeError::CyclicOwnership` if any fund holds itself.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a OwnershipRow>) -> CascadeResult<Self> {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| OwnershipRecord::try_from(row).map_err(|e| e.at_record(i + 1)))
            .collect::<CascadeResult<Vec<_>>>()?;
        Self::from_records(records)
    }

    /// Replaces the graph with one built from the given rows.
    ///
    /// On error the graph is left as it was.
    pub fn load<'a>(
        &mut self,
        rows: impl IntoIterator<Item = &'a OwnershipRow>,
    ) -> CascadeResult<()> {
        info!("Loading investments");
        let loaded = Self::from_rows(rows)?;
        *self = loaded;
        info!(
            records = self.record_count(),
            owners = self.owner_count(),
            "Loaded investments"
        );
        Ok(())
    }

    /// Holdings tree of `owner`.
    ///
    /// Unknown owners get an empty tree, indistinguishable from an owner with
    /// no holdings.
    pub fn owner_tree(&self, owner: &str) -> OwnerTree {
        let holdings = self
            .trees
            .get(owner)
            .map_or_else(|| Arc::clone(&self.empty), Arc::clone);
        OwnerTree {
            owner_id: OwnerId::new(owner),
            holdings,
        }
    }

    /// Owners with at least one record, in order of first appearance.
    pub fn owners(&self) -> impl Iterator<Item = &OwnerId> {
        self.owners.iter()
    }

    /// Number of owners with at least one record.
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Number of ownership records loaded.
    pub fn record_count(&self) -> usize {
        self.records
    }
}

impl Drop for OwnershipGraph {
    fn drop(&mut self) {
        // Holders go before the funds they hold, so no release runs down a
        // whole fund chain at once.
        for owner in self.build_order.iter().rev() {
            self.trees.remove(owner);
        }
    }
}

/// Depth-first expansion state for one build.
struct TreeBuilder<'a> {
    index: &'a HashMap<OwnerId, Vec<OwnershipRecord>>,
    built: HashMap<OwnerId, Holdings>,
    /// Owners in the order their holdings were finished.
    build_order: Vec<OwnerId>,
    expanding: HashSet<OwnerId>,
    empty: Holdings,
}

/// An owner whose holdings are being expanded.
struct Expansion<'a> {
    owner: OwnerId,
    records: &'a [OwnershipRecord],
    nodes: Vec<OwnershipNode>,
}

impl<'a> TreeBuilder<'a> {
    /// Returns the holdings of `owner`, expanding them on first request.
    ///
    /// Expansion uses an explicit stack, so nesting depth is bounded by
    /// memory rather than by the call stack.
    fn holdings_of(&mut self, owner: &OwnerId) -> CascadeResult<Holdings> {
        if let Some(holdings) = self.lookup(owner) {
            return Ok(holdings);
        }

        let mut stack = Vec::new();
        self.begin(owner, &mut stack);

        while let Some(top) = stack.last_mut() {
            let records = top.records;
            let Some(record) = records.get(top.nodes.len()) else {
                let finished = stack.pop();
                if let Some(Expansion { owner, nodes, .. }) = finished {
                    let holdings = self.finish(owner, nodes);
                    if stack.is_empty() {
                        return Ok(holdings);
                    }
                }
                continue;
            };

            let children = match record.kind {
                HoldingKind::Fund => {
                    let fund = OwnerId::new(record.asset_key.as_str());
                    if let Some(holdings) = self.lookup(&fund) {
                        holdings
                    } else if self.expanding.contains(&fund) {
                        return Err(cycle_through(&stack, &fund));
                    } else {
                        self.begin(&fund, &mut stack);
                        continue;
                    }
                }
                HoldingKind::Stock | HoldingKind::RealEstate => Arc::clone(&self.empty),
            };
            top.nodes.push(OwnershipNode {
                position_id: record.position_id.clone(),
                kind: record.kind,
                asset_key: record.asset_key.clone(),
                children,
            });
        }

        Ok(Arc::clone(&self.empty))
    }

    /// Finished holdings of `owner`; funds nobody recorded holdings for are
    /// finished as empty on first sight.
    fn lookup(&mut self, owner: &OwnerId) -> Option<Holdings> {
        if let Some(holdings) = self.built.get(owner) {
            return Some(Arc::clone(holdings));
        }
        if self.index.contains_key(owner) {
            return None;
        }
        let empty = Arc::clone(&self.empty);
        self.built.insert(owner.clone(), Arc::clone(&empty));
        self.build_order.push(owner.clone());
        Some(empty)
    }

    fn begin(&mut self, owner: &OwnerId, stack: &mut Vec<Expansion<'a>>) {
        let index = self.index;
        let records = index.get(owner).map_or(&[][..], Vec::as_slice);
        self.expanding.insert(owner.clone());
        stack.push(Expansion {
            owner: owner.clone(),
            records,
            nodes: Vec::with_capacity(records.len()),
        });
    }

    fn finish(&mut self, owner: OwnerId, nodes: Vec<OwnershipNode>) -> Holdings {
        self.expanding.remove(&owner);
        let holdings: Holdings = Arc::from(nodes);
        self.built.insert(owner.clone(), Arc::clone(&holdings));
        self.build_order.push(owner);
        holdings
    }
}

fn cycle_through(stack: &[Expansion<'_>], owner: &OwnerId) -> CascadeError {
    let start = stack.iter().position(|e| &e.owner == owner).unwrap_or(0);
    let mut path: Vec<String> = stack[start..].iter().map(|e| e.owner.0.clone()).collect();
    path.push(owner.0.clone());
    CascadeError::cyclic(path)
}
