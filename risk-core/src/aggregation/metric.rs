//! A single bucketed metric: one live bucket map per (metric, grouping)
//! pair (§3, §4.2).

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::aggregation::key::{extract_group_key, GroupKey, GroupingDimension};
use crate::aggregation::operator::{Bucket, Contribution, StageSelector, ValueExtractor};
use crate::core::TrackedOrder;

/// The `(group_key, contribution)` pair under which an order currently
/// contributes to one metric — the engine stores these in its snapshot
/// side-table so `remove`/`replace` can subtract exactly, even after a
/// replace has changed the order's group key (Design Note "Snapshot
/// bookkeeping").
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub key: GroupKey,
    pub contribution: Contribution,
}

#[derive(Debug, Clone)]
pub struct Metric {
    pub id: String,
    pub grouping: Vec<GroupingDimension>,
    pub stage: StageSelector,
    pub extractor: ValueExtractor,
    buckets: HashMap<GroupKey, Bucket>,
}

impl Metric {
    pub fn new(
        id: impl Into<String>,
        grouping: Vec<GroupingDimension>,
        stage: StageSelector,
        extractor: ValueExtractor,
    ) -> Self {
        Self {
            id: id.into(),
            grouping,
            stage,
            extractor,
            buckets: HashMap::new(),
        }
    }

    fn key_for(&self, order: &TrackedOrder) -> GroupKey {
        extract_group_key(&self.grouping, order)
    }

    /// `add(order)`: if the order's state matches the stage selector,
    /// applies its contribution and returns the snapshot the caller must
    /// retain for later symmetric removal. Returns `None` if the order does
    /// not currently contribute.
    pub fn add(&mut self, order: &TrackedOrder) -> Option<Snapshot> {
        if !self.stage.matches(order.state) {
            return None;
        }
        let key = self.key_for(order);
        let contribution = self.extractor.contribution(order);
        self.buckets
            .entry(key.clone())
            .or_insert_with(|| Bucket::identity_for(self.extractor))
            .add(&contribution);
        Some(Snapshot { key, contribution })
    }

    /// `remove(order, snapshot)`: symmetric subtraction using the saved
    /// snapshot from the moment the order last contributed.
    pub fn remove(&mut self, snapshot: &Snapshot) {
        if let Some(bucket) = self.buckets.get_mut(&snapshot.key) {
            bucket.sub(&snapshot.contribution);
        }
    }

    /// `replace(order, before_snapshot)`: remove the prior contribution then
    /// add the current one, atomic from any observer's perspective. Returns
    /// the new snapshot, or `None` if the order no longer contributes (the
    /// caller should then treat this as a plain `remove`).
    pub fn replace(&mut self, before: &Snapshot, order: &TrackedOrder) -> Option<Snapshot> {
        self.remove(before);
        self.add(order)
    }

    /// Projected post-contribution value of the bucket `order` would land
    /// in, without mutating any state (§4.2 "Pre-trade what-if").
    pub fn project(&self, order: &TrackedOrder) -> Decimal {
        let key = self.key_for(order);
        let contribution = self.extractor.contribution(order);
        let mut projected = self
            .buckets
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Bucket::identity_for(self.extractor));
        projected.add(&contribution);
        projected.value()
    }

    /// The group key a candidate order would project into, for limit-store
    /// lookups.
    pub fn key_for_candidate(&self, order: &TrackedOrder) -> GroupKey {
        self.key_for(order)
    }

    pub fn bucket_value(&self, key: &GroupKey) -> Decimal {
        self.buckets.get(key).map(Bucket::value).unwrap_or(Decimal::ZERO)
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&GroupKey, Decimal)> {
        self.buckets.iter().map(|(k, b)| (k, b.value()))
    }

    /// Full-rebuild reconciliation (§8 invariant 2): recomputes every
    /// bucket from scratch over the given order set and replaces current
    /// state. Used by tests and operational drift checks.
    pub fn rebuild<'a>(&mut self, orders: impl Iterator<Item = &'a TrackedOrder>) {
        self.buckets.clear();
        for order in orders {
            self.add(order);
        }
    }
}
