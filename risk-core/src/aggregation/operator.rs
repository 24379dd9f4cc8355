//! Stage selectors, value extractors and aggregation operators (§4.2).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{OrderState, TrackedOrder};

/// Which order states contribute to a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSelector {
    /// PENDING_NEW | OPEN | PENDING_REPLACE | PENDING_CANCEL
    Active,
    /// OPEN | PENDING_REPLACE
    Working,
    /// FILLED
    Filled,
}

impl StageSelector {
    pub fn matches(self, state: OrderState) -> bool {
        match self {
            StageSelector::Active => state.is_active(),
            StageSelector::Working => {
                matches!(state, OrderState::Open | OrderState::PendingReplace)
            }
            StageSelector::Filled => state == OrderState::Filled,
        }
    }
}

/// What an order contributes to its metric's accumulator, and how the
/// accumulator should be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueExtractor {
    /// `count` operator: every contributing order counts as one.
    Count,
    /// `sum` of `notional = price · leaves_qty`.
    GrossNotional,
    /// `signed_sum` of notional, positive for BID, negative for ASK.
    NetNotional,
    /// `sum` of `delta · leaves_qty`.
    GrossDelta,
    /// `signed_sum` of delta exposure, positive for BID, negative for ASK.
    NetDelta,
    /// `sum` of `vega · leaves_qty`.
    GrossVega,
    /// `set_add` keyed on the underlyer; exposed value is set size.
    DistinctUnderlyers,
}

/// A single order's contribution to a bucket, in the shape the bucket's
/// operator expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Contribution {
    Scalar(Decimal),
    Unit,
    Discriminator(String),
}

impl ValueExtractor {
    pub fn contribution(self, order: &TrackedOrder) -> Contribution {
        match self {
            ValueExtractor::Count => Contribution::Unit,
            ValueExtractor::GrossNotional => Contribution::Scalar(order.notional()),
            ValueExtractor::NetNotional => Contribution::Scalar(order.signed(order.notional())),
            ValueExtractor::GrossDelta => Contribution::Scalar(order.delta_exposure()),
            ValueExtractor::NetDelta => {
                Contribution::Scalar(order.signed(order.delta_exposure()))
            }
            ValueExtractor::GrossVega => Contribution::Scalar(order.vega_exposure()),
            ValueExtractor::DistinctUnderlyers => {
                Contribution::Discriminator(order.underlyer.clone())
            }
        }
    }
}

/// The bucket accumulator. One variant per operator family named in §4.2:
/// `sum`/`signed_sum` share the scalar accumulator (the sign is baked into
/// the contribution by the value extractor), `count` is its own variant, and
/// `set_add` keeps a discriminator→refcount map per Design Note "Set
/// cardinality with remove".
#[derive(Debug, Clone, PartialEq)]
pub enum Bucket {
    Scalar(Decimal),
    Count(u64),
    Set(HashMap<String, u32>),
}

impl Bucket {
    pub fn identity_for(extractor: ValueExtractor) -> Self {
        match extractor {
            ValueExtractor::Count => Bucket::Count(0),
            ValueExtractor::DistinctUnderlyers => Bucket::Set(HashMap::new()),
            _ => Bucket::Scalar(Decimal::ZERO),
        }
    }

    pub fn add(&mut self, contribution: &Contribution) {
        match (self, contribution) {
            (Bucket::Scalar(acc), Contribution::Scalar(v)) => *acc += v,
            (Bucket::Count(acc), Contribution::Unit) => *acc += 1,
            (Bucket::Set(refcounts), Contribution::Discriminator(d)) => {
                *refcounts.entry(d.clone()).or_insert(0) += 1;
            }
            _ => unreachable!("bucket/contribution shape mismatch"),
        }
    }

    pub fn sub(&mut self, contribution: &Contribution) {
        match (self, contribution) {
            (Bucket::Scalar(acc), Contribution::Scalar(v)) => *acc -= v,
            (Bucket::Count(acc), Contribution::Unit) => *acc = acc.saturating_sub(1),
            (Bucket::Set(refcounts), Contribution::Discriminator(d)) => {
                if let Some(count) = refcounts.get_mut(d) {
                    *count -= 1;
                    if *count == 0 {
                        refcounts.remove(d);
                    }
                }
            }
            _ => unreachable!("bucket/contribution shape mismatch"),
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            Bucket::Scalar(v) => *v,
            Bucket::Count(c) => Decimal::from(*c),
            Bucket::Set(refcounts) => Decimal::from(refcounts.len() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cardinality_dedupes_and_prunes_on_zero() {
        let mut bucket = Bucket::identity_for(ValueExtractor::DistinctUnderlyers);
        bucket.add(&Contribution::Discriminator("A".into()));
        bucket.add(&Contribution::Discriminator("A".into()));
        bucket.add(&Contribution::Discriminator("B".into()));
        assert_eq!(bucket.value(), Decimal::from(2));

        bucket.sub(&Contribution::Discriminator("B".into()));
        assert_eq!(bucket.value(), Decimal::from(1));

        bucket.sub(&Contribution::Discriminator("A".into()));
        assert_eq!(bucket.value(), Decimal::from(1)); // second "A" still held
    }

    #[test]
    fn stage_selector_working_excludes_pending_new_and_cancel() {
        assert!(!StageSelector::Working.matches(OrderState::PendingNew));
        assert!(StageSelector::Working.matches(OrderState::Open));
        assert!(StageSelector::Working.matches(OrderState::PendingReplace));
        assert!(!StageSelector::Working.matches(OrderState::PendingCancel));
    }
}
