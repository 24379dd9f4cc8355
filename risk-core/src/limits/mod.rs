//! Metric limit store (§4.3): registers per-bucket caps and evaluates
//! candidate projections against them.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregation::GroupKey;

/// How a cap compares against a projected value. `AtMost` covers gross/count
/// caps; `Band` covers two-sided caps on signed quantities like net delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LimitSense {
    AtMost { cap: Decimal },
    Band { min: Decimal, max: Decimal },
}

impl LimitSense {
    fn breach(self, projected: Decimal) -> Option<Decimal> {
        match self {
            LimitSense::AtMost { cap } if projected > cap => Some(cap),
            LimitSense::Band { max, .. } if projected > max => Some(max),
            LimitSense::Band { min, .. } if projected < min => Some(min),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub sense: LimitSense,
}

/// A bucket address within a specific metric's grouping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LimitKey {
    pub metric_id: String,
    pub bucket_key: GroupKey,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accept,
    Reject {
        metric_id: String,
        bucket_key: GroupKey,
        projected: Decimal,
        cap: Decimal,
    },
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }
}

#[derive(Debug, Default)]
pub struct MetricLimitStore {
    limits: BTreeMap<LimitKey, Limit>,
}

impl MetricLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_limit(&mut self, metric_id: impl Into<String>, bucket_key: GroupKey, limit: Limit) {
        self.limits.insert(
            LimitKey {
                metric_id: metric_id.into(),
                bucket_key,
            },
            limit,
        );
    }

    pub fn clear_limit(&mut self, metric_id: &str, bucket_key: &GroupKey) {
        self.limits.remove(&LimitKey {
            metric_id: metric_id.to_string(),
            bucket_key: bucket_key.clone(),
        });
    }

    /// Evaluates a single `(metric_id, bucket_key)` projection.
    pub fn evaluate(&self, metric_id: &str, bucket_key: &GroupKey, projected: Decimal) -> Decision {
        let key = LimitKey {
            metric_id: metric_id.to_string(),
            bucket_key: bucket_key.clone(),
        };
        match self.limits.get(&key) {
            Some(limit) => match limit.sense.breach(projected) {
                Some(cap) => Decision::Reject {
                    metric_id: metric_id.to_string(),
                    bucket_key: bucket_key.clone(),
                    projected,
                    cap,
                },
                None => Decision::Accept,
            },
            None => Decision::Accept,
        }
    }

    /// Iterates every `(metric_id, bucket_key, projected_value)` a candidate
    /// touches, in deterministic `(metric_id, bucket_key)` order, returning
    /// the first `Reject` or `Accept` if none breach.
    pub fn evaluate_all<'a>(
        &self,
        projections: impl IntoIterator<Item = (&'a str, GroupKey, Decimal)>,
    ) -> Decision {
        let mut sorted: Vec<_> = projections.into_iter().collect();
        sorted.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

        for (metric_id, bucket_key, projected) in sorted {
            let decision = self.evaluate(metric_id, &bucket_key, projected);
            if !decision.is_accept() {
                return decision;
            }
        }
        Decision::Accept
    }
}
