//! Concrete metric catalog (§8): turns the configuration surface's
//! `MetricConfig` list into registered [`Metric`]s inside a
//! [`MultiGroupAggregator`].

use crate::aggregation::{Metric, MultiGroupAggregator};
use crate::config::MetricConfig;

/// Builds a fresh aggregator with one `Metric` per entry in `configs`, in
/// the order given — `MultiGroupAggregator` fans events out in registration
/// order, so the order here is also the order `MetricLimitStore::evaluate_all`
/// will see candidate projections in before its own deterministic sort.
pub fn build_aggregator(configs: &[MetricConfig]) -> MultiGroupAggregator {
    let mut aggregator = MultiGroupAggregator::new();
    for config in configs {
        aggregator.register(Metric::new(
            config.name.clone(),
            config.grouping.clone(),
            config.stage,
            config.kind,
        ));
    }
    aggregator
}
