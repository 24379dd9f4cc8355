//! Generic aggregation framework (§4.2): bucketed accumulators over the
//! order stream, parameterised by key extractor, stage selector, value
//! extractor and operator.

pub mod key;
pub mod metric;
pub mod operator;

pub use key::{extract_group_key, GroupKey, GroupingDimension};
pub use metric::{Metric, Snapshot};
pub use operator::{Bucket, Contribution, StageSelector, ValueExtractor};

use std::collections::HashMap;

use crate::core::TrackedOrder;

/// A convenience composite holding an ordered set of `(metric_id, Metric)`
/// pairs and fanning each event out to all of them with a single
/// `add`/`remove`/`replace` surface.
#[derive(Debug, Default)]
pub struct MultiGroupAggregator {
    metrics: HashMap<String, Metric>,
    order: Vec<String>,
}

impl MultiGroupAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, metric: Metric) {
        if !self.metrics.contains_key(&metric.id) {
            self.order.push(metric.id.clone());
        }
        self.metrics.insert(metric.id.clone(), metric);
    }

    pub fn get(&self, metric_id: &str) -> Option<&Metric> {
        self.metrics.get(metric_id)
    }

    pub fn metric_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Fans `add` out to every registered metric, returning only the
    /// snapshots for metrics the order actually contributed to.
    pub fn add(&mut self, order: &TrackedOrder) -> HashMap<String, Snapshot> {
        let mut snapshots = HashMap::new();
        for id in &self.order {
            if let Some(metric) = self.metrics.get_mut(id) {
                if let Some(snapshot) = metric.add(order) {
                    snapshots.insert(id.clone(), snapshot);
                }
            }
        }
        snapshots
    }

    /// Fans `remove` out using the engine's stored snapshots for this order.
    pub fn remove(&mut self, snapshots: &HashMap<String, Snapshot>) {
        for (id, snapshot) in snapshots {
            if let Some(metric) = self.metrics.get_mut(id) {
                metric.remove(snapshot);
            }
        }
    }

    /// Fans `replace` out: removes under the prior snapshot and re-adds
    /// under the order's current state, returning the refreshed snapshots.
    pub fn replace(
        &mut self,
        before: &HashMap<String, Snapshot>,
        order: &TrackedOrder,
    ) -> HashMap<String, Snapshot> {
        let mut after = HashMap::new();
        for id in &self.order {
            if let Some(metric) = self.metrics.get_mut(id) {
                let refreshed = match before.get(id) {
                    Some(snapshot) => metric.replace(snapshot, order),
                    None => metric.add(order),
                };
                if let Some(snapshot) = refreshed {
                    after.insert(id.clone(), snapshot);
                }
            }
        }
        after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OrderKey, OrderState, Side};
    use rust_decimal_macros::dec;

    fn order() -> TrackedOrder {
        TrackedOrder {
            key: OrderKey::new("CL-1"),
            symbol: "AAPL".into(),
            underlyer: "AAPL".into(),
            strategy_id: "S1".into(),
            portfolio_id: "P1".into(),
            security_type: "EQUITY".into(),
            side: Side::Bid,
            price: dec!(10),
            quantity: dec!(100),
            leaves_qty: dec!(100),
            cum_qty: dec!(0),
            delta: Some(dec!(0.5)),
            vega: None,
            state: OrderState::Open,
            pending: None,
        }
    }

    #[test]
    fn fans_out_add_to_all_registered_metrics() {
        let mut agg = MultiGroupAggregator::new();
        agg.register(Metric::new(
            "order_count",
            vec![GroupingDimension::PortfolioId],
            StageSelector::Active,
            ValueExtractor::Count,
        ));
        agg.register(Metric::new(
            "gross_notional",
            vec![GroupingDimension::PortfolioId],
            StageSelector::Active,
            ValueExtractor::GrossNotional,
        ));

        let snapshots = agg.add(&order());
        assert_eq!(snapshots.len(), 2);
        assert_eq!(
            agg.get("order_count").unwrap().bucket_value(&vec!["P1".into()]),
            dec!(1)
        );
        assert_eq!(
            agg.get("gross_notional").unwrap().bucket_value(&vec!["P1".into()]),
            dec!(1000)
        );

        agg.remove(&snapshots);
        assert_eq!(
            agg.get("order_count").unwrap().bucket_value(&vec!["P1".into()]),
            dec!(0)
        );
    }
}
