//! Group-key extraction (§4.2 "Key Extractor").

use serde::{Deserialize, Serialize};

use crate::core::TrackedOrder;

/// A tuple of group-key dimensions, realised at runtime (groupings are a
/// configuration-surface concept, §6, not a compile-time type parameter).
pub type GroupKey = Vec<String>;

/// The closed set of grouping dimensions recognised by the configuration
/// surface (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingDimension {
    PortfolioId,
    StrategyId,
    Symbol,
    Underlyer,
    Side,
    SecurityType,
}

impl GroupingDimension {
    pub fn extract(self, order: &TrackedOrder) -> String {
        match self {
            GroupingDimension::PortfolioId => order.portfolio_id.clone(),
            GroupingDimension::StrategyId => order.strategy_id.clone(),
            GroupingDimension::Symbol => order.symbol.clone(),
            GroupingDimension::Underlyer => order.underlyer.clone(),
            GroupingDimension::Side => order.side.to_string(),
            GroupingDimension::SecurityType => order.security_type.clone(),
        }
    }
}

/// Applies an ordered set of dimensions to produce a order's group key. An
/// empty grouping collapses every order into a single bucket (§8 boundary
/// case).
pub fn extract_group_key(grouping: &[GroupingDimension], order: &TrackedOrder) -> GroupKey {
    grouping.iter().map(|d| d.extract(order)).collect()
}
