//! Configuration surface (§6): which metrics to maintain, how they're
//! grouped, and what caps apply to which buckets.

use serde::{Deserialize, Serialize};

use crate::aggregation::{GroupKey, GroupingDimension, StageSelector, ValueExtractor};
use crate::limits::LimitSense;

/// One `(metric_name, grouping)` registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricConfig {
    pub name: String,
    pub kind: ValueExtractor,
    #[serde(default = "default_stage")]
    pub stage: StageSelector,
    pub grouping: Vec<GroupingDimension>,
}

fn default_stage() -> StageSelector {
    StageSelector::Active
}

/// One `(metric_name, bucket_key) → cap` registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitConfig {
    pub metric_name: String,
    pub bucket_key: GroupKey,
    pub sense: LimitSense,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
    #[serde(default)]
    pub limits: Vec<LimitConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
