//! Runtime JSON configuration for the metric/grouping/limit surface (§6).
//!
//! Unlike the compile-time feature-flag scheme elsewhere in this lineage,
//! groupings and caps are explicitly a runtime concern here, so this loader
//! actually parses a file rather than stubbing one out.

pub mod types;

pub use types::{Config, EngineConfig, LimitConfig, MetricConfig, TelemetryConfig};

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::RiskError;

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects duplicate metric names and limits naming a metric that isn't
    /// configured — the only structural constraints this surface has.
    pub fn validate(&self) -> Result<(), RiskError> {
        let mut seen = std::collections::HashSet::new();
        for metric in &self.engine.metrics {
            if !seen.insert(metric.name.as_str()) {
                return Err(RiskError::ConfigError(format!(
                    "duplicate metric name '{}'",
                    metric.name
                )));
            }
        }

        for limit in &self.engine.limits {
            if !self.engine.metrics.iter().any(|m| m.name == limit.metric_name) {
                return Err(RiskError::ConfigError(format!(
                    "limit references unknown metric '{}'",
                    limit.metric_name
                )));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.telemetry.log_level.as_str()) {
            return Err(RiskError::ConfigError(format!(
                "invalid log level '{}'",
                self.telemetry.log_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_minimal_config_from_json() {
        let raw = r#"{
            "engine": {
                "metrics": [
                    { "name": "gross_notional", "kind": "gross_notional", "grouping": ["portfolio_id"] }
                ],
                "limits": [
                    { "metric_name": "gross_notional", "bucket_key": ["P1"], "sense": { "kind": "at_most", "cap": "1000000" } }
                ]
            }
        }"#;
        let config = Config::from_json(raw).unwrap();
        assert_eq!(config.engine.metrics.len(), 1);
        assert_eq!(config.engine.limits.len(), 1);
    }

    #[test]
    fn rejects_limit_on_unknown_metric() {
        let raw = r#"{
            "engine": {
                "metrics": [],
                "limits": [
                    { "metric_name": "gross_notional", "bucket_key": ["P1"], "sense": { "kind": "at_most", "cap": "1000000" } }
                ]
            }
        }"#;
        let err = Config::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("unknown metric"));
    }

    #[test]
    fn rejects_duplicate_metric_names() {
        let raw = r#"{
            "engine": {
                "metrics": [
                    { "name": "m1", "kind": "count", "grouping": [] },
                    { "name": "m1", "kind": "gross_notional", "grouping": ["symbol"] }
                ]
            }
        }"#;
        let err = Config::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate metric name"));
    }
}
