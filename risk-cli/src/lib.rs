//! Scenario-replay types shared by the `risk-engine` binary.
//!
//! Kept as a small library target (rather than inlined in the binary) so
//! scenario parsing can be exercised by `#[cfg(test)]` without building the
//! whole CLI.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use risk_core::InstrumentRecord;
use serde::Deserialize;

/// One line of a replayed scenario: a tag/value wire message plus the
/// routing attributes a `NewOrderSingle` needs but the wire protocol itself
/// doesn't carry (§6's field table names none for portfolio/strategy).
///
/// `message` uses `|` as a human-typable stand-in for the real 0x01 field
/// delimiter, the same convention the codec's own tests use.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEvent {
    pub message: String,
    #[serde(default)]
    pub portfolio_id: Option<String>,
    #[serde(default)]
    pub strategy_id: Option<String>,
}

impl ScenarioEvent {
    pub fn wire_bytes(&self) -> Vec<u8> {
        self.message.replace('|', "\u{01}").into_bytes()
    }
}

pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Vec<ScenarioEvent>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing scenario file {}", path.display()))
}

pub fn load_instruments<P: AsRef<Path>>(path: P) -> Result<HashMap<String, InstrumentRecord>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading instrument directory {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing instrument directory {}", path.display()))
}
