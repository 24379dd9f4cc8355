//! Instrument reference-data directory (§2, §6) — an immutable lookup from
//! symbol to instrument characteristics. No mutation after load.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstrumentKind {
    Equity,
    Option,
    Future,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub kind: InstrumentKind,
    pub underlyer: String,
    pub multiplier: Decimal,
    pub delta: Option<Decimal>,
    pub vega: Option<Decimal>,
}

impl InstrumentRecord {
    /// The vanilla-linear fallback used when the directory has no record for
    /// a symbol: multiplier 1, no greeks.
    pub fn vanilla_linear(symbol: &str) -> Self {
        Self {
            kind: InstrumentKind::Equity,
            underlyer: symbol.to_string(),
            multiplier: Decimal::ONE,
            delta: None,
            vega: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InstrumentDirectory {
    records: HashMap<String, InstrumentRecord>,
}

impl InstrumentDirectory {
    pub fn from_records(records: HashMap<String, InstrumentRecord>) -> Self {
        Self { records }
    }

    pub fn lookup(&self, symbol: &str) -> Option<&InstrumentRecord> {
        self.records.get(symbol)
    }

    /// Like [`lookup`](Self::lookup) but falls back to a vanilla-linear
    /// record rather than `None`, per §6 "the engine tolerates `None`".
    pub fn lookup_or_default(&self, symbol: &str) -> InstrumentRecord {
        self.records
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| InstrumentRecord::vanilla_linear(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unknown_symbol_falls_back_to_vanilla_linear() {
        let dir = InstrumentDirectory::default();
        let record = dir.lookup_or_default("AAPL");
        assert_eq!(record.multiplier, Decimal::ONE);
        assert!(record.delta.is_none());
    }

    #[test]
    fn known_symbol_resolves() {
        let mut records = HashMap::new();
        records.insert(
            "AAPL240119C00190000".to_string(),
            InstrumentRecord {
                kind: InstrumentKind::Option,
                underlyer: "AAPL".to_string(),
                multiplier: dec!(100),
                delta: Some(dec!(0.45)),
                vega: Some(dec!(0.12)),
            },
        );
        let dir = InstrumentDirectory::from_records(records);
        let record = dir.lookup("AAPL240119C00190000").unwrap();
        assert_eq!(record.underlyer, "AAPL");
        assert_eq!(record.delta, Some(dec!(0.45)));
    }
}
