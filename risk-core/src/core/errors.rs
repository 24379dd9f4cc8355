//! Domain error types.
//!
//! Every fallible operation in the book, aggregation framework, limit store
//! and engine resolves to one of these variants. Kept as a single flat enum
//! (rather than per-module errors) because callers at the engine boundary
//! need to match on all of them uniformly.

use thiserror::Error;

use crate::core::OrderKey;

/// Errors surfaced by the order book, aggregation framework, limit store
/// and risk engine.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RiskError {
    #[error("duplicate order key: {0}")]
    DuplicateKey(OrderKey),

    #[error("unknown order key: {0}")]
    UnknownKey(OrderKey),

    #[error("invalid state transition for {key}: {attempted} from {from:?}")]
    InvalidTransition {
        key: OrderKey,
        from: crate::core::OrderState,
        attempted: &'static str,
    },

    #[error("protocol violation for {key}: {reason}")]
    ProtocolViolation { key: OrderKey, reason: String },

    #[error(
        "limit breach on metric '{metric_id}' bucket {bucket_key:?}: projected {projected} exceeds cap {cap}"
    )]
    LimitBreach {
        metric_id: String,
        bucket_key: Vec<String>,
        projected: rust_decimal::Decimal,
        cap: rust_decimal::Decimal,
    },

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Errors raised while parsing or serializing wire messages.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WireError {
    #[error("missing required field: tag {tag} ({name})")]
    MissingField { tag: u32, name: &'static str },

    #[error("invalid value for tag {tag}: {value:?}")]
    InvalidField { tag: u32, value: String },

    #[error("unknown message type: {0:?}")]
    UnknownMessageType(String),

    #[error("malformed message: {0}")]
    Malformed(String),
}
