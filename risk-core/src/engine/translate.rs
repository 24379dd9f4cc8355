//! Wire-message → [`RiskEvent`] translation (§2 data flow: "wire event →
//! codec → Risk Engine").
//!
//! The tag/value messages in §6 don't map one-to-one onto the book's
//! start/complete/reject split (e.g. an `ExecutionReport` with
//! `ExecType::Replaced` carries only the *new* `ClOrdID`, not the original
//! one the book is still keyed under) — this module resolves that against
//! a book so the CLI harness doesn't have to.

use crate::book::OrderBook;
use crate::core::{OrderKey, RiskError};
use crate::engine::{RiskEvent, SubmitRequest};
use crate::wire::types::{CxlRejResponseTo, ExecType};
use crate::wire::Message;

/// Translates one decoded wire [`Message`] into the [`RiskEvent`] it
/// represents.
///
/// `NewOrderSingle` carries no portfolio/strategy routing attributes (§6's
/// field table names none), so the caller must supply them; every other
/// message class is self-sufficient. Returns `Ok(None)` for an
/// `ExecutionReport` whose `ExecType` the book's state machine has no
/// corresponding transition for (there are none today, but the match is
/// exhaustive on purpose so a future `ExecType` fails closed instead of
/// silently misrouting).
pub fn translate(
    book: &OrderBook,
    message: Message,
    portfolio_id: Option<String>,
    strategy_id: Option<String>,
) -> Result<Option<RiskEvent>, RiskError> {
    match message {
        Message::NewOrderSingle(order) => {
            let portfolio_id = portfolio_id.ok_or_else(|| {
                RiskError::ConfigError("NewOrderSingle requires a portfolio_id".to_string())
            })?;
            let strategy_id = strategy_id.ok_or_else(|| {
                RiskError::ConfigError("NewOrderSingle requires a strategy_id".to_string())
            })?;
            Ok(Some(RiskEvent::Submit(SubmitRequest {
                order,
                portfolio_id,
                strategy_id,
            })))
        }
        Message::OrderCancelReplace(replace) => Ok(Some(RiskEvent::StartReplace {
            orig_key: replace.orig_cl_ord_id,
            new_key: replace.cl_ord_id,
            new_price: replace.price,
            new_qty: replace.order_qty,
        })),
        Message::OrderCancelRequest(cancel) => Ok(Some(RiskEvent::StartCancel {
            orig_key: cancel.orig_cl_ord_id,
            cancel_key: cancel.cl_ord_id,
        })),
        Message::OrderCancelReject(reject) => Ok(Some(match reject.cxl_rej_response_to {
            CxlRejResponseTo::OrderCancelRequest => RiskEvent::RejectCancel {
                orig_key: reject.orig_cl_ord_id,
            },
            CxlRejResponseTo::OrderCancelReplaceRequest => RiskEvent::RejectReplace {
                orig_key: reject.orig_cl_ord_id,
            },
        })),
        Message::ExecutionReport(report) => match report.exec_type {
            ExecType::New => Ok(Some(RiskEvent::Acknowledge(report.cl_ord_id))),
            ExecType::Rejected => Ok(Some(RiskEvent::Reject(report.cl_ord_id))),
            ExecType::PartialFill | ExecType::Fill => {
                let last_qty = report.last_qty.ok_or_else(|| RiskError::ProtocolViolation {
                    key: report.cl_ord_id.clone(),
                    reason: "fill execution report missing LastQty".to_string(),
                })?;
                Ok(Some(RiskEvent::Fill {
                    key: report.cl_ord_id,
                    last_qty,
                }))
            }
            ExecType::Canceled => Ok(Some(RiskEvent::CompleteCancel { key: report.cl_ord_id })),
            ExecType::Replaced => {
                let orig_key = resolve_orig_key_for_replace(book, &report.cl_ord_id)?;
                Ok(Some(RiskEvent::CompleteReplace { orig_key }))
            }
        },
    }
}

/// `ExecutionReport`'s `ClOrdID` on a replace confirmation names the *new*
/// key; `complete_replace` takes the key the book is still filed under.
/// Resolve through the book's pending-replace bookkeeping to find it.
fn resolve_orig_key_for_replace(book: &OrderBook, reported_key: &OrderKey) -> Result<OrderKey, RiskError> {
    if let Some(order) = book.get(reported_key) {
        // cl_ord_id is already the primary key: a replace with new_key == orig_key.
        return Ok(order.key.clone());
    }
    book.resolve(reported_key)
        .map(|order| order.key.clone())
        .ok_or_else(|| RiskError::UnknownKey(reported_key.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OrderState, Side, TrackedOrder};
    use crate::wire::{ExecutionReport, NewOrderSingle, OrderCancelReject, OrderCancelReplace};
    use rust_decimal_macros::dec;

    fn order(key: &str, state: OrderState, pending_key: Option<&str>) -> TrackedOrder {
        TrackedOrder {
            key: OrderKey::new(key),
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
            delta: None,
            vega: None,
            state,
            pending: pending_key.map(|k| crate::core::tracked_order::PendingReplace {
                price: dec!(11),
                quantity: dec!(120),
                key: OrderKey::new(k),
            }),
        }
    }

    #[test]
    fn new_order_single_requires_routing_attributes() {
        let book = OrderBook::new();
        let msg = Message::NewOrderSingle(NewOrderSingle {
            cl_ord_id: OrderKey::new("ord1"),
            symbol: "AAPL".into(),
            side: Side::Bid,
            order_qty: dec!(100),
            price: dec!(10),
            underlying_symbol: None,
            security_type: None,
        });
        assert!(translate(&book, msg, None, None).is_err());
    }

    #[test]
    fn cancel_reject_routes_by_response_to() {
        let book = OrderBook::new();
        let msg = Message::OrderCancelReject(OrderCancelReject {
            cl_ord_id: OrderKey::new("ord1C"),
            orig_cl_ord_id: OrderKey::new("ord1"),
            cxl_rej_response_to: CxlRejResponseTo::OrderCancelRequest,
        });
        let event = translate(&book, msg, None, None).unwrap().unwrap();
        assert_eq!(
            event,
            RiskEvent::RejectCancel {
                orig_key: OrderKey::new("ord1")
            }
        );
    }

    #[test]
    fn replace_confirmation_resolves_original_key() {
        let mut book = OrderBook::new();
        book.add(order("ord1", OrderState::PendingReplace, Some("ord1R")))
            .unwrap();

        let msg = Message::ExecutionReport(ExecutionReport {
            cl_ord_id: OrderKey::new("ord1R"),
            exec_type: ExecType::Replaced,
            ord_status: crate::wire::types::OrdStatus::New,
            leaves_qty: dec!(120),
            cum_qty: dec!(0),
            last_qty: None,
            last_px: None,
        });
        let event = translate(&book, msg, None, None).unwrap().unwrap();
        assert_eq!(
            event,
            RiskEvent::CompleteReplace {
                orig_key: OrderKey::new("ord1")
            }
        );
    }

    #[test]
    fn replace_request_starts_replace() {
        let book = OrderBook::new();
        let msg = Message::OrderCancelReplace(OrderCancelReplace {
            cl_ord_id: OrderKey::new("ord1R"),
            orig_cl_ord_id: OrderKey::new("ord1"),
            order_qty: dec!(150),
            price: dec!(12),
        });
        let event = translate(&book, msg, None, None).unwrap().unwrap();
        assert_eq!(
            event,
            RiskEvent::StartReplace {
                orig_key: OrderKey::new("ord1"),
                new_key: OrderKey::new("ord1R"),
                new_price: dec!(12),
                new_qty: dec!(150),
            }
        );
    }
}
