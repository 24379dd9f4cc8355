//! Tag/value codec: `bytes ↔ typed Message` (§6).
//!
//! Fields are delimited by 0x01 (SOH); each field is a `tag=value` pair.
//! This module does no session framing — it parses exactly one message per
//! call.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::OrderKey;
use crate::core::errors::WireError;
use crate::wire::message::{
    ExecutionReport, Message, NewOrderSingle, OrderCancelReject, OrderCancelReplace,
    OrderCancelRequest,
};
use crate::wire::tags::{self, msg_type};
use crate::wire::types::{parse_cxl_rej_response_to, parse_exec_type, parse_ord_status, parse_side};

const FIELD_DELIMITER: u8 = 0x01;

fn parse_fields(bytes: &[u8]) -> Result<HashMap<u32, String>, WireError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| WireError::Malformed(format!("not valid utf-8: {e}")))?;

    let mut fields = HashMap::new();
    for field in text.split(FIELD_DELIMITER as char) {
        if field.is_empty() {
            continue;
        }
        let mut parts = field.splitn(2, '=');
        let tag_str = parts
            .next()
            .ok_or_else(|| WireError::Malformed(format!("field with no tag: {field:?}")))?;
        let value = parts
            .next()
            .ok_or_else(|| WireError::Malformed(format!("field with no value: {field:?}")))?;
        let tag: u32 = tag_str
            .parse()
            .map_err(|_| WireError::Malformed(format!("non-numeric tag: {tag_str:?}")))?;
        fields.insert(tag, value.to_string());
    }
    Ok(fields)
}

fn required<'a>(
    fields: &'a HashMap<u32, String>,
    tag: u32,
    name: &'static str,
) -> Result<&'a str, WireError> {
    fields
        .get(&tag)
        .map(String::as_str)
        .ok_or(WireError::MissingField { tag, name })
}

fn optional<'a>(fields: &'a HashMap<u32, String>, tag: u32) -> Option<&'a str> {
    fields.get(&tag).map(String::as_str)
}

fn parse_decimal(tag: u32, raw: &str) -> Result<Decimal, WireError> {
    Decimal::from_str(raw).map_err(|_| WireError::InvalidField {
        tag,
        value: raw.to_string(),
    })
}

fn parse_key(tag: u32, raw: &str) -> Result<OrderKey, WireError> {
    if raw.is_empty() {
        return Err(WireError::InvalidField {
            tag,
            value: raw.to_string(),
        });
    }
    Ok(OrderKey::new(raw))
}

/// Parse one complete message out of `bytes`.
pub fn parse(bytes: &[u8]) -> Result<Message, WireError> {
    let fields = parse_fields(bytes)?;
    let msg_type_value = required(&fields, tags::MSG_TYPE, "MsgType")?;

    match msg_type_value {
        msg_type::NEW_ORDER_SINGLE => {
            let cl_ord_id = parse_key(
                tags::CL_ORD_ID,
                required(&fields, tags::CL_ORD_ID, "ClOrdID")?,
            )?;
            let symbol = required(&fields, tags::SYMBOL, "Symbol")?.to_string();
            let side = parse_side(tags::SIDE, required(&fields, tags::SIDE, "Side")?)?;
            let order_qty = parse_decimal(
                tags::ORDER_QTY,
                required(&fields, tags::ORDER_QTY, "OrderQty")?,
            )?;
            let price = parse_decimal(tags::PRICE, required(&fields, tags::PRICE, "Price")?)?;
            let underlying_symbol = optional(&fields, tags::UNDERLYING_SYMBOL).map(str::to_string);
            let security_type = optional(&fields, tags::SECURITY_TYPE).map(str::to_string);

            Ok(Message::NewOrderSingle(NewOrderSingle {
                cl_ord_id,
                symbol,
                side,
                order_qty,
                price,
                underlying_symbol,
                security_type,
            }))
        }
        msg_type::ORDER_CANCEL_REPLACE => {
            let cl_ord_id = parse_key(
                tags::CL_ORD_ID,
                required(&fields, tags::CL_ORD_ID, "ClOrdID")?,
            )?;
            let orig_cl_ord_id = parse_key(
                tags::ORIG_CL_ORD_ID,
                required(&fields, tags::ORIG_CL_ORD_ID, "OrigClOrdID")?,
            )?;
            let order_qty = parse_decimal(
                tags::ORDER_QTY,
                required(&fields, tags::ORDER_QTY, "OrderQty")?,
            )?;
            let price = parse_decimal(tags::PRICE, required(&fields, tags::PRICE, "Price")?)?;

            Ok(Message::OrderCancelReplace(OrderCancelReplace {
                cl_ord_id,
                orig_cl_ord_id,
                order_qty,
                price,
            }))
        }
        msg_type::ORDER_CANCEL_REQUEST => {
            let cl_ord_id = parse_key(
                tags::CL_ORD_ID,
                required(&fields, tags::CL_ORD_ID, "ClOrdID")?,
            )?;
            let orig_cl_ord_id = parse_key(
                tags::ORIG_CL_ORD_ID,
                required(&fields, tags::ORIG_CL_ORD_ID, "OrigClOrdID")?,
            )?;

            Ok(Message::OrderCancelRequest(OrderCancelRequest {
                cl_ord_id,
                orig_cl_ord_id,
            }))
        }
        msg_type::EXECUTION_REPORT => {
            let cl_ord_id = parse_key(
                tags::CL_ORD_ID,
                required(&fields, tags::CL_ORD_ID, "ClOrdID")?,
            )?;
            let exec_type =
                parse_exec_type(required(&fields, tags::EXEC_TYPE, "ExecType")?)?;
            let ord_status =
                parse_ord_status(required(&fields, tags::ORD_STATUS, "OrdStatus")?)?;
            let leaves_qty = parse_decimal(
                tags::LEAVES_QTY,
                required(&fields, tags::LEAVES_QTY, "LeavesQty")?,
            )?;
            let cum_qty =
                parse_decimal(tags::CUM_QTY, required(&fields, tags::CUM_QTY, "CumQty")?)?;
            let last_qty = optional(&fields, tags::LAST_QTY)
                .map(|raw| parse_decimal(tags::LAST_QTY, raw))
                .transpose()?;
            let last_px = optional(&fields, tags::LAST_PX)
                .map(|raw| parse_decimal(tags::LAST_PX, raw))
                .transpose()?;

            if matches!(
                exec_type,
                crate::wire::types::ExecType::PartialFill | crate::wire::types::ExecType::Fill
            ) && (last_qty.is_none() || last_px.is_none())
            {
                return Err(WireError::MissingField {
                    tag: tags::LAST_QTY,
                    name: "LastQty/LastPx required on a fill",
                });
            }

            Ok(Message::ExecutionReport(ExecutionReport {
                cl_ord_id,
                exec_type,
                ord_status,
                leaves_qty,
                cum_qty,
                last_qty,
                last_px,
            }))
        }
        msg_type::ORDER_CANCEL_REJECT => {
            let cl_ord_id = parse_key(
                tags::CL_ORD_ID,
                required(&fields, tags::CL_ORD_ID, "ClOrdID")?,
            )?;
            let orig_cl_ord_id = parse_key(
                tags::ORIG_CL_ORD_ID,
                required(&fields, tags::ORIG_CL_ORD_ID, "OrigClOrdID")?,
            )?;
            let cxl_rej_response_to = parse_cxl_rej_response_to(required(
                &fields,
                tags::CXL_REJ_RESPONSE_TO,
                "CxlRejResponseTo",
            )?)?;

            Ok(Message::OrderCancelReject(OrderCancelReject {
                cl_ord_id,
                orig_cl_ord_id,
                cxl_rej_response_to,
            }))
        }
        other => Err(WireError::UnknownMessageType(other.to_string())),
    }
}

/// Serialize a message back to tag/value wire form. Used by tests and the
/// CLI harness to round-trip scenario fixtures.
pub fn serialize(message: &Message) -> Vec<u8> {
    let mut out = String::new();
    let mut push = |tag: u32, value: String| {
        out.push_str(&tag.to_string());
        out.push('=');
        out.push_str(&value);
        out.push(FIELD_DELIMITER as char);
    };

    match message {
        Message::NewOrderSingle(m) => {
            push(tags::MSG_TYPE, msg_type::NEW_ORDER_SINGLE.to_string());
            push(tags::CL_ORD_ID, m.cl_ord_id.as_str().to_string());
            push(tags::SYMBOL, m.symbol.clone());
            push(
                tags::SIDE,
                match m.side {
                    crate::core::Side::Bid => "1".to_string(),
                    crate::core::Side::Ask => "2".to_string(),
                },
            );
            push(tags::ORDER_QTY, m.order_qty.to_string());
            push(tags::PRICE, m.price.to_string());
            if let Some(u) = &m.underlying_symbol {
                push(tags::UNDERLYING_SYMBOL, u.clone());
            }
            if let Some(s) = &m.security_type {
                push(tags::SECURITY_TYPE, s.clone());
            }
        }
        Message::OrderCancelReplace(m) => {
            push(tags::MSG_TYPE, msg_type::ORDER_CANCEL_REPLACE.to_string());
            push(tags::CL_ORD_ID, m.cl_ord_id.as_str().to_string());
            push(tags::ORIG_CL_ORD_ID, m.orig_cl_ord_id.as_str().to_string());
            push(tags::ORDER_QTY, m.order_qty.to_string());
            push(tags::PRICE, m.price.to_string());
        }
        Message::OrderCancelRequest(m) => {
            push(tags::MSG_TYPE, msg_type::ORDER_CANCEL_REQUEST.to_string());
            push(tags::CL_ORD_ID, m.cl_ord_id.as_str().to_string());
            push(tags::ORIG_CL_ORD_ID, m.orig_cl_ord_id.as_str().to_string());
        }
        Message::ExecutionReport(m) => {
            push(tags::MSG_TYPE, msg_type::EXECUTION_REPORT.to_string());
            push(tags::CL_ORD_ID, m.cl_ord_id.as_str().to_string());
            push(
                tags::EXEC_TYPE,
                (match m.exec_type {
                    crate::wire::types::ExecType::New => 0,
                    crate::wire::types::ExecType::PartialFill => 1,
                    crate::wire::types::ExecType::Fill => 2,
                    crate::wire::types::ExecType::Canceled => 4,
                    crate::wire::types::ExecType::Replaced => 5,
                    crate::wire::types::ExecType::Rejected => 8,
                })
                .to_string(),
            );
            push(
                tags::ORD_STATUS,
                (match m.ord_status {
                    crate::wire::types::OrdStatus::New => 0,
                    crate::wire::types::OrdStatus::PartiallyFilled => 1,
                    crate::wire::types::OrdStatus::Filled => 2,
                    crate::wire::types::OrdStatus::Canceled => 4,
                    crate::wire::types::OrdStatus::Rejected => 8,
                })
                .to_string(),
            );
            push(tags::LEAVES_QTY, m.leaves_qty.to_string());
            push(tags::CUM_QTY, m.cum_qty.to_string());
            if let Some(q) = m.last_qty {
                push(tags::LAST_QTY, q.to_string());
            }
            if let Some(p) = m.last_px {
                push(tags::LAST_PX, p.to_string());
            }
        }
        Message::OrderCancelReject(m) => {
            push(tags::MSG_TYPE, msg_type::ORDER_CANCEL_REJECT.to_string());
            push(tags::CL_ORD_ID, m.cl_ord_id.as_str().to_string());
            push(tags::ORIG_CL_ORD_ID, m.orig_cl_ord_id.as_str().to_string());
            push(
                tags::CXL_REJ_RESPONSE_TO,
                (match m.cxl_rej_response_to {
                    crate::wire::types::CxlRejResponseTo::OrderCancelRequest => 1,
                    crate::wire::types::CxlRejResponseTo::OrderCancelReplaceRequest => 2,
                })
                .to_string(),
            );
        }
    }

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fix(msg: &str) -> Vec<u8> {
        msg.replace('|', "\u{01}").into_bytes()
    }

    #[test]
    fn parses_new_order_single() {
        let bytes = fix("35=D|11=CL-1|55=AAPL|54=1|38=100|44=10.5|");
        let msg = parse(&bytes).unwrap();
        match msg {
            Message::NewOrderSingle(n) => {
                assert_eq!(n.cl_ord_id, OrderKey::new("CL-1"));
                assert_eq!(n.symbol, "AAPL");
                assert_eq!(n.order_qty, dec!(100));
                assert_eq!(n.price, dec!(10.5));
            }
            _ => panic!("expected NewOrderSingle"),
        }
    }

    #[test]
    fn missing_required_field_names_tag() {
        let bytes = fix("35=D|11=CL-1|55=AAPL|54=1|44=10.5|");
        let err = parse(&bytes).unwrap_err();
        assert_eq!(
            err,
            WireError::MissingField {
                tag: tags::ORDER_QTY,
                name: "OrderQty"
            }
        );
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let bytes = fix("35=Z|11=CL-1|");
        assert!(matches!(
            parse(&bytes),
            Err(WireError::UnknownMessageType(_))
        ));
    }

    #[test]
    fn round_trips_execution_report() {
        let original = Message::ExecutionReport(ExecutionReport {
            cl_ord_id: OrderKey::new("CL-1"),
            exec_type: crate::wire::types::ExecType::PartialFill,
            ord_status: crate::wire::types::OrdStatus::PartiallyFilled,
            leaves_qty: dec!(60),
            cum_qty: dec!(40),
            last_qty: Some(dec!(40)),
            last_px: Some(dec!(10)),
        });
        let bytes = serialize(&original);
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn fill_without_last_qty_is_missing_field() {
        let bytes = fix("35=8|11=CL-1|150=2|39=2|151=0|14=100|");
        let err = parse(&bytes).unwrap_err();
        assert!(matches!(err, WireError::MissingField { .. }));
    }
}
