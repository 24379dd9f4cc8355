//! Typed wire messages (§6).

use rust_decimal::Decimal;

use crate::core::{OrderKey, Side};
use crate::wire::types::{CxlRejResponseTo, ExecType, OrdStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderSingle {
    pub cl_ord_id: OrderKey,
    pub symbol: String,
    pub side: Side,
    pub order_qty: Decimal,
    pub price: Decimal,
    pub underlying_symbol: Option<String>,
    pub security_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderCancelReplace {
    pub cl_ord_id: OrderKey,
    pub orig_cl_ord_id: OrderKey,
    pub order_qty: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderCancelRequest {
    pub cl_ord_id: OrderKey,
    pub orig_cl_ord_id: OrderKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub cl_ord_id: OrderKey,
    pub exec_type: ExecType,
    pub ord_status: OrdStatus,
    pub leaves_qty: Decimal,
    pub cum_qty: Decimal,
    pub last_qty: Option<Decimal>,
    pub last_px: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderCancelReject {
    pub cl_ord_id: OrderKey,
    pub orig_cl_ord_id: OrderKey,
    pub cxl_rej_response_to: CxlRejResponseTo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    NewOrderSingle(NewOrderSingle),
    OrderCancelReplace(OrderCancelReplace),
    OrderCancelRequest(OrderCancelRequest),
    ExecutionReport(ExecutionReport),
    OrderCancelReject(OrderCancelReject),
}
