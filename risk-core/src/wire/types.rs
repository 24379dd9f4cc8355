//! Wire-level enumerations and their integer codings (§6).

use crate::core::Side;
use crate::core::errors::WireError;
use crate::wire::tags;

pub fn parse_side(tag: u32, raw: &str) -> Result<Side, WireError> {
    match raw {
        "1" => Ok(Side::Bid),
        "2" => Ok(Side::Ask),
        other => Err(WireError::InvalidField {
            tag,
            value: other.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
}

pub fn parse_ord_status(raw: &str) -> Result<OrdStatus, WireError> {
    match raw {
        "0" => Ok(OrdStatus::New),
        "1" => Ok(OrdStatus::PartiallyFilled),
        "2" => Ok(OrdStatus::Filled),
        "4" => Ok(OrdStatus::Canceled),
        "8" => Ok(OrdStatus::Rejected),
        other => Err(WireError::InvalidField {
            tag: tags::ORD_STATUS,
            value: other.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecType {
    New,
    PartialFill,
    Fill,
    Canceled,
    Replaced,
    Rejected,
}

pub fn parse_exec_type(raw: &str) -> Result<ExecType, WireError> {
    match raw {
        "0" => Ok(ExecType::New),
        "1" => Ok(ExecType::PartialFill),
        "2" => Ok(ExecType::Fill),
        "4" => Ok(ExecType::Canceled),
        "5" => Ok(ExecType::Replaced),
        "8" => Ok(ExecType::Rejected),
        other => Err(WireError::InvalidField {
            tag: tags::EXEC_TYPE,
            value: other.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CxlRejResponseTo {
    OrderCancelRequest,
    OrderCancelReplaceRequest,
}

pub fn parse_cxl_rej_response_to(raw: &str) -> Result<CxlRejResponseTo, WireError> {
    match raw {
        "1" => Ok(CxlRejResponseTo::OrderCancelRequest),
        "2" => Ok(CxlRejResponseTo::OrderCancelReplaceRequest),
        other => Err(WireError::InvalidField {
            tag: tags::CXL_REJ_RESPONSE_TO,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_codes() {
        assert_eq!(parse_side(tags::SIDE, "1").unwrap(), Side::Bid);
        assert_eq!(parse_side(tags::SIDE, "2").unwrap(), Side::Ask);
        assert!(parse_side(tags::SIDE, "3").is_err());
    }

    #[test]
    fn ord_status_codes() {
        assert_eq!(parse_ord_status("0").unwrap(), OrdStatus::New);
        assert_eq!(parse_ord_status("4").unwrap(), OrdStatus::Canceled);
    }
}
