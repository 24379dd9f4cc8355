//! Numeric field tags for the tag/value wire protocol.

pub const MSG_TYPE: u32 = 35;
pub const CL_ORD_ID: u32 = 11;
pub const ORIG_CL_ORD_ID: u32 = 41;
pub const ORDER_ID: u32 = 37;
pub const SYMBOL: u32 = 55;
pub const SIDE: u32 = 54;
pub const ORDER_QTY: u32 = 38;
pub const PRICE: u32 = 44;
pub const ORD_STATUS: u32 = 39;
pub const EXEC_TYPE: u32 = 150;
pub const LEAVES_QTY: u32 = 151;
pub const CUM_QTY: u32 = 14;
pub const LAST_QTY: u32 = 32;
pub const LAST_PX: u32 = 31;
pub const UNDERLYING_SYMBOL: u32 = 311;
pub const SECURITY_TYPE: u32 = 167;
pub const TEXT: u32 = 58;
pub const ORD_REJ_REASON: u32 = 103;
pub const CXL_REJ_REASON: u32 = 102;
pub const CXL_REJ_RESPONSE_TO: u32 = 434;

pub mod msg_type {
    pub const NEW_ORDER_SINGLE: &str = "D";
    pub const ORDER_CANCEL_REPLACE: &str = "G";
    pub const ORDER_CANCEL_REQUEST: &str = "F";
    pub const EXECUTION_REPORT: &str = "8";
    pub const ORDER_CANCEL_REJECT: &str = "9";
}
