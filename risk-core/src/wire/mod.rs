//! Tag/value wire protocol: types, message classes and the codec (§6).

pub mod codec;
pub mod message;
pub mod tags;
pub mod types;

pub use codec::{parse, serialize};
pub use message::{
    ExecutionReport, Message, NewOrderSingle, OrderCancelReject, OrderCancelReplace,
    OrderCancelRequest,
};
