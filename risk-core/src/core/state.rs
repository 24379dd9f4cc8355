//! Order lifecycle states.

use serde::{Deserialize, Serialize};

/// The seven states a tracked order can occupy.
///
/// `PENDING_NEW`, `OPEN`, `PENDING_REPLACE` and `PENDING_CANCEL` are active;
/// `FILLED`, `CANCELED` and `REJECTED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    PendingNew,
    Open,
    PendingReplace,
    PendingCancel,
    Filled,
    Canceled,
    Rejected,
}

impl OrderState {
    pub fn is_active(self) -> bool {
        matches!(
            self,
            OrderState::PendingNew
                | OrderState::Open
                | OrderState::PendingReplace
                | OrderState::PendingCancel
        )
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderState::PendingNew => "PENDING_NEW",
            OrderState::Open => "OPEN",
            OrderState::PendingReplace => "PENDING_REPLACE",
            OrderState::PendingCancel => "PENDING_CANCEL",
            OrderState::Filled => "FILLED",
            OrderState::Canceled => "CANCELED",
            OrderState::Rejected => "REJECTED",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_terminal_partition() {
        let active = [
            OrderState::PendingNew,
            OrderState::Open,
            OrderState::PendingReplace,
            OrderState::PendingCancel,
        ];
        let terminal = [OrderState::Filled, OrderState::Canceled, OrderState::Rejected];

        for s in active {
            assert!(s.is_active());
            assert!(!s.is_terminal());
        }
        for s in terminal {
            assert!(s.is_terminal());
            assert!(!s.is_active());
        }
    }
}
