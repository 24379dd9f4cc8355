//! The book's authoritative record for one live order.

use rust_decimal::Decimal;

use super::{OrderKey, OrderState, Side};

/// The pre-replace `{price, quantity, key}` triple, present iff the order is
/// in `PENDING_REPLACE`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReplace {
    pub price: Decimal,
    pub quantity: Decimal,
    pub key: OrderKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedOrder {
    pub key: OrderKey,
    pub symbol: String,
    pub underlyer: String,
    pub strategy_id: String,
    pub portfolio_id: String,
    pub security_type: String,
    pub side: Side,
    /// Current working price.
    pub price: Decimal,
    /// Current working quantity.
    pub quantity: Decimal,
    /// Unfilled remainder.
    pub leaves_qty: Decimal,
    /// Filled total, retained across replace for audit.
    pub cum_qty: Decimal,
    /// Per-contract delta, `None` for instruments the directory has no
    /// greeks for.
    pub delta: Option<Decimal>,
    /// Per-contract vega.
    pub vega: Option<Decimal>,
    pub state: OrderState,
    pub pending: Option<PendingReplace>,
}

impl TrackedOrder {
    /// `price · leaves_qty` — notional is always computed off the order's
    /// own recorded price, never a market or execution price.
    pub fn notional(&self) -> Decimal {
        self.price * self.leaves_qty
    }

    /// `delta · leaves_qty`, zero for instruments without a delta.
    pub fn delta_exposure(&self) -> Decimal {
        self.delta.unwrap_or(Decimal::ZERO) * self.leaves_qty
    }

    /// `vega · leaves_qty`, zero for instruments without a vega.
    pub fn vega_exposure(&self) -> Decimal {
        self.vega.unwrap_or(Decimal::ZERO) * self.leaves_qty
    }

    /// Signed notional/delta helper: positive for BID, negative for ASK.
    pub fn signed(&self, magnitude: Decimal) -> Decimal {
        Decimal::from(self.side.sign()) * magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order() -> TrackedOrder {
        TrackedOrder {
            key: OrderKey::new("CL-1"),
            symbol: "AAPL".into(),
            underlyer: "AAPL".into(),
            strategy_id: "S1".into(),
            portfolio_id: "P1".into(),
            security_type: "EQUITY".into(),
            side: Side::Bid,
            price: dec!(100),
            quantity: dec!(10),
            leaves_qty: dec!(10),
            cum_qty: dec!(0),
            delta: Some(dec!(0.5)),
            vega: Some(dec!(0.1)),
            state: OrderState::Open,
            pending: None,
        }
    }

    #[test]
    fn notional_uses_order_price_not_market() {
        assert_eq!(order().notional(), dec!(1000));
    }

    #[test]
    fn delta_exposure_scales_by_leaves() {
        assert_eq!(order().delta_exposure(), dec!(5.0));
    }

    #[test]
    fn signed_flips_for_ask() {
        let mut o = order();
        o.side = Side::Ask;
        assert_eq!(o.signed(dec!(5)), dec!(-5));
    }
}
