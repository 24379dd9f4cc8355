//! Order book (§4.1): the authoritative set of tracked orders, their
//! lifecycle state, and pending-replace/cancel bookkeeping.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::tracked_order::PendingReplace;
use crate::core::{OrderKey, OrderState, RiskError, TrackedOrder};

/// Before-values returned by [`OrderBook::complete_replace`] so the engine
/// can emit a compensating aggregation delta.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceDelta {
    pub old_price: Decimal,
    pub old_leaves_qty: Decimal,
    pub old_notional: Decimal,
    pub old_delta_exposure: Decimal,
}

/// Result of [`OrderBook::apply_fill`].
#[derive(Debug, Clone, PartialEq)]
pub struct FillDelta {
    pub filled_qty: Decimal,
    pub filled_notional: Decimal,
    pub filled_delta_exposure: Decimal,
    pub is_complete: bool,
    /// Quantity clamped off an overfill; zero unless the fill exceeded
    /// `leaves_qty`. Non-zero here means the caller should surface
    /// [`RiskError::ProtocolViolation`] without aborting.
    pub clamped_excess: Decimal,
}

/// Single source of truth for every in-flight order (§3, §4.1).
///
/// Keeps two secondary maps, one per pending-mutation kind, rather than the
/// single shared map of the system this was modeled on — a key can only
/// ever be mid-replace or mid-cancel at once, but using separate maps makes
/// that a structural fact instead of a convention callers must maintain.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: HashMap<OrderKey, TrackedOrder>,
    pending_replace: HashMap<OrderKey, OrderKey>,
    pending_cancel: HashMap<OrderKey, OrderKey>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Returns the order for either a primary key or a pending
    /// replace/cancel key.
    pub fn resolve(&self, key: &OrderKey) -> Option<&TrackedOrder> {
        if let Some(order) = self.orders.get(key) {
            return Some(order);
        }
        let primary = self.pending_replace.get(key).or_else(|| self.pending_cancel.get(key))?;
        self.orders.get(primary)
    }

    fn resolve_primary_key(&self, key: &OrderKey) -> Option<OrderKey> {
        if self.orders.contains_key(key) {
            return Some(key.clone());
        }
        self.pending_replace
            .get(key)
            .or_else(|| self.pending_cancel.get(key))
            .cloned()
    }

    pub fn get(&self, key: &OrderKey) -> Option<&TrackedOrder> {
        self.orders.get(key)
    }

    pub fn active_orders(&self) -> impl Iterator<Item = &TrackedOrder> {
        self.orders.values().filter(|o| o.state.is_active())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedOrder> {
        self.orders.values()
    }

    /// `add(new_order_single) → ()`. Fails with `DuplicateKey` if `key` is
    /// already present.
    pub fn add(&mut self, order: TrackedOrder) -> Result<(), RiskError> {
        if self.orders.contains_key(&order.key) {
            return Err(RiskError::DuplicateKey(order.key.clone()));
        }
        debug!(key = %order.key, "order added to book");
        self.orders.insert(order.key.clone(), order);
        Ok(())
    }

    /// `PENDING_NEW → OPEN`; no-op and non-error in any other state.
    pub fn acknowledge(&mut self, key: &OrderKey) -> Result<(), RiskError> {
        let order = self
            .orders
            .get_mut(key)
            .ok_or_else(|| RiskError::UnknownKey(key.clone()))?;
        if order.state == OrderState::PendingNew {
            order.state = OrderState::Open;
        }
        Ok(())
    }

    /// Any active state → `REJECTED`.
    pub fn reject(&mut self, key: &OrderKey) -> Result<(), RiskError> {
        let order = self
            .orders
            .get_mut(key)
            .ok_or_else(|| RiskError::UnknownKey(key.clone()))?;
        if !order.state.is_active() {
            return Err(RiskError::InvalidTransition {
                key: key.clone(),
                from: order.state,
                attempted: "reject",
            });
        }

        let was_pending_replace = order.state == OrderState::PendingReplace;
        let was_pending_cancel = order.state == OrderState::PendingCancel;
        let pending_key = order.pending.take().map(|p| p.key);

        order.state = OrderState::Rejected;

        if was_pending_replace {
            if let Some(pending_key) = pending_key {
                self.pending_replace.remove(&pending_key);
            }
        }
        if was_pending_cancel {
            self.pending_cancel.retain(|_, v| v != key);
        }
        Ok(())
    }

    /// `OPEN|PENDING_NEW → PENDING_REPLACE`; stores the pending triple and
    /// registers `new_key → orig_key` in the secondary map.
    pub fn start_replace(
        &mut self,
        orig_key: &OrderKey,
        new_key: OrderKey,
        new_price: Decimal,
        new_qty: Decimal,
    ) -> Result<(), RiskError> {
        if new_key != *orig_key && self.orders.contains_key(&new_key) {
            return Err(RiskError::DuplicateKey(new_key));
        }
        let order = self
            .orders
            .get_mut(orig_key)
            .ok_or_else(|| RiskError::UnknownKey(orig_key.clone()))?;

        if !matches!(order.state, OrderState::Open | OrderState::PendingNew) {
            return Err(RiskError::InvalidTransition {
                key: orig_key.clone(),
                from: order.state,
                attempted: "start_replace",
            });
        }

        order.pending = Some(PendingReplace {
            price: new_price,
            quantity: new_qty,
            key: new_key.clone(),
        });
        order.state = OrderState::PendingReplace;
        self.pending_replace.insert(new_key, orig_key.clone());
        Ok(())
    }

    /// Applies the pending triple, rekeying the primary map if the pending
    /// key differs from `orig_key`. The new working quantity supplants
    /// `quantity` and `leaves_qty`; `cum_qty` is retained for audit only
    /// (Open Question (a) — pinned).
    pub fn complete_replace(
        &mut self,
        orig_key: &OrderKey,
    ) -> Result<Option<ReplaceDelta>, RiskError> {
        let order = self
            .orders
            .get(orig_key)
            .ok_or_else(|| RiskError::UnknownKey(orig_key.clone()))?;

        if order.state != OrderState::PendingReplace {
            return Ok(None);
        }
        let Some(pending) = order.pending.clone() else {
            return Ok(None);
        };

        let before = ReplaceDelta {
            old_price: order.price,
            old_leaves_qty: order.leaves_qty,
            old_notional: order.notional(),
            old_delta_exposure: order.delta_exposure(),
        };

        let mut order = self.orders.remove(orig_key).expect("checked above");
        order.price = pending.price;
        order.quantity = pending.quantity;
        order.leaves_qty = pending.quantity;
        order.state = OrderState::Open;
        order.pending = None;

        let new_key = pending.key;
        self.pending_replace.remove(&new_key);

        if new_key != *orig_key {
            order.key = new_key.clone();
            self.orders.insert(new_key, order);
        } else {
            self.orders.insert(orig_key.clone(), order);
        }

        Ok(Some(before))
    }

    /// Clears the pending triple and drops the secondary mapping;
    /// `state → OPEN`.
    pub fn reject_replace(&mut self, orig_key: &OrderKey) -> Result<(), RiskError> {
        let order = self
            .orders
            .get_mut(orig_key)
            .ok_or_else(|| RiskError::UnknownKey(orig_key.clone()))?;

        if order.state != OrderState::PendingReplace {
            return Err(RiskError::InvalidTransition {
                key: orig_key.clone(),
                from: order.state,
                attempted: "reject_replace",
            });
        }

        if let Some(pending) = order.pending.take() {
            self.pending_replace.remove(&pending.key);
        }
        order.state = OrderState::Open;
        Ok(())
    }

    /// Active, non-pending-cancel → `PENDING_CANCEL`; records
    /// `cancel_key → orig_key`.
    pub fn start_cancel(
        &mut self,
        orig_key: &OrderKey,
        cancel_key: OrderKey,
    ) -> Result<(), RiskError> {
        let order = self
            .orders
            .get_mut(orig_key)
            .ok_or_else(|| RiskError::UnknownKey(orig_key.clone()))?;

        if !order.state.is_active() || order.state == OrderState::PendingCancel {
            return Err(RiskError::InvalidTransition {
                key: orig_key.clone(),
                from: order.state,
                attempted: "start_cancel",
            });
        }

        if let Some(pending) = order.pending.take() {
            self.pending_replace.remove(&pending.key);
        }
        order.state = OrderState::PendingCancel;
        self.pending_cancel.insert(cancel_key, orig_key.clone());
        Ok(())
    }

    /// Resolves `key` through the secondary map, then `state → CANCELED`.
    pub fn complete_cancel(&mut self, key: &OrderKey) -> Result<(), RiskError> {
        let orig_key = self
            .resolve_primary_key(key)
            .ok_or_else(|| RiskError::UnknownKey(key.clone()))?;
        let order = self
            .orders
            .get_mut(&orig_key)
            .ok_or_else(|| RiskError::UnknownKey(orig_key.clone()))?;

        if order.state != OrderState::PendingCancel {
            return Err(RiskError::InvalidTransition {
                key: orig_key.clone(),
                from: order.state,
                attempted: "complete_cancel",
            });
        }

        order.state = OrderState::Canceled;
        self.pending_cancel.retain(|_, v| *v != orig_key);
        Ok(())
    }

    /// `PENDING_CANCEL → OPEN`.
    pub fn reject_cancel(&mut self, orig_key: &OrderKey) -> Result<(), RiskError> {
        let order = self
            .orders
            .get_mut(orig_key)
            .ok_or_else(|| RiskError::UnknownKey(orig_key.clone()))?;

        if order.state != OrderState::PendingCancel {
            return Err(RiskError::InvalidTransition {
                key: orig_key.clone(),
                from: order.state,
                attempted: "reject_cancel",
            });
        }

        order.state = OrderState::Open;
        self.pending_cancel.retain(|_, v| v != orig_key);
        Ok(())
    }

    /// Resolves `key` through the secondary maps, subtracts `last_qty` from
    /// `leaves_qty`, adds it to `cum_qty`, and transitions to `FILLED` iff
    /// `leaves_qty` reaches zero. Notional/delta are computed using the
    /// order's own recorded price, never the execution price.
    pub fn apply_fill(
        &mut self,
        key: &OrderKey,
        last_qty: Decimal,
    ) -> Result<Option<FillDelta>, RiskError> {
        let orig_key = match self.resolve_primary_key(key) {
            Some(k) => k,
            None => return Ok(None),
        };
        let order = self
            .orders
            .get_mut(&orig_key)
            .ok_or_else(|| RiskError::UnknownKey(orig_key.clone()))?;

        if !order.state.is_active() {
            return Err(RiskError::InvalidTransition {
                key: orig_key,
                from: order.state,
                attempted: "apply_fill",
            });
        }

        let clamped_excess = if last_qty > order.leaves_qty {
            let excess = last_qty - order.leaves_qty;
            warn!(key = %orig_key, %excess, "fill exceeds leaves_qty, clamping");
            excess
        } else {
            Decimal::ZERO
        };
        let applied_qty = last_qty - clamped_excess;

        let filled_notional = applied_qty * order.price;
        let filled_delta_exposure = applied_qty * order.delta.unwrap_or(Decimal::ZERO);

        order.leaves_qty -= applied_qty;
        if order.leaves_qty <= Decimal::ZERO {
            order.leaves_qty = Decimal::ZERO;
        }
        order.cum_qty += applied_qty;

        let is_complete = order.leaves_qty == Decimal::ZERO;
        if is_complete {
            order.state = OrderState::Filled;
        }

        Ok(Some(FillDelta {
            filled_qty: applied_qty,
            filled_notional,
            filled_delta_exposure,
            is_complete,
            clamped_excess,
        }))
    }

    /// Removes terminal orders. Safe to call repeatedly.
    pub fn cleanup_terminal(&mut self) {
        self.orders.retain(|_, order| order.state.is_active());
    }
}


#[cfg(test)]
mod properties {
    //! §8 invariant 1: `cum_qty + leaves_qty = quantity` and `leaves_qty ≥
    //! 0` for every active order, under arbitrary fill sequences.

    use super::*;
    use crate::core::Side;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn order_with_qty(qty: Decimal) -> TrackedOrder {
        TrackedOrder {
            key: OrderKey::new("ord1"),
            symbol: "AAPL".into(),
            underlyer: "AAPL".into(),
            strategy_id: "S1".into(),
            portfolio_id: "P1".into(),
            security_type: "EQUITY".into(),
            side: Side::Bid,
            price: dec!(10),
            quantity: qty,
            leaves_qty: qty,
            cum_qty: Decimal::ZERO,
            delta: Some(dec!(0.5)),
            vega: None,
            state: OrderState::Open,
            pending: None,
        }
    }

    fn new_order(key: &str, price: Decimal, qty: Decimal) -> TrackedOrder {
        TrackedOrder {
            key: OrderKey::new(key),
            symbol: "AAPL".into(),
            underlyer: "AAPL".into(),
            strategy_id: "S1".into(),
            portfolio_id: "P1".into(),
            security_type: "EQUITY".into(),
            side: Side::Bid,
            price,
            quantity: qty,
            leaves_qty: qty,
            cum_qty: Decimal::ZERO,
            delta: Some(dec!(0.5)),
            vega: None,
            state: OrderState::PendingNew,
            pending: None,
        }
    }

    proptest! {
        #[test]
        fn fill_sequence_preserves_quantity_invariant(
            starting_qty in 1u32..10_000,
            fills in prop::collection::vec(1u32..2_000, 0..20),
        ) {
            let mut book = OrderBook::new();
            let quantity = Decimal::from(starting_qty);
            book.add(order_with_qty(quantity)).unwrap();
            let key = OrderKey::new("ord1");

            for fill_qty in fills {
                let Some(order) = book.get(&key) else { break };
                if order.state == OrderState::Filled {
                    break;
                }
                book.apply_fill(&key, Decimal::from(fill_qty)).unwrap();

                let order = book.get(&key).unwrap();
                prop_assert!(order.leaves_qty >= Decimal::ZERO);
                prop_assert_eq!(order.cum_qty + order.leaves_qty, order.quantity);
            }
        }

        #[test]
        fn cancel_reject_is_an_involution(price in 1i64..1_000, qty in 1u32..10_000) {
            let mut book = OrderBook::new();
            let key = OrderKey::new("ord1");
            book.add(new_order("ord1", Decimal::from(price), Decimal::from(qty))).unwrap();
            book.acknowledge(&key).unwrap();
            let before = book.get(&key).unwrap().clone();

            book.start_cancel(&key, OrderKey::new("ord1C")).unwrap();
            book.reject_cancel(&key).unwrap();

            let after = book.get(&key).unwrap().clone();
            prop_assert_eq!(before, after);
        }

        /// §8 property 3: every secondary-map value names an order in the
        /// matching pending state, under an arbitrary sequence of lifecycle
        /// commands (including terminal transitions mid-replace/cancel).
        #[test]
        fn secondary_maps_only_ever_point_at_matching_pending_orders(
            commands in prop::collection::vec(0u8..7, 1..30),
        ) {
            let mut book = OrderBook::new();
            let key = OrderKey::new("ord1");
            book.add(new_order("ord1", dec!(10), dec!(100))).unwrap();
            book.acknowledge(&key).unwrap();

            for command in commands {
                match command {
                    0 => { let _ = book.start_replace(&key, OrderKey::new("ord1R"), dec!(11), dec!(120)); }
                    1 => { let _ = book.complete_replace(&key); }
                    2 => { let _ = book.reject_replace(&key); }
                    3 => { let _ = book.start_cancel(&key, OrderKey::new("ord1C")); }
                    4 => { let _ = book.complete_cancel(&key); }
                    5 => { let _ = book.reject_cancel(&key); }
                    _ => { let _ = book.reject(&key); }
                }

                for orig_key in book.pending_replace.values() {
                    prop_assert_eq!(
                        book.orders.get(orig_key).map(|o| o.state),
                        Some(OrderState::PendingReplace)
                    );
                }
                for orig_key in book.pending_cancel.values() {
                    prop_assert_eq!(
                        book.orders.get(orig_key).map(|o| o.state),
                        Some(OrderState::PendingCancel)
                    );
                }
            }
        }
    }
}
