//! Risk engine orchestration (§4.4): owns the book, the aggregator and the
//! limit store, and glues lifecycle events to aggregation deltas.

pub mod translate;

pub use translate::translate as event_from_message;

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::aggregation::{GroupKey, Metric, MultiGroupAggregator, Snapshot};
use crate::book::OrderBook;
use crate::core::{OrderKey, RiskError, TrackedOrder};
use crate::instrument::InstrumentDirectory;
use crate::limits::{Decision, Limit, LimitSense, MetricLimitStore};
use crate::telemetry::EngineTelemetry;
use crate::wire::NewOrderSingle;

/// `portfolio_id`/`strategy_id` are routing attributes, not wire-protocol
/// fields (§6's NewOrderSingle field table names none), so they travel
/// alongside the wire message rather than inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub order: NewOrderSingle,
    pub portfolio_id: String,
    pub strategy_id: String,
}

/// Lifecycle events the engine drives through the book (§4.4), with the
/// explicit start/complete/reject split the book's state machine requires.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskEvent {
    Submit(SubmitRequest),
    Acknowledge(OrderKey),
    Reject(OrderKey),
    Fill {
        key: OrderKey,
        last_qty: Decimal,
    },
    StartReplace {
        orig_key: OrderKey,
        new_key: OrderKey,
        new_price: Decimal,
        new_qty: Decimal,
    },
    CompleteReplace {
        orig_key: OrderKey,
    },
    RejectReplace {
        orig_key: OrderKey,
    },
    StartCancel {
        orig_key: OrderKey,
        cancel_key: OrderKey,
    },
    CompleteCancel {
        key: OrderKey,
    },
    RejectCancel {
        orig_key: OrderKey,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// A `Submit` was accepted, booked, and its aggregation delta applied.
    Accepted,
    /// A `Submit`'s pre-trade check failed; book and aggregator are
    /// untouched.
    Rejected(Decision),
    /// A post-trade event (`Acknowledge`/`Fill`/.../`RejectCancel`) applied
    /// cleanly.
    Applied,
}

/// Glue (§4.4): one OrderBook, one MultiGroupAggregator, one
/// MetricLimitStore, and the snapshot side-table the engine needs so
/// `remove`/`replace` can subtract exactly (Design Note "Snapshot
/// bookkeeping").
pub struct RiskEngine {
    instruments: InstrumentDirectory,
    book: OrderBook,
    aggregator: MultiGroupAggregator,
    limits: MetricLimitStore,
    snapshots: HashMap<OrderKey, HashMap<String, Snapshot>>,
    telemetry: Option<EngineTelemetry>,
}

impl RiskEngine {
    pub fn new(instruments: InstrumentDirectory) -> Self {
        Self {
            instruments,
            book: OrderBook::new(),
            aggregator: MultiGroupAggregator::new(),
            limits: MetricLimitStore::new(),
            snapshots: HashMap::new(),
            telemetry: None,
        }
    }

    /// Attaches a Prometheus registry the engine reports its own operational
    /// counters into (§ Telemetry). Optional — an engine with no telemetry
    /// attached simply skips the `record_*`/`set_book_size` calls.
    pub fn with_telemetry(mut self, telemetry: EngineTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn telemetry(&self) -> Option<&EngineTelemetry> {
        self.telemetry.as_ref()
    }

    pub fn register_metric(&mut self, metric: Metric) {
        self.aggregator.register(metric);
    }

    pub fn set_limit(&mut self, metric_id: impl Into<String>, bucket_key: GroupKey, sense: LimitSense) {
        self.limits.set_limit(metric_id, bucket_key, Limit { sense });
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn aggregator(&self) -> &MultiGroupAggregator {
        &self.aggregator
    }

    fn candidate_from(&self, req: &SubmitRequest) -> TrackedOrder {
        let record = self.instruments.lookup_or_default(&req.order.symbol);
        let underlyer = req
            .order
            .underlying_symbol
            .clone()
            .unwrap_or_else(|| record.underlyer.clone());
        let security_type = req
            .order
            .security_type
            .clone()
            .unwrap_or_else(|| format!("{:?}", record.kind).to_uppercase());

        TrackedOrder {
            key: req.order.cl_ord_id.clone(),
            symbol: req.order.symbol.clone(),
            underlyer,
            strategy_id: req.strategy_id.clone(),
            portfolio_id: req.portfolio_id.clone(),
            security_type,
            side: req.order.side,
            price: req.order.price,
            quantity: req.order.order_qty,
            leaves_qty: req.order.order_qty,
            cum_qty: Decimal::ZERO,
            delta: record.delta,
            vega: record.vega,
            state: crate::core::OrderState::PendingNew,
            pending: None,
        }
    }

    /// Pure pre-trade what-if (§4.2, §4.3): projects the candidate's
    /// contribution to every registered metric it would touch and evaluates
    /// those projections against the limit store. Never mutates state.
    pub fn check(&self, candidate: &TrackedOrder) -> Decision {
        let mut projections = Vec::new();
        for id in self.aggregator.metric_ids() {
            let Some(metric) = self.aggregator.get(id) else {
                continue;
            };
            if !metric.stage.matches(candidate.state) {
                continue;
            }
            let key = metric.key_for_candidate(candidate);
            let projected = metric.project(candidate);
            projections.push((id, key, projected));
        }
        self.limits.evaluate_all(projections)
    }

    /// `submit(new_order_single) -> Result<Decision, RiskError>` (§4.4): runs
    /// `check` first. On Accept, books the order and applies its aggregation
    /// add. On Reject, returns the Decision without touching book or
    /// aggregator state.
    pub fn submit(&mut self, req: SubmitRequest) -> Result<Decision, RiskError> {
        if let Some(telemetry) = &self.telemetry {
            telemetry.record_event();
        }

        let candidate = self.candidate_from(&req);
        let decision = self.check(&candidate);
        if let Decision::Reject { ref metric_id, .. } = decision {
            warn!(key = %candidate.key, "pre-trade check rejected submit");
            if let Some(telemetry) = &self.telemetry {
                telemetry.record_reject(metric_id);
            }
            return Ok(decision);
        }

        self.book.add(candidate.clone())?;
        self.dispatch(&candidate.key, &candidate);
        info!(key = %candidate.key, "order submitted and booked");
        if let Some(telemetry) = &self.telemetry {
            telemetry.set_book_size(self.book.len());
        }
        Ok(decision)
    }

    /// Recomputes the aggregation delta for `order`'s current state against
    /// whatever it contributed under `old_key`, and stores the refreshed
    /// snapshot under the order's current key. Because
    /// `MultiGroupAggregator::replace` treats "no prior snapshot" as an add
    /// and "no post snapshot" as an implicit remove, this single call
    /// correctly implements all four of §4.4's delta cases
    /// (false→true, true→false, true→true, false→false).
    fn dispatch(&mut self, old_key: &OrderKey, order: &TrackedOrder) {
        let before = self.snapshots.remove(old_key).unwrap_or_default();
        let after = self.aggregator.replace(&before, order);
        if after.is_empty() {
            self.snapshots.remove(&order.key);
        } else {
            self.snapshots.insert(order.key.clone(), after);
        }
    }

    fn after_mutation(&mut self, old_key: &OrderKey, key_for_lookup: &OrderKey) -> Result<(), RiskError> {
        let order = self
            .book
            .get(key_for_lookup)
            .ok_or_else(|| RiskError::UnknownKey(key_for_lookup.clone()))?
            .clone();
        self.dispatch(old_key, &order);
        Ok(())
    }

    /// Drives one post-trade lifecycle event through the book and dispatches
    /// its aggregation delta (§4.4). `Submit` is also accepted here as a
    /// convenience wrapper around [`RiskEngine::submit`].
    pub fn process(&mut self, event: RiskEvent) -> Result<EngineOutcome, RiskError> {
        let outcome = self.process_inner(event);
        if let Some(telemetry) = &self.telemetry {
            telemetry.set_book_size(self.book.len());
            if matches!(outcome, Err(RiskError::ProtocolViolation { .. })) {
                telemetry.record_protocol_violation();
            }
        }
        outcome
    }

    fn process_inner(&mut self, event: RiskEvent) -> Result<EngineOutcome, RiskError> {
        if let Some(telemetry) = &self.telemetry {
            if !matches!(event, RiskEvent::Submit(_)) {
                telemetry.record_event();
            }
        }
        match event {
            RiskEvent::Submit(req) => {
                let decision = self.submit(req)?;
                Ok(if decision.is_accept() {
                    EngineOutcome::Accepted
                } else {
                    EngineOutcome::Rejected(decision)
                })
            }
            RiskEvent::Acknowledge(key) => {
                self.book.acknowledge(&key)?;
                self.after_mutation(&key, &key)?;
                Ok(EngineOutcome::Applied)
            }
            RiskEvent::Reject(key) => {
                self.book.reject(&key)?;
                self.after_mutation(&key, &key)?;
                Ok(EngineOutcome::Applied)
            }
            RiskEvent::Fill { key, last_qty } => {
                let primary_key = self
                    .book
                    .resolve(&key)
                    .map(|o| o.key.clone())
                    .unwrap_or_else(|| key.clone());
                let delta = self.book.apply_fill(&key, last_qty)?;
                if let Some(delta) = delta {
                    self.after_mutation(&primary_key, &primary_key)?;
                    if delta.clamped_excess > Decimal::ZERO {
                        warn!(%key, excess = %delta.clamped_excess, "fill overfilled leaves_qty");
                        return Err(RiskError::ProtocolViolation {
                            key: primary_key,
                            reason: format!("fill exceeded leaves_qty by {}", delta.clamped_excess),
                        });
                    }
                }
                Ok(EngineOutcome::Applied)
            }
            RiskEvent::StartReplace {
                orig_key,
                new_key,
                new_price,
                new_qty,
            } => {
                self.book
                    .start_replace(&orig_key, new_key, new_price, new_qty)?;
                self.after_mutation(&orig_key, &orig_key)?;
                Ok(EngineOutcome::Applied)
            }
            RiskEvent::CompleteReplace { orig_key } => {
                let new_key = self
                    .book
                    .get(&orig_key)
                    .and_then(|o| o.pending.as_ref())
                    .map(|p| p.key.clone())
                    .unwrap_or_else(|| orig_key.clone());
                if self.book.complete_replace(&orig_key)?.is_some() {
                    self.after_mutation(&orig_key, &new_key)?;
                }
                Ok(EngineOutcome::Applied)
            }
            RiskEvent::RejectReplace { orig_key } => {
                self.book.reject_replace(&orig_key)?;
                self.after_mutation(&orig_key, &orig_key)?;
                Ok(EngineOutcome::Applied)
            }
            RiskEvent::StartCancel { orig_key, cancel_key } => {
                self.book.start_cancel(&orig_key, cancel_key)?;
                self.after_mutation(&orig_key, &orig_key)?;
                Ok(EngineOutcome::Applied)
            }
            RiskEvent::CompleteCancel { key } => {
                let orig_key = self
                    .book
                    .resolve(&key)
                    .map(|o| o.key.clone())
                    .ok_or_else(|| RiskError::UnknownKey(key.clone()))?;
                self.book.complete_cancel(&key)?;
                self.after_mutation(&orig_key, &orig_key)?;
                Ok(EngineOutcome::Applied)
            }
            RiskEvent::RejectCancel { orig_key } => {
                self.book.reject_cancel(&orig_key)?;
                self.after_mutation(&orig_key, &orig_key)?;
                Ok(EngineOutcome::Applied)
            }
        }
    }

    /// Drops terminal orders and their snapshots (§3 "terminal orders live
    /// until the next cleanup_terminal()").
    pub fn cleanup_terminal(&mut self) {
        self.book.cleanup_terminal();
        self.snapshots
            .retain(|key, _| self.book.get(key).is_some());
    }

    /// Translates a decoded wire message into its [`RiskEvent`] and applies
    /// it in one step, for callers (the CLI harness) that replay a raw
    /// event stream rather than constructing `RiskEvent`s directly.
    pub fn process_message(
        &mut self,
        message: crate::wire::Message,
        portfolio_id: Option<String>,
        strategy_id: Option<String>,
    ) -> Result<Option<EngineOutcome>, RiskError> {
        match translate::translate(&self.book, message, portfolio_id, strategy_id)? {
            Some(event) => self.process(event).map(Some),
            None => Ok(None),
        }
    }
}
