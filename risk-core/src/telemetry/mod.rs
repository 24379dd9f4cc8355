//! A small Prometheus registry for the engine's own operational counters.
//!
//! Scoped to what this engine actually emits — no latency histograms, no
//! position/PnL gauges, no scrape server.

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

pub struct EngineTelemetry {
    pub registry: Registry,
    pub events_processed_total: IntCounter,
    pub pretrade_rejects_total: IntCounterVec,
    pub book_size: IntGauge,
    pub protocol_violations_total: IntCounter,
}

impl EngineTelemetry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let events_processed_total = IntCounter::with_opts(Opts::new(
            "events_processed_total",
            "Total lifecycle events processed by the risk engine",
        ))?;
        registry.register(Box::new(events_processed_total.clone()))?;

        let pretrade_rejects_total = IntCounterVec::new(
            Opts::new(
                "pretrade_rejects_total",
                "Pre-trade rejections, labelled by the metric that breached",
            ),
            &["metric_id"],
        )?;
        registry.register(Box::new(pretrade_rejects_total.clone()))?;

        let book_size = IntGauge::with_opts(Opts::new(
            "book_size",
            "Number of orders currently tracked by the book",
        ))?;
        registry.register(Box::new(book_size.clone()))?;

        let protocol_violations_total = IntCounter::with_opts(Opts::new(
            "protocol_violations_total",
            "Total protocol violations surfaced (e.g. fill-overflow clamps)",
        ))?;
        registry.register(Box::new(protocol_violations_total.clone()))?;

        Ok(Self {
            registry,
            events_processed_total,
            pretrade_rejects_total,
            book_size,
            protocol_violations_total,
        })
    }

    pub fn record_event(&self) {
        self.events_processed_total.inc();
    }

    pub fn record_reject(&self, metric_id: &str) {
        self.pretrade_rejects_total.with_label_values(&[metric_id]).inc();
    }

    pub fn record_protocol_violation(&self) {
        self.protocol_violations_total.inc();
    }

    pub fn set_book_size(&self, size: usize) {
        self.book_size.set(size as i64);
    }
}
