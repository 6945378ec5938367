//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `voting_requests_total` - Operations processed, by op and outcome
//! - `voting_request_duration_seconds` - Histogram of operation latencies
//! - `voting_transfers_total` - Successful vote transfers
//! - `voting_tokens_transferred_total` - Tokens moved by successful transfers

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Collectors register only on the carried registry, so independent
/// instances never collide in one process.
#[derive(Clone)]
pub struct Metrics {
    /// Operations processed, labeled by op and outcome
    pub requests_total: IntCounterVec,

    /// Operation latency histogram, labeled by op
    pub request_duration: HistogramVec,

    /// Successful transfers
    pub transfers_total: IntCounter,

    /// Tokens moved by successful transfers
    pub tokens_transferred_total: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let requests_total = IntCounterVec::new(
            Opts::new("voting_requests_total", "Total operations processed"),
            &["op", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "voting_request_duration_seconds",
                "Histogram of operation latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
            &["op"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let transfers_total = IntCounter::with_opts(Opts::new(
            "voting_transfers_total",
            "Total successful vote transfers",
        ))?;
        registry.register(Box::new(transfers_total.clone()))?;

        let tokens_transferred_total = IntCounter::with_opts(Opts::new(
            "voting_tokens_transferred_total",
            "Total tokens moved by successful transfers",
        ))?;
        registry.register(Box::new(tokens_transferred_total.clone()))?;

        Ok(Self {
            requests_total,
            request_duration,
            transfers_total,
            tokens_transferred_total,
            registry,
        })
    }

    /// Record a completed operation
    pub fn record_request(&self, op: &str, outcome: &str, duration_seconds: f64) {
        self.requests_total
            .with_label_values(&[op, outcome])
            .inc();
        self.request_duration
            .with_label_values(&[op])
            .observe(duration_seconds);
    }

    /// Record a successful transfer
    pub fn record_transfer(&self, amount: u64) {
        self.transfers_total.inc();
        self.tokens_transferred_total.inc_by(amount);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
