//! Prometheus metrics for user operations and submission latency.
//!
//! This module provides metrics for:
//! - Bet placement and rejections
//! - Market creation
//! - Wallet connection attempts
//! - Sign-in / sign-up outcomes
//! - Page renders per route
//! - Submission backend latency

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Submission latency metric name.
pub const METRIC_SUBMISSION_LATENCY: &str = "submission_latency_ms";
/// Bets placed counter metric name.
pub const METRIC_BETS_PLACED: &str = "bets_placed_total";
/// Bets rejected counter metric name.
pub const METRIC_BETS_REJECTED: &str = "bets_rejected_total";
/// Markets created counter metric name.
pub const METRIC_MARKETS_CREATED: &str = "markets_created_total";
/// Wallet connects counter metric name.
pub const METRIC_WALLET_CONNECTS: &str = "wallet_connects_total";
/// Wallet connect failures counter metric name.
pub const METRIC_WALLET_CONNECT_FAILURES: &str = "wallet_connect_failures_total";
/// Successful sign-ins and sign-ups counter metric name.
pub const METRIC_AUTH_SUCCESSES: &str = "auth_successes_total";
/// Failed sign-ins and sign-ups counter metric name.
pub const METRIC_AUTH_FAILURES: &str = "auth_failures_total";
/// Page renders counter metric name.
pub const METRIC_PAGE_RENDERS: &str = "page_renders_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_SUBMISSION_LATENCY,
        "Bet and market submission latency in milliseconds"
    );

    describe_counter!(METRIC_BETS_PLACED, "Total number of bets placed");
    describe_counter!(
        METRIC_BETS_REJECTED,
        "Total number of bets rejected by validation or the backend"
    );
    describe_counter!(METRIC_MARKETS_CREATED, "Total number of markets created");
    describe_counter!(
        METRIC_WALLET_CONNECTS,
        "Total number of successful wallet connections"
    );
    describe_counter!(
        METRIC_WALLET_CONNECT_FAILURES,
        "Total number of failed wallet connections"
    );
    describe_counter!(METRIC_AUTH_SUCCESSES, "Total number of successful sign-ins and sign-ups");
    describe_counter!(METRIC_AUTH_FAILURES, "Total number of failed sign-ins and sign-ups");
    describe_counter!(METRIC_PAGE_RENDERS, "Total number of page renders by route");

    debug!("Metrics initialized");
}

/// Record submission latency.
pub fn record_submission_latency(start: Instant, kind: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_SUBMISSION_LATENCY, "kind" => kind).record(latency_ms);
}

/// Increment bets placed counter.
pub fn inc_bets_placed() {
    counter!(METRIC_BETS_PLACED).increment(1);
}

/// Increment bets rejected counter.
pub fn inc_bets_rejected() {
    counter!(METRIC_BETS_REJECTED).increment(1);
}

/// Increment markets created counter.
pub fn inc_markets_created() {
    counter!(METRIC_MARKETS_CREATED).increment(1);
}

/// Increment wallet connects counter.
pub fn inc_wallet_connects() {
    counter!(METRIC_WALLET_CONNECTS).increment(1);
}

/// Increment wallet connect failures counter.
pub fn inc_wallet_connect_failures(cause: &'static str) {
    counter!(METRIC_WALLET_CONNECT_FAILURES, "cause" => cause).increment(1);
}

/// Increment auth successes counter.
pub fn inc_auth_successes(action: &'static str) {
    counter!(METRIC_AUTH_SUCCESSES, "action" => action).increment(1);
}

/// Increment auth failures counter.
pub fn inc_auth_failures(action: &'static str) {
    counter!(METRIC_AUTH_FAILURES, "action" => action).increment(1);
}

/// Increment page renders counter.
pub fn inc_page_renders(route: &'static str) {
    counter!(METRIC_PAGE_RENDERS, "route" => route).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    kind: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given submission kind.
    pub fn new(kind: &'static str) -> Self {
        Self {
            start: Instant::now(),
            kind,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_submission_latency(self.start, self.kind);
    }
}
