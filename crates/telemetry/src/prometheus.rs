// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_histogram, register_int_counter,
    register_int_counter_vec, Gauge, Histogram, IntCounter, IntCounterVec,
};

// --- Metric Statics ---
// We use OnceCell to hold the metric collectors. They will be initialized
// exactly once by the `install` function.

static OUTCOME_CACHE_SIZE: OnceCell<Gauge> = OnceCell::new();
static INVALID_PLAIN_CANDIDATES_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static INVALID_BLOB_CANDIDATES_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static PROPOSALS_REJECTED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static FILTER_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();
static VALIDATION_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();
static GUARD_TRANSFERS_REJECTED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static GUARD_TRANSFERS_PASSED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Helper macro to reduce boilerplate for getting a metric from OnceCell.
/// This will panic if `install()` has not been called, which is intentional
/// as it indicates a critical application setup error.
macro_rules! get_metric {
    ($metric:ident) => {
        $metric
            .get()
            .expect("Prometheus sink not initialized. Call telemetry::prometheus::install() first.")
    };
}

impl ProposalMetricsSink for PrometheusSink {
    fn inc_invalid_plain_candidates(&self) {
        get_metric!(INVALID_PLAIN_CANDIDATES_TOTAL).inc();
    }
    fn inc_invalid_blob_candidates(&self) {
        get_metric!(INVALID_BLOB_CANDIDATES_TOTAL).inc();
    }
    fn inc_proposals_rejected(&self, reason: &'static str) {
        get_metric!(PROPOSALS_REJECTED_TOTAL)
            .with_label_values(&[reason])
            .inc();
    }
    fn observe_filter_duration(&self, duration_secs: f64) {
        get_metric!(FILTER_DURATION_SECONDS).observe(duration_secs);
    }
    fn observe_validation_duration(&self, duration_secs: f64) {
        get_metric!(VALIDATION_DURATION_SECONDS).observe(duration_secs);
    }
    fn set_outcome_cache_size(&self, size: f64) {
        get_metric!(OUTCOME_CACHE_SIZE).set(size);
    }
}

impl GuardMetricsSink for PrometheusSink {
    fn inc_transfers_rejected(&self) {
        get_metric!(GUARD_TRANSFERS_REJECTED_TOTAL).inc();
    }
    fn inc_transfers_passed(&self) {
        get_metric!(GUARD_TRANSFERS_PASSED_TOTAL).inc();
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        get_metric!(ERRORS_TOTAL)
            .with_label_values(&[kind, variant])
            .inc();
    }
}

/// Initializes all Prometheus metrics collectors and returns a static reference to the sink.
/// This function must be called only once at application startup.
#[allow(clippy::expect_used)]
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    OUTCOME_CACHE_SIZE
        .set(register_gauge!(
            "opal_admission_outcome_cache_size",
            "Current number of entries in the transaction outcome cache."
        )?)
        .expect("static already initialized");
    INVALID_PLAIN_CANDIDATES_TOTAL
        .set(register_int_counter!(
            "opal_proposal_invalid_plain_candidates_total",
            "Total plain candidates dropped while filtering a proposal."
        )?)
        .expect("static already initialized");
    INVALID_BLOB_CANDIDATES_TOTAL
        .set(register_int_counter!(
            "opal_proposal_invalid_blob_candidates_total",
            "Total blob candidates dropped while filtering a proposal."
        )?)
        .expect("static already initialized");
    PROPOSALS_REJECTED_TOTAL
        .set(register_int_counter_vec!(
            "opal_proposal_rejected_total",
            "Total proposals rejected during validation.",
            &["reason"]
        )?)
        .expect("static already initialized");
    FILTER_DURATION_SECONDS
        .set(register_histogram!(
            "opal_proposal_filter_duration_seconds",
            "Latency of a single admission-filter pass.",
            exponential_buckets(0.002, 2.0, 15)?
        )?)
        .expect("static already initialized");
    VALIDATION_DURATION_SECONDS
        .set(register_histogram!(
            "opal_proposal_validation_duration_seconds",
            "Latency of a single whole-proposal validation.",
            exponential_buckets(0.002, 2.0, 15)?
        )?)
        .expect("static already initialized");
    GUARD_TRANSFERS_REJECTED_TOTAL
        .set(register_int_counter!(
            "opal_guard_transfers_rejected_total",
            "Total inbound transfers rejected at a protected address."
        )?)
        .expect("static already initialized");
    GUARD_TRANSFERS_PASSED_TOTAL
        .set(register_int_counter!(
            "opal_guard_transfers_passed_total",
            "Total inbound packets passed through to the wrapped handler."
        )?)
        .expect("static already initialized");
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "opal_errors_total",
            "Total number of errors, categorized by type and variant.",
            &["kind", "variant"]
        )?)
        .expect("static already initialized");

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}
