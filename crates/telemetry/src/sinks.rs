// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured proposal metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn proposal_metrics() -> &'static dyn ProposalMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured transfer-guard metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn guard_metrics() -> &'static dyn GuardMetricsSink {
    SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics related to proposal construction and validation.
pub trait ProposalMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for plain candidates dropped during filtering.
    fn inc_invalid_plain_candidates(&self);
    /// Increments the counter for blob candidates dropped during filtering.
    fn inc_invalid_blob_candidates(&self);
    /// Increments the counter for rejected proposals, labeled by reason code.
    fn inc_proposals_rejected(&self, reason: &'static str);
    /// Observes the duration of one admission-filter pass.
    fn observe_filter_duration(&self, duration_secs: f64);
    /// Observes the duration of one whole-proposal validation.
    fn observe_validation_duration(&self, duration_secs: f64);
    /// Sets the gauge for the current number of outcome-cache entries.
    fn set_outcome_cache_size(&self, size: f64);
}
impl ProposalMetricsSink for NopSink {
    fn inc_invalid_plain_candidates(&self) {}
    fn inc_invalid_blob_candidates(&self) {}
    fn inc_proposals_rejected(&self, _reason: &'static str) {}
    fn observe_filter_duration(&self, _duration_secs: f64) {}
    fn observe_validation_duration(&self, _duration_secs: f64) {}
    fn set_outcome_cache_size(&self, _size: f64) {}
}

/// A sink for metrics related to the inbound transfer guard.
pub trait GuardMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter for transfers rejected at a protected address.
    fn inc_transfers_rejected(&self);
    /// Increments the counter for packets passed through to the wrapped handler.
    fn inc_transfers_passed(&self);
}
impl GuardMetricsSink for NopSink {
    fn inc_transfers_rejected(&self) {}
    fn inc_transfers_passed(&self) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: ProposalMetricsSink + GuardMetricsSink + ErrorMetricsSink {}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where T: ProposalMetricsSink + GuardMetricsSink + ErrorMetricsSink {}
