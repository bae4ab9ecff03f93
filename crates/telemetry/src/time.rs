// Path: crates/telemetry/src/time.rs
use crate::sinks::ProposalMetricsSink;
use std::time::Instant;

/// Observation targets for the RAII [`Timer`].
#[derive(Debug, Clone, Copy)]
pub enum Phase {
    /// An admission-filter pass during proposal construction.
    Filter,
    /// A whole-proposal validation.
    Validation,
}

pub struct Timer<'a> {
    sink: &'a dyn ProposalMetricsSink,
    phase: Phase,
    start: Instant,
}

impl<'a> Timer<'a> {
    pub fn new(sink: &'a dyn ProposalMetricsSink, phase: Phase) -> Self {
        Self {
            sink,
            phase,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        match self.phase {
            Phase::Filter => self.sink.observe_filter_duration(elapsed),
            Phase::Validation => self.sink.observe_validation_duration(elapsed),
        }
    }
}
