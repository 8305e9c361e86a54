//! Signature pipeline metrics.
//!
//! Counters are process-global; the expansion and verification code updates them through the
//! helper functions below so label values stay consistent.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

use crate::types::MetricResult;

lazy_static! {
    /// Expanded signature pairs produced, by expansion entry point
    pub static ref SIGNATURES_EXPANDED: IntCounterVec = IntCounterVec::new(
        Opts::new("sig_expanded_total", "Expanded signature pairs produced"),
        &["source"]
    ).expect("Failed to create sig_expanded_total metric");

    /// Verification requests accepted by the crypto engine, by signature kind
    pub static ref SIGNATURES_SUBMITTED: IntCounterVec = IntCounterVec::new(
        Opts::new("sig_submitted_total", "Signature verification requests submitted"),
        &["kind"]
    ).expect("Failed to create sig_submitted_total metric");

    /// Resolved verifications, by outcome (`valid` or `invalid`)
    pub static ref SIGNATURES_RESOLVED: IntCounterVec = IntCounterVec::new(
        Opts::new("sig_resolved_total", "Signature verifications resolved"),
        &["outcome"]
    ).expect("Failed to create sig_resolved_total metric");

    /// Verification futures cancelled before resolving
    pub static ref VERIFICATIONS_CANCELLED: IntCounter = IntCounter::new(
        "sig_cancelled_total",
        "Signature verifications cancelled"
    ).expect("Failed to create sig_cancelled_total metric");

    /// Time spent in the verification primitive
    pub static ref VERIFICATION_TIME: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "sig_verification_seconds",
            "Time taken to verify one signature in seconds"
        ).buckets(vec![0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.005, 0.01]),
        &["kind"]
    ).expect("Failed to create sig_verification_seconds metric");
}

/// Register all signature metrics with the provided registry
pub fn register_core_metrics(registry: &Registry) -> MetricResult<()> {
    registry.register(Box::new(SIGNATURES_EXPANDED.clone()))?;
    registry.register(Box::new(SIGNATURES_SUBMITTED.clone()))?;
    registry.register(Box::new(SIGNATURES_RESOLVED.clone()))?;
    registry.register(Box::new(VERIFICATIONS_CANCELLED.clone()))?;
    registry.register(Box::new(VERIFICATION_TIME.clone()))?;

    Ok(())
}

pub fn record_expanded(source: &str, count: usize) {
    SIGNATURES_EXPANDED
        .with_label_values(&[source])
        .inc_by(count as u64);
}

pub fn record_submitted(kind: &str) {
    SIGNATURES_SUBMITTED.with_label_values(&[kind]).inc();
}

pub fn record_resolved(passed: bool) {
    let outcome = if passed { "valid" } else { "invalid" };
    SIGNATURES_RESOLVED.with_label_values(&[outcome]).inc();
}

pub fn record_cancelled() {
    VERIFICATIONS_CANCELLED.inc();
}

pub fn observe_verification_time(kind: &str, duration_secs: f64) {
    VERIFICATION_TIME
        .with_label_values(&[kind])
        .observe(duration_secs);
}
