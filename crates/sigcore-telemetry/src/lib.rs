//! Telemetry for the sigcore signature pipeline.
//!
//! Prometheus counters and histograms for expansion, submission, resolution and cancellation.
//! Exposition over HTTP is the embedding node's concern; this crate only collects and encodes.

pub mod metrics;
pub mod registry;
pub mod types;

pub use metrics::{
    SIGNATURES_EXPANDED, SIGNATURES_RESOLVED, SIGNATURES_SUBMITTED, VERIFICATIONS_CANCELLED,
    VERIFICATION_TIME,
};
pub use registry::MetricsRegistry;
pub use types::{MetricError, MetricResult};

use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    /// Global metrics registry instance
    pub static ref METRICS_REGISTRY: Arc<MetricsRegistry> = {
        match MetricsRegistry::new() {
            Ok(registry) => Arc::new(registry),
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize metrics registry");
                panic!("Critical error: Failed to initialize metrics registry:: {e}");
            }
        }
    };
}

/// Initialize the telemetry subsystem
pub fn init() -> MetricResult<()> {
    let _ = &*METRICS_REGISTRY;

    tracing::info!("Telemetry subsystem initialized");
    Ok(())
}

/// Get a reference to the global metrics registry
pub fn registry() -> Arc<MetricsRegistry> {
    METRICS_REGISTRY.clone()
}
