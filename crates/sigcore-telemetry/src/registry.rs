//! Metrics registry wrapper.

use prometheus::{proto::MetricFamily, Encoder, Registry, TextEncoder};
use std::sync::Arc;

use crate::{
    metrics::register_core_metrics,
    types::{MetricError, MetricResult},
};

/// Thread-safe wrapper around a Prometheus registry
pub struct MetricsRegistry {
    registry: Arc<Registry>,
}

impl MetricsRegistry {
    /// Create a new metrics registry with the signature metrics pre-registered
    pub fn new() -> MetricResult<Self> {
        let registry = Arc::new(Registry::new());
        register_core_metrics(&registry)?;

        Ok(Self { registry })
    }

    /// Create a new metrics registry without pre-registered metrics
    pub fn new_empty() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    /// Get a reference to the underlying Prometheus registry
    pub fn inner(&self) -> &Registry {
        &self.registry
    }

    /// Register an additional collector, e.g. from the embedding node
    pub fn register_collector(
        &self,
        collector: Box<dyn prometheus::core::Collector>,
    ) -> MetricResult<()> {
        self.registry
            .register(collector)
            .map_err(|e| MetricError::RegistrationFailed(e.to_string()))
    }

    /// Gather all metrics from the registry
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Encode metrics in Prometheus text format
    pub fn encode_to_string(&self) -> MetricResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricError::EncodingFailed(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricError::EncodingFailed(e.to_string()))
    }
}
