use std::{fmt, sync::Arc};

use metrics_exporter_prometheus::PrometheusHandle;
use weather_core::Aggregator;

/// Shared handler state. Cloned per request; the aggregator and its registry
/// are read-only for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(aggregator: Aggregator, metrics: PrometheusHandle) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            metrics,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}
