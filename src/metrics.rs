//! Metrics and tracing helpers.
//!
//! Both halves are feature gated: `metrics` exposes a Prometheus-backed
//! [`METRICS`] static, `tracing` exposes span constructors in [`tracing_helpers`].

#[cfg(feature = "metrics")]
pub use prometheus_metrics::{ControlsMetrics, METRICS};

#[cfg(feature = "metrics")]
mod prometheus_metrics {
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider as _};
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{proto::MetricFamily, Registry};
    use std::time::Duration;

    pub static METRICS: Lazy<ControlsMetrics> = Lazy::new(ControlsMetrics::init);

    pub struct ControlsMetrics {
        pub registry: Registry,
        provider: SdkMeterProvider,
        pub loads_total: Counter<u64>,
        pub load_duration: Histogram<f64>,
        pub schema_drift_total: Counter<u64>,
        pub validation_failures_total: Counter<u64>,
    }

    impl ControlsMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let exporter = opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
                .expect("failed to build prometheus exporter");
            let provider = SdkMeterProvider::builder()
                .with_reader(exporter)
                .build();
            let meter = provider.meter("cascade_controls");

            let loads_total = meter.u64_counter("cascade_controls_loads_total")
                .with_description("Total input control value loads").build();

            let load_duration = meter.f64_histogram("cascade_controls_load_duration_seconds")
                .with_description("Duration of input control value loads").build();

            let schema_drift_total = meter.u64_counter("cascade_controls_schema_drift_total")
                .with_description("Query failures treated as empty results").build();

            let validation_failures_total = meter.u64_counter("cascade_controls_validation_failures_total")
                .with_description("Loads rejected for invalid limit/offset").build();

            Self {
                registry,
                provider,
                loads_total,
                load_duration,
                schema_drift_total,
                validation_failures_total,
            }
        }

        pub fn record_load(&self, elapsed: Duration) {
            self.loads_total.add(1, &[]);
            self.load_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_schema_drift(&self) {
            self.schema_drift_total.add(1, &[]);
        }

        pub fn record_validation_failure(&self) {
            self.validation_failures_total.add(1, &[]);
        }

        /// Collect everything recorded so far, in Prometheus form.
        pub fn gather(&self) -> Vec<MetricFamily> {
            if let Err(e) = self.provider.force_flush() {
                log::debug!("metric flush failed: {e}");
            }
            self.registry.gather()
        }
    }

}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{debug_span, info_span, Span};

    pub fn load_values_span(control: &str) -> Span {
        info_span!("cascade.load_values", control = control)
    }

    pub fn master_dependencies_span(control: &str) -> Span {
        debug_span!("cascade.master_dependencies", control = control)
    }

    pub fn execute_query_span(control: &str, data_source: &str) -> Span {
        info_span!("cascade.execute_query", control = control, data_source = data_source)
    }
}
