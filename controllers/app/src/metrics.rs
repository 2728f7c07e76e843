//! Prometheus metrics for the App Controller.

use crate::error::ControllerError;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Reconciliation metrics and the registry that exposes them.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    reconciliations: IntCounterVec,
    failures: IntCounterVec,
    duration: HistogramVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Creates the metrics and registers them in a fresh registry.
    pub fn new() -> Result<Self, ControllerError> {
        let registry = Registry::new();

        let reconciliations = IntCounterVec::new(
            Opts::new("app_controller_reconcile_total", "App reconciliations by outcome"),
            &["result"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new("app_controller_reconcile_errors_total", "Failed App reconciliations by error kind"),
            &["kind"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "app_controller_reconcile_duration_seconds",
                "Time spent reconciling an App",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["result"],
        )?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            failures,
            duration,
        })
    }

    /// Records a finished reconciliation with the given outcome label.
    pub fn observe_reconcile(&self, result: &str, elapsed: Duration) {
        self.reconciliations.with_label_values(&[result]).inc();
        self.duration
            .with_label_values(&[result])
            .observe(elapsed.as_secs_f64());
    }

    /// Records a failed reconciliation.
    pub fn observe_failure(&self, error: &ControllerError, elapsed: Duration) {
        self.failures.with_label_values(&[error.kind()]).inc();
        self.observe_reconcile("error", elapsed);
    }

    /// Renders all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, ControllerError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ControllerError::Metrics(prometheus::Error::Msg(e.to_string())))
    }

    /// Number of reconciliations recorded with `result`.
    #[cfg(test)]
    pub fn reconcile_count(&self, result: &str) -> u64 {
        self.reconciliations.with_label_values(&[result]).get()
    }

    /// Number of failures recorded with error `kind`.
    #[cfg(test)]
    pub fn failure_count(&self, kind: &str) -> u64 {
        self.failures.with_label_values(&[kind]).get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_reconcile_counts_by_result() {
        let metrics = Metrics::new().unwrap();

        metrics.observe_reconcile("updated", Duration::from_millis(3));
        metrics.observe_reconcile("updated", Duration::from_millis(4));
        metrics.observe_reconcile("not_found", Duration::from_millis(1));

        assert_eq!(metrics.reconcile_count("updated"), 2);
        assert_eq!(metrics.reconcile_count("not_found"), 1);
        assert_eq!(metrics.reconcile_count("unchanged"), 0);
    }

    #[test]
    fn test_render_exposes_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.observe_failure(&ControllerError::MissingObjectKey, Duration::from_millis(1));

        let text = metrics.render().unwrap();
        assert!(text.contains("app_controller_reconcile_total{result=\"error\"} 1"));
        assert!(text.contains("app_controller_reconcile_errors_total{kind=\"missing_object_key\"} 1"));
        assert!(text.contains("app_controller_reconcile_duration_seconds_bucket"));
    }
}
