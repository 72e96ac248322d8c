use metrics::{counter, describe_histogram, gauge, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics(model_loaded: bool) -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("predictions_total", "decision" => "eligible").absolute(0);
    counter!("predictions_total", "decision" => "ineligible").absolute(0);
    counter!("prediction_failures_total", "reason" => "model_unavailable").absolute(0);
    counter!("prediction_failures_total", "reason" => "scoring").absolute(0);
    counter!("features_defaulted_total").absolute(0);
    counter!("probability_fallbacks_total").absolute(0);

    gauge!("model_loaded").set(if model_loaded { 1.0 } else { 0.0 });

    // Only described: a placeholder sample would skew the latency count.
    // The series shows up after the first served prediction.
    describe_histogram!(
        "predict_latency_seconds",
        Unit::Seconds,
        "Time spent vectorizing, scoring and explaining one request"
    );

    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally. Rendering
/// works, but nothing recorded through the `metrics` macros reaches it.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
