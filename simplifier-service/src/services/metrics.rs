//! Prometheus metrics for simplifier-service.
//!
//! Counts relay outcomes and tracks the latency, errors and token usage of
//! the upstream model.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

struct Metrics {
    registry: Registry,
    simplify_requests_total: IntCounterVec,
    provider_request_duration_seconds: HistogramVec,
    provider_errors_total: IntCounterVec,
    provider_tokens_total: IntCounterVec,
}

impl Metrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Relay outcomes: success, empty_input, invalid_input, provider_error
        let simplify_requests_total = IntCounterVec::new(
            Opts::new("simplify_requests_total", "Total simplify requests by outcome"),
            &["outcome"],
        )?;

        let provider_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "provider_request_duration_seconds",
                "Upstream model latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["model"],
        )?;

        let provider_errors_total = IntCounterVec::new(
            Opts::new("provider_errors_total", "Total upstream model errors"),
            &["model", "error_type"],
        )?;

        // type: input, output
        let provider_tokens_total = IntCounterVec::new(
            Opts::new("provider_tokens_total", "Total tokens reported by the model"),
            &["model", "type"],
        )?;

        registry.register(Box::new(simplify_requests_total.clone()))?;
        registry.register(Box::new(provider_request_duration_seconds.clone()))?;
        registry.register(Box::new(provider_errors_total.clone()))?;
        registry.register(Box::new(provider_tokens_total.clone()))?;

        Ok(Self {
            registry,
            simplify_requests_total,
            provider_request_duration_seconds,
            provider_errors_total,
            provider_tokens_total,
        })
    }
}

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = Metrics::new()?;
    if METRICS.set(metrics).is_ok() {
        tracing::info!("Prometheus metrics initialized");
    }

    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let metrics = match METRICS.get() {
        Some(m) => m,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Record the outcome of a simplify request.
pub fn record_simplify_request(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.simplify_requests_total.with_label_values(&[outcome]).inc();
    }
}

/// Record upstream model latency.
pub fn record_provider_latency(model: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_request_duration_seconds
            .with_label_values(&[model])
            .observe(duration_secs);
    }
}

/// Record an upstream model error.
pub fn record_provider_error(model: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.provider_errors_total
            .with_label_values(&[model, error_type])
            .inc();
    }
}

/// Record token usage reported by the model.
pub fn record_tokens(model: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(m) = METRICS.get() {
        m.provider_tokens_total
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens.max(0) as u64);
        m.provider_tokens_total
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_outcomes_show_up_in_exposition() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        record_simplify_request("success");
        record_provider_error("gemini-2.5-flash", "rate_limited");
        record_tokens("gemini-2.5-flash", 12, 7);

        let text = get_metrics();
        assert!(text.contains("simplify_requests_total"));
        assert!(text.contains("outcome=\"success\""));
        assert!(text.lines().any(|l| l.starts_with("provider_errors_total{")
            && l.contains("error_type=\"rate_limited\"")
            && l.contains("model=\"gemini-2.5-flash\"")));
        assert!(text
            .lines()
            .any(|l| l.starts_with("provider_tokens_total{") && l.contains("type=\"output\"")));
    }
}
