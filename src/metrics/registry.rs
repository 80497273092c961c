// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, HistogramVec, Opts, Registry, TextEncoder, Encoder,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // AUTHORIZATION METRICS
    // ============================================================================

    /// Authorization endpoint round-trips
    pub static ref AUTH_REQUESTS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("auth_requests_total", "Total authorization endpoint requests"),
        &["outcome"], // outcome: success, transport, http_status, auth_decode
        REGISTRY
    ).unwrap();

    /// Credential store lookups
    pub static ref TOKEN_CACHE_LOOKUPS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("token_cache_lookups_total", "Total access token cache lookups"),
        &["result"], // result: hit, miss
        REGISTRY
    ).unwrap();

    // ============================================================================
    // TRANSLATION API METRICS
    // ============================================================================

    /// Translation API calls
    pub static ref API_CALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("api_calls_total", "Total translation API calls"),
        &["endpoint", "status"],
        REGISTRY
    ).unwrap();

    /// Translation API call duration
    pub static ref API_CALL_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        prometheus::HistogramOpts::new("api_call_duration_seconds", "Translation API call duration")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["endpoint"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        AUTH_REQUESTS.with_label_values(&["success"]).inc_by(0.0);
        TOKEN_CACHE_LOOKUPS.with_label_values(&["hit"]).inc_by(0.0);
        API_CALLS.with_label_values(&["Translate", "200"]).inc_by(0.0);
        API_CALL_DURATION.with_label_values(&["Translate"]).observe(0.0);

        let metrics = gather_metrics();
        assert!(metrics.contains("auth_requests_total"));
        assert!(metrics.contains("token_cache_lookups_total"));
        assert!(metrics.contains("api_calls_total"));
        assert!(metrics.contains("api_call_duration_seconds"));
    }
}
