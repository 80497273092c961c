// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics,
    AUTH_REQUESTS,
    TOKEN_CACHE_LOOKUPS,
    API_CALLS,
    API_CALL_DURATION,
};

/// Helper to record an authorization round-trip
pub fn record_auth_request(outcome: &str) {
    AUTH_REQUESTS.with_label_values(&[outcome]).inc();
}

/// Helper to record credential store lookups
pub fn record_token_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    TOKEN_CACHE_LOOKUPS.with_label_values(&[result]).inc();
}

/// Helper to record translation API call metrics.
///
/// `status` is the HTTP status code, or `transport` when none was received.
pub fn record_api_call(endpoint: &str, status: Option<u16>, duration_secs: f64) {
    let status = status.map_or_else(|| "transport".to_string(), |s| s.to_string());
    API_CALLS.with_label_values(&[endpoint, &status]).inc();

    API_CALL_DURATION
        .with_label_values(&[endpoint])
        .observe(duration_secs);
}
