use crate::metrics::Timer;
use metrics::{counter, describe_counter, describe_histogram, histogram};

pub(super) fn register_metrics() {
    // Labeled by endpoint: /alive, /metrics or relay
    describe_counter!("http_requests_total", "Requests served, per endpoint");
    describe_histogram!(
        "http_request_duration_seconds",
        "Time spent answering a request, per endpoint"
    );
}

/// Count a request to an endpoint
pub fn record_http_request(endpoint: &'static str) {
    counter!("http_requests_total", "endpoint" => endpoint).increment(1);
}

/// Time a request to an endpoint
pub fn http_request_timer(endpoint: &'static str) -> Timer {
    Timer::start(histogram!("http_request_duration_seconds", "endpoint" => endpoint))
}
