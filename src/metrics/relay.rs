use crate::{
    error::RelayError,
    metrics::{Status, Timer},
};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

pub(super) fn register_metrics() {
    // Labeled by status: success or failure
    describe_counter!(
        "relay_requests_total",
        "Alert notifications handled by the relay"
    );

    // Labeled by kind: unauthorized, decode, missing_webhook, transport or rejected
    describe_counter!(
        "relay_errors_total",
        "Alert notifications that were not relayed"
    );

    describe_histogram!(
        "relay_upstream_duration_seconds",
        "Time spent waiting on the bot webhook"
    );

    describe_gauge!(
        "last_successful_relay_timestamp",
        "Unix time of the last notification accepted by a bot webhook"
    );
}

/// Count a handled notification
pub fn record_relay(status: Status) {
    counter!("relay_requests_total", "status" => status.to_string()).increment(1);
}

/// Count a notification that was not relayed, by failure kind
pub fn record_relay_error(error: &RelayError) {
    counter!("relay_errors_total", "kind" => error.kind()).increment(1);
}

/// Stamp the time of the last successful relay
pub fn record_successful_relay() {
    gauge!("last_successful_relay_timestamp").set(chrono::Utc::now().timestamp() as f64);
}

/// Time the outbound webhook call
pub fn upstream_timer() -> Timer {
    Timer::start(histogram!("relay_upstream_duration_seconds"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_failures_are_counted_by_kind() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_relay(Status::Success);
            record_relay(Status::Failure);
            record_relay(Status::Failure);
            record_relay(Status::Failure);
            record_relay_error(&RelayError::Unauthorized);
            record_relay_error(&RelayError::MissingWebhook);
            record_relay_error(&RelayError::Rejected {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            });
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"relay_requests_total{status="success"} 1"#));
        assert!(rendered.contains(r#"relay_requests_total{status="failure"} 3"#));
        assert!(rendered.contains(r#"relay_errors_total{kind="unauthorized"} 1"#));
        assert!(rendered.contains(r#"relay_errors_total{kind="missing_webhook"} 1"#));
        assert!(rendered.contains(r#"relay_errors_total{kind="rejected"} 1"#));
        assert!(!rendered.contains(r#"kind="transport""#));
    }

    #[test]
    fn test_upstream_timer_records_on_drop() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            drop(upstream_timer());
        });

        assert!(handle.render().contains("relay_upstream_duration_seconds_count 1"));
    }
}
