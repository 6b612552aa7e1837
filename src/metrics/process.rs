use metrics::{describe_gauge, gauge};

/// Describe and set the gauges that are fixed for the life of the process
pub(super) fn register_metrics() {
    describe_gauge!(
        "process_start_time_seconds",
        "Unix time the relay started at"
    );
    describe_gauge!("build_info", "Always 1, labeled with the relay version");

    gauge!("process_start_time_seconds").set(chrono::Utc::now().timestamp_millis() as f64 / 1000.0);
    gauge!("build_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}
