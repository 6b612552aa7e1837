use metrics::Histogram;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Instant;

pub mod http;
pub mod process;
pub mod relay;

pub static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder and describe the metrics for the application
pub fn register_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Metrics recorder already registered"))?;

    http::register_metrics();
    relay::register_metrics();
    process::register_metrics();

    Ok(())
}

/// Render the current metrics in the Prometheus text format
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

#[derive(Debug, Clone, Copy)]
pub enum Status {
    Success,
    Failure,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Failure => write!(f, "failure"),
        }
    }
}

/// Records the time until it is dropped into a histogram
pub struct Timer {
    histogram: Histogram,
    start_time: Instant,
}

impl Timer {
    /// Start timing into the given histogram
    pub fn start(histogram: Histogram) -> Self {
        Self {
            histogram,
            start_time: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.histogram.record(self.start_time.elapsed());
    }
}
