use clap::Parser;
use sysdig_feishu_relay::{Args, config, http, metrics, signal_handler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Register metrics
    metrics::register_metrics()?;

    // Parse config
    let args = Args::parse();
    let config = config::Config::load(args.config.as_deref())?
        .with_host(args.host)
        .with_port(args.port);

    // Handle signals
    signal_handler()?;

    tracing::info!("Starting sysdig-feishu-relay");

    // Start the HTTP server
    http::create_server(config).await
}
