use clap::Parser;
use std::path::PathBuf;
use tokio::{
    select,
    signal::unix::{SignalKind, signal},
};

pub mod config;
pub mod error;
pub mod feishu;
pub mod http;
pub mod metrics;
pub mod sysdig;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file (optional, every setting has a default)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,
}

/// Handle signals
pub fn signal_handler() -> anyhow::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        select! {
            _ = sigterm.recv() => {
                tracing::info!("SIGTERM received, exiting");
                std::process::exit(0);
            }
            _ = sigint.recv() => {
                tracing::info!("SIGINT received, exiting");
                std::process::exit(0);
            }
        }
    });

    Ok(())
}
