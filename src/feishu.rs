use crate::{config::Relay as RelayConfig, error::RelayError, feishu::card::Message, metrics};
use hyper::StatusCode;
use std::time::Duration;

pub mod card;

pub struct Feishu {
    client: reqwest::Client,
}

impl Feishu {
    /// Create a new Feishu relay client
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Post a card to a bot webhook, returning the webhook's response body.
    ///
    /// The webhook URL holds the bot token and must not reach spans or errors.
    #[tracing::instrument(skip_all)]
    pub async fn send(&self, webhook: &str, message: &Message) -> Result<String, RelayError> {
        let _timer = metrics::relay::upstream_timer();

        let response = self
            .client
            .post(webhook)
            .json(message)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .inspect_err(|e| tracing::error!("Failed to reach webhook: {}", e))?;

        let status = response.status();

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .map_err(reqwest::Error::without_url)
                .inspect_err(|e| tracing::warn!("Failed to read webhook response: {}", e))
                .unwrap_or_default();
            tracing::info!("{}", body);
            tracing::warn!("Webhook responded with HTTP {}", status);

            return Err(RelayError::Rejected { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .inspect_err(|e| tracing::error!("Failed to read webhook response: {}", e))?;
        tracing::info!("{}", body);

        Ok(body)
    }
}
