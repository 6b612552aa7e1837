use crate::{
    config::{Auth, Config, Http},
    error::RelayError,
    feishu::{Feishu, card::Message},
    metrics::{self, Status},
    sysdig::Notification,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use hyper::StatusCode;
use serde_json::{Value, json};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

/// Header carrying the shared secret
pub const BASE_KEY_HEADER: &str = "base_key";

/// Immutable state shared by every request
#[derive(Clone)]
pub struct AppState {
    auth: Arc<Auth>,
    feishu: Arc<Feishu>,
}

impl AppState {
    /// Create the shared state from the loaded configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            auth: Arc::new(config.auth.clone()),
            feishu: Arc::new(Feishu::new(&config.relay)?),
        })
    }
}

/// Creates an Axum Web Server
pub async fn create_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting the web server");

    anyhow::ensure!(
        config.http.hook_path.starts_with('/'),
        "Hook path must start with '/': {}",
        config.http.hook_path
    );

    if !config.auth.enabled() {
        tracing::warn!("No shared secret configured, the relay endpoint is open");
    }

    let state = AppState::new(&config)?;
    let app = create_router(&config.http, state);

    let host: IpAddr = config.http.host.parse()?;
    let addr = SocketAddr::new(host, config.http.port);

    tracing::info!("Listening on {}", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}

/// Create the router for the application
pub fn create_router(http: &Http, state: AppState) -> Router {
    let body_limit = match http.body_limit_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/alive", get(alive))
        .route("/metrics", get(metrics))
        .route(&http.hook_path, post(forward).layer(body_limit))
        .with_state(state)
}

/// This is the handler for the /alive path
async fn alive() -> StatusCode {
    metrics::http::record_http_request("/alive");
    let _timer = metrics::http::http_request_timer("/alive");

    StatusCode::OK
}

/// This is the handler for the /metrics path
#[tracing::instrument]
async fn metrics() -> impl IntoResponse {
    metrics::http::record_http_request("/metrics");
    let _timer = metrics::http::http_request_timer("/metrics");

    match metrics::render() {
        Some(body) => (StatusCode::OK, body),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to get the metrics handle".to_string(),
        ),
    }
}

/// This is the handler for the Sysdig notification path
#[tracing::instrument(skip_all)]
async fn forward(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, RelayError> {
    metrics::http::record_http_request("relay");
    let _timer = metrics::http::http_request_timer("relay");

    match relay(&state, &headers, &body).await {
        Ok(()) => {
            metrics::relay::record_relay(Status::Success);
            metrics::relay::record_successful_relay();

            Ok(Json(json!({ "result": "success" })))
        }
        Err(e) => {
            metrics::relay::record_relay(Status::Failure);
            metrics::relay::record_relay_error(&e);

            Err(e)
        }
    }
}

/// Authorize, decode, render and relay a single notification
async fn relay(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), RelayError> {
    let presented = headers.get(BASE_KEY_HEADER).map(|value| value.as_bytes());

    if !state.auth.authorize(presented) {
        tracing::warn!("Rejected notification with missing or invalid BASE_KEY");
        return Err(RelayError::Unauthorized);
    }

    let notification = Notification::from_slice(body)
        .inspect_err(|e| tracing::error!("fail to read json body: {}", e))?;

    let Some(webhook) = notification.webhook() else {
        let error = RelayError::MissingWebhook;
        tracing::error!("{}", error);
        return Err(error);
    };

    let message = Message::from_alert(&notification.alert);
    state.feishu.send(webhook, &message).await?;

    Ok(())
}
