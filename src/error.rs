use axum::{
    Json,
    response::{IntoResponse, Response},
};
use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Every way a relay request can end short of success.
///
/// None of these are retried: the caller gets the status and the error is logged.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A shared secret is configured and the `BASE_KEY` header did not match it.
    #[error("missing or invalid BASE_KEY header")]
    Unauthorized,

    /// The request body is not a Sysdig notification.
    #[error("fail to read json body: {0}")]
    Decode(#[from] serde_json::Error),

    /// `customData.webhook` was absent or empty.
    #[error("can not find webhook endpoint")]
    MissingWebhook,

    /// The Feishu webhook could not be reached.
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The Feishu webhook answered with something other than 200.
    #[error("webhook responded with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

impl RelayError {
    /// HTTP status returned to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Decode(_) | Self::MissingWebhook => StatusCode::BAD_REQUEST,
            Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }

    /// Label used for the `relay_errors_total` metric
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Decode(_) => "decode",
            Self::MissingWebhook => "missing_webhook",
            Self::Transport(_) => "transport",
            Self::Rejected { .. } => "rejected",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            Self::Unauthorized => (
                status,
                Json(json!({ "result": "failed", "code": "Unauthorized" })),
            )
                .into_response(),
            // The upstream status is mirrored without a body
            Self::Rejected { .. } => status.into_response(),
            error => {
                let code = match status {
                    StatusCode::BAD_REQUEST => "BadRequest",
                    _ => "InternalServerError",
                };

                (
                    status,
                    Json(json!({
                        "result": "failed",
                        "code": code,
                        "error": error.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
