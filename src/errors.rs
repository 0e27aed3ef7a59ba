use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Failure modes of a single price lookup. Nothing here is fatal to the
/// process; the pipeline logs and moves on, and the next tick retries
/// implicitly.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid price query: {0}")]
    Validation(String),

    #[error("azure pricing api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("azure pricing api returned status {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("failed to parse azure pricing response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unable to find prices for '{arm_sku_name}' for '{location}' in currency '{currency_code}'")]
    NoMatchingPrices {
        currency_code: String,
        location: String,
        arm_sku_name: String,
    },
}

impl ResolveError {
    /// An empty result is expected noise (e.g. every record filtered out)
    /// and is logged at a lower severity than transport or parse failures.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ResolveError::NoMatchingPrices { .. })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

/// Helper for mapping any unknown error into internal error
pub fn internal_error<E: ToString>(err: E) -> AppError {
    AppError::InternalServerError(err.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // String provided by thiserror → safe JSON message
        let body = Json(json!({
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
