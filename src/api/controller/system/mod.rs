//! System controller: welcome, probes, and the loaded configuration

use axum::extract::State;
use axum::Json;

use crate::api::dto::Welcome;
use crate::app_state::AppState;
use crate::core::config::AppConfig;

pub struct SystemController;

impl SystemController {
    pub async fn welcome() -> Json<Welcome> {
        Json(Welcome {
            message: "hello from azure-pricing-exporter".to_string(),
        })
    }

    /// Liveness probe.
    pub async fn live() -> &'static str {
        "OK"
    }

    /// Readiness probe. Config is loaded before the listener starts, so a
    /// serving process is a ready process.
    pub async fn ready() -> &'static str {
        "OK"
    }

    pub async fn config(State(state): State<AppState>) -> Json<AppConfig> {
        Json(state.config.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn welcome_returns_the_exporter_greeting() {
        let Json(body) = SystemController::welcome().await;
        assert_eq!(body.message, "hello from azure-pricing-exporter");
    }
}
