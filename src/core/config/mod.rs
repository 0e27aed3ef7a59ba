use std::path::Path;
use std::time::Duration;
use std::{env, fs};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// One configured lookup: which SKU to price, where, and in what currency.
/// Defined once at startup and re-enqueued unchanged on every tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    #[validate(length(min = 1))]
    pub currency_code: String,

    /// Azure region name, e.g. `eastus`.
    #[validate(length(min = 1))]
    pub location: String,

    /// SKU name registered in Azure, e.g. `Standard_B2ms`.
    #[validate(length(min = 1))]
    pub arm_sku_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Number of concurrent price lookup workers; also the depth of the
    /// job and result channels.
    #[validate(range(min = 1))]
    pub concurrency_level: usize,

    #[validate(range(exclusive_min = 0.0))]
    pub interval_in_minutes: f64,

    #[validate(length(min = 1), nested)]
    pub resolve_prices_for: Vec<PriceQuery>,

    /// Stamped at load time, echoed back on `GET /config`.
    #[serde(default)]
    pub timestamp: String,
}

impl AppConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_in_minutes * 60.0)
    }
}

/// Loads the config file named by `CONFIG_PATH` (default `config.json`).
pub fn load() -> Result<AppConfig> {
    let path = env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    debug!("loading configuration from {path}");
    load_from_path(Path::new(&path))
}

pub fn load_from_path(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let mut config: AppConfig =
        serde_json::from_str(&raw).context("parsing config file as JSON")?;
    config.timestamp = Utc::now().to_rfc3339();
    config
        .validate()
        .with_context(|| format!("validating config file {}", path.display()))?;
    Ok(config)
}
