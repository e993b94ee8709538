use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tracking: TrackingConfig,
}

/// Tracking endpoint and experiment name, owned by the caller and injected
/// into [`crate::tracking::ExperimentLogger`] explicitly. Nothing is read
/// from hidden files at import time.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    pub uri: String,
    pub experiment: String,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

fn default_http_timeout() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("WINDCAST__").split("__"));
        Ok(figment.extract()?)
    }
}
