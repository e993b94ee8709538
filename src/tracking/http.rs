//! MLflow-style REST backend.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use reqwest::StatusCode;

use super::backend::TrackingBackend;
use crate::config::TrackingConfig;

/// Blocking HTTP client against an MLflow-compatible tracking server.
/// Experiment names are resolved to ids once and cached.
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    experiment_ids: Mutex<HashMap<String, String>>,
}

impl HttpBackend {
    pub fn new(config: &TrackingConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.uri.trim_end_matches('/').to_string(),
            experiment_ids: Mutex::new(HashMap::new()),
        })
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/2.0/mlflow/{path}", self.base_url)
    }

    fn post(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .client
            .post(self.api(path))
            .json(&body)
            .send()?
            .error_for_status()?;
        Ok(response.json()?)
    }

    fn experiment_id(&self, name: &str) -> Result<String> {
        {
            let cache = self
                .experiment_ids
                .lock()
                .map_err(|_| anyhow::anyhow!("experiment cache poisoned"))?;
            if let Some(id) = cache.get(name) {
                return Ok(id.clone());
            }
        }

        let response = self
            .client
            .get(self.api("experiments/get-by-name"))
            .query(&[("experiment_name", name)])
            .send()?;

        let id = if response.status() == StatusCode::NOT_FOUND {
            let created = self.post(
                "experiments/create",
                serde_json::json!({ "name": name }),
            )?;
            created
                .pointer("/experiment_id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("malformed experiments/create response"))?
                .to_string()
        } else {
            let body: serde_json::Value = response.error_for_status()?.json()?;
            body.pointer("/experiment/experiment_id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("malformed experiments/get-by-name response"))?
                .to_string()
        };

        let mut cache = self
            .experiment_ids
            .lock()
            .map_err(|_| anyhow::anyhow!("experiment cache poisoned"))?;
        cache.insert(name.to_string(), id.clone());
        Ok(id)
    }
}

impl TrackingBackend for HttpBackend {
    fn start_run(&self, experiment: &str) -> Result<String> {
        let experiment_id = self.experiment_id(experiment)?;
        let response = self.post(
            "runs/create",
            serde_json::json!({
                "experiment_id": experiment_id,
                "start_time": Utc::now().timestamp_millis(),
            }),
        )?;
        let run_id = response
            .pointer("/run/info/run_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("malformed runs/create response"))?;
        Ok(run_id.to_string())
    }

    fn set_tag(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.post(
            "runs/set-tag",
            serde_json::json!({ "run_id": run_id, "key": key, "value": value }),
        )?;
        Ok(())
    }

    fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<()> {
        self.post(
            "runs/log-metric",
            serde_json::json!({
                "run_id": run_id,
                "key": key,
                "value": value,
                "timestamp": Utc::now().timestamp_millis(),
                "step": 0,
            }),
        )?;
        Ok(())
    }

    fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.post(
            "runs/log-parameter",
            serde_json::json!({ "run_id": run_id, "key": key, "value": value }),
        )?;
        Ok(())
    }

    fn end_run(&self, run_id: &str) -> Result<()> {
        self.post(
            "runs/update",
            serde_json::json!({
                "run_id": run_id,
                "status": "FINISHED",
                "end_time": Utc::now().timestamp_millis(),
            }),
        )?;
        Ok(())
    }
}
