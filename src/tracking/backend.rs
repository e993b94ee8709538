//! Tracking backend contract and in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded tracking run: tags, metrics and stringified parameter
/// groups, bracketed by start/end timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub experiment: String,
    pub tags: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
    pub params: BTreeMap<String, String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Start-run/end-run bracketed tracking service.
pub trait TrackingBackend {
    fn start_run(&self, experiment: &str) -> Result<String>;
    fn set_tag(&self, run_id: &str, key: &str, value: &str) -> Result<()>;
    fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<()>;
    fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()>;
    fn end_run(&self, run_id: &str) -> Result<()>;
}

/// Local run store for tests and offline experimentation. Clones share the
/// same store, so a test can hold one handle and hand another to the logger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    runs: Arc<Mutex<Vec<RunRecord>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every run recorded so far.
    pub fn runs(&self) -> Vec<RunRecord> {
        self.runs.lock().map(|runs| runs.clone()).unwrap_or_default()
    }

    fn with_run<T>(
        &self,
        run_id: &str,
        apply: impl FnOnce(&mut RunRecord) -> T,
    ) -> Result<T> {
        let mut runs = self
            .runs
            .lock()
            .map_err(|_| anyhow::anyhow!("run store poisoned"))?;
        let run = runs
            .iter_mut()
            .find(|r| r.run_id == run_id)
            .ok_or_else(|| anyhow::anyhow!("unknown run id '{run_id}'"))?;
        Ok(apply(run))
    }
}

impl TrackingBackend for InMemoryBackend {
    fn start_run(&self, experiment: &str) -> Result<String> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut runs = self
            .runs
            .lock()
            .map_err(|_| anyhow::anyhow!("run store poisoned"))?;
        runs.push(RunRecord {
            run_id: run_id.clone(),
            experiment: experiment.to_string(),
            tags: BTreeMap::new(),
            metrics: BTreeMap::new(),
            params: BTreeMap::new(),
            started_at: Utc::now(),
            ended_at: None,
        });
        Ok(run_id)
    }

    fn set_tag(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.with_run(run_id, |run| {
            run.tags.insert(key.to_string(), value.to_string());
        })
    }

    fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<()> {
        self.with_run(run_id, |run| {
            run.metrics.insert(key.to_string(), value);
        })
    }

    fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        self.with_run(run_id, |run| {
            run.params.insert(key.to_string(), value.to_string());
        })
    }

    fn end_run(&self, run_id: &str) -> Result<()> {
        self.with_run(run_id, |run| {
            run.ended_at = Some(Utc::now());
        })
    }
}
