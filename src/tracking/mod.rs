//! Experiment tracking.
//!
//! The [`ExperimentLogger`] records one tracking run per call: categorical
//! metadata as tags, RMSE scores as metrics, and parameter groups as
//! stringified JSON. Absent fields are simply omitted; no "unset" marker is
//! written. The tracking endpoint comes from an injected
//! [`crate::config::TrackingConfig`], never from ambient state.

use anyhow::Result;
use tracing::info;

use crate::config::TrackingConfig;
use crate::model::Params;

pub mod backend;
pub mod http;

pub use backend::{InMemoryBackend, RunRecord, TrackingBackend};
pub use http::HttpBackend;

/// Everything one tracking run may carry. `None` (or an empty collection)
/// means the field is left off the run entirely.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub zone: Option<String>,
    pub model: Option<String>,
    pub features: Option<Vec<String>>,
    pub train_rmse: Option<f64>,
    pub test_rmse: Option<f64>,
    pub nan_removed: bool,
    pub zero_removed: bool,
    pub mean: Option<f64>,
    pub hyperparameters: Option<Params>,
    pub model_parameters: Option<Params>,
    pub scaler: Option<String>,
    pub info: Option<String>,
}

pub struct ExperimentLogger {
    backend: Box<dyn TrackingBackend>,
    experiment: String,
}

impl ExperimentLogger {
    pub fn new(backend: Box<dyn TrackingBackend>, experiment: impl Into<String>) -> Self {
        Self {
            backend,
            experiment: experiment.into(),
        }
    }

    /// Logger against an MLflow-compatible server described by `config`.
    pub fn from_config(config: &TrackingConfig) -> Result<Self> {
        Ok(Self::new(
            Box::new(HttpBackend::new(config)?),
            config.experiment.clone(),
        ))
    }

    /// Records one run. Opens the run, attaches every present field, and
    /// closes it again.
    pub fn log(&self, report: &RunReport) -> Result<()> {
        let run_id = self.backend.start_run(&self.experiment)?;
        info!(%run_id, experiment = %self.experiment, "active tracking run");

        if let Some(zone) = &report.zone {
            self.backend.set_tag(&run_id, "ZONEID", zone)?;
        }
        if let Some(model) = &report.model {
            self.backend.set_tag(&run_id, "Model", model)?;
        }
        if let Some(features) = report.features.as_ref().filter(|f| !f.is_empty()) {
            self.backend
                .set_tag(&run_id, "features", &serde_json::to_string(features)?)?;
            self.backend
                .set_tag(&run_id, "n_features", &features.len().to_string())?;
        }
        if let Some(scaler) = &report.scaler {
            self.backend.set_tag(&run_id, "scaler", scaler)?;
        }
        if let Some(train_rmse) = report.train_rmse {
            self.backend.log_metric(&run_id, "train-RMSE", train_rmse)?;
        }
        if let Some(test_rmse) = report.test_rmse {
            self.backend.log_metric(&run_id, "test-RMSE", test_rmse)?;
        }
        if let Some(mean) = report.mean {
            self.backend.set_tag(&run_id, "mean", &mean.to_string())?;
        }

        let missing_values = serde_json::json!({
            "nan_removed": report.nan_removed,
            "zero_removed": report.zero_removed,
        });
        self.backend
            .log_param(&run_id, "Missing Value Handling", &missing_values.to_string())?;
        if let Some(params) = report.model_parameters.as_ref().filter(|p| !p.is_empty()) {
            self.backend
                .log_param(&run_id, "model parameters", &serde_json::to_string(params)?)?;
        }
        if let Some(params) = report.hyperparameters.as_ref().filter(|p| !p.is_empty()) {
            self.backend
                .log_param(&run_id, "hyperparameter", &serde_json::to_string(params)?)?;
        }

        if let Some(info) = &report.info {
            self.backend.set_tag(&run_id, "info", info)?;
        }

        self.backend.end_run(&run_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_report_logs_one_tag_one_metric() {
        let backend = InMemoryBackend::new();
        let logger = ExperimentLogger::new(Box::new(backend.clone()), "wind-test");

        logger
            .log(&RunReport {
                zone: Some("ZONE1".to_string()),
                test_rmse: Some(0.21),
                nan_removed: true,
                ..RunReport::default()
            })
            .unwrap();

        let runs = backend.runs();
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.tags.len(), 1);
        assert_eq!(run.tags["ZONEID"], "ZONE1");
        assert_eq!(run.metrics.len(), 1);
        assert_eq!(run.metrics["test-RMSE"], 0.21);
        // the missing-value-handling group is always present
        assert_eq!(run.params.len(), 1);
        assert!(run.params["Missing Value Handling"].contains("\"nan_removed\":true"));
        assert!(run.ended_at.is_some());
    }

    #[test]
    fn test_full_report_attaches_every_field() {
        let backend = InMemoryBackend::new();
        let logger = ExperimentLogger::new(Box::new(backend.clone()), "wind-test");

        let mut hyperparameters = Params::new();
        hyperparameters.insert("alpha".to_string(), serde_json::json!(0.5));

        logger
            .log(&RunReport {
                zone: Some("ZONE2".to_string()),
                model: Some("RidgeRegression".to_string()),
                features: Some(vec!["WS100".to_string(), "WS10".to_string()]),
                train_rmse: Some(0.15),
                test_rmse: Some(0.18),
                nan_removed: true,
                zero_removed: false,
                mean: Some(0.42),
                hyperparameters: Some(hyperparameters),
                model_parameters: None,
                scaler: Some("MinMaxScaler".to_string()),
                info: Some("ablation run".to_string()),
            })
            .unwrap();

        let run = &backend.runs()[0];
        assert_eq!(run.tags["Model"], "RidgeRegression");
        assert_eq!(run.tags["n_features"], "2");
        assert_eq!(run.tags["scaler"], "MinMaxScaler");
        assert_eq!(run.tags["mean"], "0.42");
        assert_eq!(run.tags["info"], "ablation run");
        assert_eq!(run.metrics.len(), 2);
        assert!(run.params.contains_key("hyperparameter"));
        assert!(!run.params.contains_key("model parameters"));
    }

    #[test]
    fn test_empty_hyperparameters_are_omitted() {
        let backend = InMemoryBackend::new();
        let logger = ExperimentLogger::new(Box::new(backend.clone()), "wind-test");

        logger
            .log(&RunReport {
                hyperparameters: Some(Params::new()),
                ..RunReport::default()
            })
            .unwrap();

        let run = &backend.runs()[0];
        assert!(run.tags.is_empty());
        assert!(run.metrics.is_empty());
        assert_eq!(run.params.len(), 1);
    }
}
