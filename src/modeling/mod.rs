//! Per-zone model runner.
//!
//! For every distinct zone (ascending) the runner clones the model template,
//! splits train/test rows, optionally scales predictors, fits (directly or
//! through grid-search CV), predicts both splits with [0, 1] clipping, and
//! scores per-zone RMSE. Predictions are accumulated row-stacked across
//! zones and realigned with the source tables by row index for one pooled
//! `TOTAL` score per split.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use tracing::info;

use crate::dataset::{zone_split, Dataset};
use crate::metrics::rmse;
use crate::model::{predict_clipped, Regressor};
use crate::scaling::{scale_split, Scaler};
use crate::tracking::{ExperimentLogger, RunReport};

pub mod grid;

pub use grid::{GridSearch, GridSearchOutcome, KFold, ParamGrid};

/// Runner knobs. The missing-value flags describe preprocessing the caller
/// performed upstream; the runner forwards them to the tracker verbatim and
/// does not inspect the data itself.
#[derive(Debug, Clone)]
pub struct ModelingOptions {
    pub scaler: Option<Scaler>,
    pub print_scores: bool,
    pub save_models: bool,
    pub grid_search: bool,
    pub param_grid: Option<ParamGrid>,
    pub cv_folds: usize,
    pub infotext: Option<String>,
    pub nan_removed: bool,
    pub zero_removed: bool,
}

impl Default for ModelingOptions {
    fn default() -> Self {
        Self {
            scaler: None,
            print_scores: true,
            save_models: false,
            grid_search: false,
            param_grid: None,
            cv_folds: 5,
            infotext: None,
            nan_removed: true,
            zero_removed: false,
        }
    }
}

/// Per-zone and pooled scores, plus the fitted models when retention was
/// requested.
pub struct ModelingOutcome {
    /// Train RMSE per `ZONE<id>` label plus `TOTAL`.
    pub trainscore: BTreeMap<String, f64>,
    /// Test RMSE per `ZONE<id>` label plus `TOTAL`.
    pub testscore: BTreeMap<String, f64>,
    pub models: Option<BTreeMap<u32, Box<dyn Regressor>>>,
}

impl std::fmt::Debug for ModelingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelingOutcome")
            .field("trainscore", &self.trainscore)
            .field("testscore", &self.testscore)
            .field(
                "models",
                &self
                    .models
                    .as_ref()
                    .map(|m| m.keys().collect::<Vec<_>>()),
            )
            .finish()
    }
}

/// Trains and scores one model per zone.
///
/// The only defined failure of the runner itself is requesting grid search
/// without a parameter grid; it aborts the whole run before any zone is
/// scored. Everything else (bad columns, incompatible shapes, tracking
/// failures) propagates unchanged from the underlying capabilities.
pub fn run_zone_models(
    data_train: &Dataset,
    data_test: &Dataset,
    features: &[String],
    template: &dyn Regressor,
    logger: Option<&ExperimentLogger>,
    options: &ModelingOptions,
) -> Result<ModelingOutcome> {
    let param_grid = if options.grid_search {
        match &options.param_grid {
            Some(grid) if !grid.is_empty() => Some(grid),
            _ => anyhow::bail!("no parameter grid given for grid search"),
        }
    } else {
        None
    };

    let zones = data_train.zones();
    let mut trainscore = BTreeMap::new();
    let mut testscore = BTreeMap::new();
    let mut models: BTreeMap<u32, Box<dyn Regressor>> = BTreeMap::new();
    let mut train_predictions: Vec<(usize, f64)> = Vec::new();
    let mut test_predictions: Vec<(usize, f64)> = Vec::new();

    for &zone in &zones {
        let (x_train, x_test, y_train, y_test) =
            zone_split(data_train, data_test, zone, features)?;

        let (x_train, x_test) = match options.scaler.clone() {
            Some(mut scaler) => scale_split(&x_train, &x_test, &mut scaler)?,
            None => (x_train, x_test),
        };

        let model: Box<dyn Regressor> = match param_grid {
            Some(grid) => {
                info!(zone, "running grid search");
                let search = GridSearch {
                    grid: grid.clone(),
                    n_folds: options.cv_folds,
                };
                let outcome = search.run(template, &x_train, &y_train)?;
                info!(
                    zone,
                    best_params = %serde_json::to_string(&outcome.best_params)?,
                    cv_rmse = outcome.best_rmse,
                    "grid search complete"
                );
                outcome.model
            }
            None => {
                let mut fresh = template.clone_untrained();
                fresh.fit(&x_train, &y_train)?;
                fresh
            }
        };

        let label = format!("ZONE{zone}");

        let train_pred = predict_clipped(model.as_ref(), &x_train)?;
        trainscore.insert(label.clone(), rmse(&y_train.values, &train_pred.values)?);
        train_predictions.extend(
            train_pred
                .index
                .iter()
                .copied()
                .zip(train_pred.values.iter().copied()),
        );

        let test_pred = predict_clipped(model.as_ref(), &x_test)?;
        testscore.insert(label, rmse(&y_test.values, &test_pred.values)?);
        test_predictions.extend(
            test_pred
                .index
                .iter()
                .copied()
                .zip(test_pred.values.iter().copied()),
        );

        if options.save_models {
            models.insert(zone, model);
        }
    }

    trainscore.insert(
        "TOTAL".to_string(),
        pooled_rmse(data_train, &train_predictions)?,
    );
    testscore.insert(
        "TOTAL".to_string(),
        pooled_rmse(data_test, &test_predictions)?,
    );

    if options.print_scores {
        let mut labels: Vec<String> = zones.iter().map(|z| format!("ZONE{z}")).collect();
        labels.push("TOTAL".to_string());
        for label in &labels {
            info!(
                score = %label,
                train_rmse = format!("{:.3}", trainscore[label]),
                test_rmse = format!("{:.3}", testscore[label]),
                "train-RMSE/test-RMSE"
            );
        }
    }

    if let Some(logger) = logger {
        // the template's name and hyperparameters are logged, not whatever
        // the grid search settled on
        let hyperparameters = Some(template.params()).filter(|p| !p.is_empty());
        for &zone in &zones {
            let label = format!("ZONE{zone}");
            logger.log(&RunReport {
                zone: Some(label.clone()),
                model: Some(template.name().to_string()),
                features: Some(features.to_vec()).filter(|f| !f.is_empty()),
                train_rmse: trainscore.get(&label).copied(),
                test_rmse: testscore.get(&label).copied(),
                nan_removed: options.nan_removed,
                zero_removed: options.zero_removed,
                mean: None,
                hyperparameters: hyperparameters.clone(),
                model_parameters: None,
                scaler: options.scaler.as_ref().map(|s| s.name()),
                info: options.infotext.clone(),
            })?;
        }
    }

    Ok(ModelingOutcome {
        trainscore,
        testscore,
        models: options.save_models.then_some(models),
    })
}

/// Joins accumulated predictions with the true targets on row index and
/// scores them as one pool.
fn pooled_rmse(data: &Dataset, predictions: &[(usize, f64)]) -> Result<f64> {
    let targets: HashMap<usize, f64> = data
        .index
        .iter()
        .copied()
        .zip(data.targets.iter().copied())
        .collect();

    let mut actual = Vec::with_capacity(predictions.len());
    let mut predicted = Vec::with_capacity(predictions.len());
    for (idx, value) in predictions {
        if let Some(target) = targets.get(idx) {
            actual.push(*target);
            predicted.push(*value);
        }
    }
    Ok(rmse(&actual, &predicted)?)
}
