//! Exhaustive hyperparameter grid search with k-fold cross-validation.

use std::collections::BTreeMap;

use anyhow::Result;
use itertools::Itertools;
use tracing::debug;

use crate::dataset::{FeatureFrame, TargetSeries};
use crate::metrics::rmse;
use crate::model::{Params, Regressor};

/// Candidate values per hyperparameter name.
pub type ParamGrid = BTreeMap<String, Vec<serde_json::Value>>;

/// Contiguous k-fold splitter (no shuffling; rows are already grouped by
/// zone and ordered by timestamp).
pub struct KFold {
    pub n_folds: usize,
}

impl KFold {
    /// Returns `(train_positions, validation_positions)` per fold, or an
    /// empty vec when there is not enough data to split.
    pub fn split(&self, data_len: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        if self.n_folds < 2 || data_len < self.n_folds {
            return Vec::new();
        }

        let base = data_len / self.n_folds;
        let remainder = data_len % self.n_folds;
        let mut folds = Vec::with_capacity(self.n_folds);
        let mut start = 0;

        for fold in 0..self.n_folds {
            let size = base + usize::from(fold < remainder);
            let end = start + size;
            let validation: Vec<usize> = (start..end).collect();
            let train: Vec<usize> = (0..start).chain(end..data_len).collect();
            folds.push((train, validation));
            start = end;
        }

        folds
    }
}

/// Exhaustive grid search minimizing cross-validated RMSE, refitting the
/// best configuration on the full training data.
pub struct GridSearch {
    pub grid: ParamGrid,
    pub n_folds: usize,
}

pub struct GridSearchOutcome {
    pub model: Box<dyn Regressor>,
    pub best_params: Params,
    pub best_rmse: f64,
}

impl std::fmt::Debug for GridSearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSearchOutcome")
            .field("model", &self.model.name())
            .field("best_params", &self.best_params)
            .field("best_rmse", &self.best_rmse)
            .finish()
    }
}

impl GridSearch {
    /// Cartesian product of the grid's candidate values.
    pub fn candidates(&self) -> Vec<Params> {
        if self.grid.is_empty() {
            return Vec::new();
        }
        let keys: Vec<&String> = self.grid.keys().collect();
        self.grid
            .values()
            .map(|values| values.iter())
            .multi_cartesian_product()
            .map(|combo| {
                keys.iter()
                    .zip(combo)
                    .map(|(key, value)| ((*key).clone(), value.clone()))
                    .collect()
            })
            .collect()
    }

    pub fn run(
        &self,
        template: &dyn Regressor,
        x: &FeatureFrame,
        y: &TargetSeries,
    ) -> Result<GridSearchOutcome> {
        let candidates = self.candidates();
        if candidates.is_empty() {
            anyhow::bail!("no parameter grid given for grid search");
        }

        let folds = KFold {
            n_folds: self.n_folds,
        }
        .split(x.len());
        if folds.is_empty() {
            anyhow::bail!(
                "not enough rows ({}) for {}-fold cross-validation",
                x.len(),
                self.n_folds
            );
        }

        let mut best: Option<(Params, f64)> = None;
        for candidate in candidates {
            let configured = template.with_params(&candidate)?;
            let mut fold_scores = Vec::with_capacity(folds.len());
            for (train_positions, val_positions) in &folds {
                let mut model = configured.clone_untrained();
                model.fit(&x.take(train_positions), &y.take(train_positions))?;
                let predicted = model.predict(&x.take(val_positions))?;
                let actual = y.take(val_positions);
                fold_scores.push(rmse(&actual.values, &predicted)?);
            }
            let cv_rmse = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
            debug!(
                params = %serde_json::to_string(&candidate)?,
                cv_rmse,
                "grid search candidate"
            );
            if best.as_ref().map_or(true, |(_, current)| cv_rmse < *current) {
                best = Some((candidate, cv_rmse));
            }
        }

        let (best_params, best_rmse) =
            best.ok_or_else(|| anyhow::anyhow!("grid search produced no candidates"))?;
        let mut model = template.with_params(&best_params)?;
        model.fit(x, y)?;
        Ok(GridSearchOutcome {
            model,
            best_params,
            best_rmse,
        })
    }
}
