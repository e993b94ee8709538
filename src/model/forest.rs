//! Random forest wrapper around smartcore.

use anyhow::Result;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::{to_matrix, Params, Regressor};
use crate::dataset::{FeatureFrame, TargetSeries};

/// Random forest regressor with conservative defaults. Depth is capped to
/// keep memory bounded on small training hosts.
#[derive(Debug)]
pub struct ForestRegressor {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    fitted: Option<RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>>,
}

impl ForestRegressor {
    pub fn new(n_trees: usize, max_depth: Option<usize>, min_samples_split: usize) -> Self {
        Self {
            n_trees,
            max_depth,
            min_samples_split,
            min_samples_leaf: 2,
            fitted: None,
        }
    }

    fn smartcore_parameters(&self) -> RandomForestRegressorParameters {
        RandomForestRegressorParameters {
            max_depth: self.max_depth.map(|d| d as u16),
            min_samples_leaf: self.min_samples_leaf,
            min_samples_split: self.min_samples_split,
            n_trees: self.n_trees,
            m: None, // sqrt(n_features)
            keep_samples: false,
            seed: 42,
        }
    }
}

impl Default for ForestRegressor {
    fn default() -> Self {
        Self::new(50, Some(10), 5)
    }
}

impl Regressor for ForestRegressor {
    fn name(&self) -> &'static str {
        "RandomForestRegressor"
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert("n_trees".to_string(), serde_json::json!(self.n_trees));
        params.insert("max_depth".to_string(), serde_json::json!(self.max_depth));
        params.insert(
            "min_samples_split".to_string(),
            serde_json::json!(self.min_samples_split),
        );
        params
    }

    fn clone_untrained(&self) -> Box<dyn Regressor> {
        Box::new(ForestRegressor::new(
            self.n_trees,
            self.max_depth,
            self.min_samples_split,
        ))
    }

    fn with_params(&self, overrides: &Params) -> Result<Box<dyn Regressor>> {
        let mut n_trees = self.n_trees;
        let mut max_depth = self.max_depth;
        let mut min_samples_split = self.min_samples_split;
        for (key, value) in overrides {
            match key.as_str() {
                "n_trees" => {
                    n_trees = value
                        .as_u64()
                        .ok_or_else(|| anyhow::anyhow!("parameter 'n_trees' must be an integer"))?
                        as usize;
                }
                "max_depth" => {
                    max_depth = match value {
                        serde_json::Value::Null => None,
                        other => Some(other.as_u64().ok_or_else(|| {
                            anyhow::anyhow!("parameter 'max_depth' must be an integer or null")
                        })? as usize),
                    };
                }
                "min_samples_split" => {
                    min_samples_split = value.as_u64().ok_or_else(|| {
                        anyhow::anyhow!("parameter 'min_samples_split' must be an integer")
                    })? as usize;
                }
                other => anyhow::bail!("unknown parameter '{other}' for RandomForestRegressor"),
            }
        }
        Ok(Box::new(ForestRegressor::new(
            n_trees,
            max_depth,
            min_samples_split,
        )))
    }

    fn fit(&mut self, x: &FeatureFrame, y: &TargetSeries) -> Result<()> {
        let x_matrix = to_matrix(x)?;
        let model = RandomForestRegressor::fit(&x_matrix, &y.values, self.smartcore_parameters())
            .map_err(|e| anyhow::anyhow!("random forest fit failed: {e}"))?;
        self.fitted = Some(model);
        Ok(())
    }

    fn predict(&self, x: &FeatureFrame) -> Result<Vec<f64>> {
        let model = self
            .fitted
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("model not fitted"))?;
        model
            .predict(&to_matrix(x)?)
            .map_err(|e| anyhow::anyhow!("prediction failed: {e}"))
    }
}
