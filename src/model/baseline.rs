//! Mean baseline regressor.

use anyhow::Result;

use super::{Params, Regressor};
use crate::dataset::{FeatureFrame, TargetSeries};

/// Predicts the mean of the training targets for every row. Useful as a
/// sanity baseline when comparing feature subsets.
#[derive(Debug, Clone, Default)]
pub struct MeanRegressor {
    mean: Option<f64>,
}

impl Regressor for MeanRegressor {
    fn name(&self) -> &'static str {
        "MeanRegressor"
    }

    fn params(&self) -> Params {
        Params::new()
    }

    fn clone_untrained(&self) -> Box<dyn Regressor> {
        Box::new(MeanRegressor::default())
    }

    fn with_params(&self, overrides: &Params) -> Result<Box<dyn Regressor>> {
        if let Some(key) = overrides.keys().next() {
            anyhow::bail!("unknown parameter '{key}' for MeanRegressor");
        }
        Ok(self.clone_untrained())
    }

    fn fit(&mut self, _x: &FeatureFrame, y: &TargetSeries) -> Result<()> {
        if y.is_empty() {
            anyhow::bail!("cannot fit on empty target series");
        }
        self.mean = Some(y.values.iter().sum::<f64>() / y.len() as f64);
        Ok(())
    }

    fn predict(&self, x: &FeatureFrame) -> Result<Vec<f64>> {
        let mean = self
            .mean
            .ok_or_else(|| anyhow::anyhow!("model not fitted"))?;
        Ok(vec![mean; x.len()])
    }
}
