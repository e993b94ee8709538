//! Linear model wrappers around smartcore.

use anyhow::Result;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use smartcore::linear::ridge_regression::{RidgeRegression, RidgeRegressionParameters};

use super::{to_matrix, Params, Regressor};
use crate::dataset::{FeatureFrame, TargetSeries};

/// Ordinary least squares regression.
#[derive(Debug, Default)]
pub struct OlsRegressor {
    fitted: Option<LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>>,
}

impl Regressor for OlsRegressor {
    fn name(&self) -> &'static str {
        "LinearRegression"
    }

    fn params(&self) -> Params {
        Params::new()
    }

    fn clone_untrained(&self) -> Box<dyn Regressor> {
        Box::new(OlsRegressor::default())
    }

    fn with_params(&self, overrides: &Params) -> Result<Box<dyn Regressor>> {
        if let Some(key) = overrides.keys().next() {
            anyhow::bail!("unknown parameter '{key}' for LinearRegression");
        }
        Ok(self.clone_untrained())
    }

    fn fit(&mut self, x: &FeatureFrame, y: &TargetSeries) -> Result<()> {
        let x_matrix = to_matrix(x)?;
        let model =
            LinearRegression::fit(&x_matrix, &y.values, LinearRegressionParameters::default())
                .map_err(|e| anyhow::anyhow!("linear regression fit failed: {e}"))?;
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

/// Ridge regression with a tunable `alpha` penalty.
#[derive(Debug)]
pub struct RidgeRegressor {
    pub alpha: f64,
    fitted: Option<RidgeRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>>,
}

impl RidgeRegressor {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            fitted: None,
        }
    }
}

impl Default for RidgeRegressor {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Regressor for RidgeRegressor {
    fn name(&self) -> &'static str {
        "RidgeRegression"
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert("alpha".to_string(), serde_json::json!(self.alpha));
        params
    }

    fn clone_untrained(&self) -> Box<dyn Regressor> {
        Box::new(RidgeRegressor::new(self.alpha))
    }

    fn with_params(&self, overrides: &Params) -> Result<Box<dyn Regressor>> {
        let mut alpha = self.alpha;
        for (key, value) in overrides {
            match key.as_str() {
                "alpha" => {
                    alpha = value
                        .as_f64()
                        .ok_or_else(|| anyhow::anyhow!("parameter 'alpha' must be numeric"))?;
                }
                other => anyhow::bail!("unknown parameter '{other}' for RidgeRegression"),
            }
        }
        Ok(Box::new(RidgeRegressor::new(alpha)))
    }

    fn fit(&mut self, x: &FeatureFrame, y: &TargetSeries) -> Result<()> {
        let x_matrix = to_matrix(x)?;
        let params = RidgeRegressionParameters::default().with_alpha(self.alpha);
        let model = RidgeRegression::fit(&x_matrix, &y.values, params)
            .map_err(|e| anyhow::anyhow!("ridge regression fit failed: {e}"))?;
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
