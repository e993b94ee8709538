//! Regressor capability contract and smartcore-backed implementations.
//!
//! A [`Regressor`] is anything that can be cloned into an untrained copy,
//! fitted on one zone's predictors, and asked for predictions and its
//! hyperparameters. One independent instance exists per zone per run.

use std::collections::BTreeMap;

use anyhow::Result;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::dataset::{FeatureFrame, TargetSeries};

pub mod baseline;
pub mod forest;
pub mod linear;

pub use baseline::MeanRegressor;
pub use forest::ForestRegressor;
pub use linear::{OlsRegressor, RidgeRegressor};

/// Hyperparameter mapping, serialized into tracking runs as-is.
pub type Params = BTreeMap<String, serde_json::Value>;

pub trait Regressor {
    /// Model class name, used as the tracking tag.
    fn name(&self) -> &'static str;

    /// Current hyperparameters.
    fn params(&self) -> Params;

    /// Independent, identically configured, untrained copy.
    fn clone_untrained(&self) -> Box<dyn Regressor>;

    /// Untrained copy with hyperparameter overrides applied. Unknown
    /// parameter names are an error.
    fn with_params(&self, overrides: &Params) -> Result<Box<dyn Regressor>>;

    fn fit(&mut self, x: &FeatureFrame, y: &TargetSeries) -> Result<()>;

    fn predict(&self, x: &FeatureFrame) -> Result<Vec<f64>>;
}

/// Clips a raw prediction to the closed unit interval. Power output is a
/// normalized capacity factor, so values outside [0, 1] are not physical.
pub fn clip_unit(value: f64) -> f64 {
    if value >= 1.0 {
        1.0
    } else if value <= 0.0 {
        0.0
    } else {
        value
    }
}

/// Predicts on a split, clips to [0, 1], and keeps the split's row index.
pub fn predict_clipped(model: &dyn Regressor, x: &FeatureFrame) -> Result<TargetSeries> {
    let raw = model.predict(x)?;
    Ok(TargetSeries {
        index: x.index.clone(),
        values: raw.into_iter().map(clip_unit).collect(),
    })
}

/// Converts a feature frame to the smartcore matrix type.
pub(crate) fn to_matrix(x: &FeatureFrame) -> Result<DenseMatrix<f64>> {
    DenseMatrix::from_2d_vec(&x.rows)
        .map_err(|e| anyhow::anyhow!("matrix conversion failed: {e}"))
}
