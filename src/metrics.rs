//! Scoring metrics for model evaluation.

/// Metric calculation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetricsError {
    #[error("dimension mismatch: actual={actual}, predicted={predicted}")]
    DimensionMismatch { actual: usize, predicted: usize },

    #[error("empty data provided")]
    EmptyData,
}

/// Root mean square error between actual and predicted values.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, MetricsError> {
    if actual.len() != predicted.len() {
        return Err(MetricsError::DimensionMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(MetricsError::EmptyData);
    }

    let n = actual.len() as f64;
    let mse = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;
    Ok(mse.sqrt())
}
