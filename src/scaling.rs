//! Predictor scaling strategies.
//!
//! A [`Scaler`] is fitted on the training predictors only and then applied to
//! both splits, so test data never leaks into the fit statistics. The two
//! variants each carry their own diagnostic summary: min/max for min-max
//! scaling, mean/std for standardization.

use anyhow::Result;
use strum::Display;
use tracing::info;

use crate::dataset::FeatureFrame;

/// Min-max scaler mapping each training column onto [0, 1].
#[derive(Debug, Clone, Default)]
pub struct MinMaxScaler {
    stats: Option<(Vec<f64>, Vec<f64>)>,
}

impl MinMaxScaler {
    fn fit(&mut self, x: &FeatureFrame) {
        let n_cols = x.columns.len();
        let mut mins = vec![f64::INFINITY; n_cols];
        let mut maxs = vec![f64::NEG_INFINITY; n_cols];
        for row in &x.rows {
            for (j, value) in row.iter().enumerate() {
                mins[j] = mins[j].min(*value);
                maxs[j] = maxs[j].max(*value);
            }
        }
        self.stats = Some((mins, maxs));
    }

    fn transform(&self, x: &FeatureFrame) -> Result<FeatureFrame> {
        let (mins, maxs) = self
            .stats
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("scaler not fitted"))?;
        if x.columns.len() != mins.len() {
            anyhow::bail!(
                "column count mismatch: fitted on {}, got {}",
                mins.len(),
                x.columns.len()
            );
        }
        let rows = x
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(mins.iter().zip(maxs.iter()))
                    .map(|(v, (min, max))| {
                        if (max - min).abs() < 1e-10 {
                            0.5 // constant column
                        } else {
                            (v - min) / (max - min)
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(FeatureFrame {
            index: x.index.clone(),
            columns: x.columns.clone(),
            rows,
        })
    }
}

/// Z-score scaler standardizing each training column to mean 0, std 1.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    stats: Option<(Vec<f64>, Vec<f64>)>,
}

impl StandardScaler {
    fn fit(&mut self, x: &FeatureFrame) {
        let n_cols = x.columns.len();
        let n = x.rows.len().max(1) as f64;
        let mut means = vec![0.0; n_cols];
        for row in &x.rows {
            for (j, value) in row.iter().enumerate() {
                means[j] += value / n;
            }
        }
        let mut stds = vec![0.0; n_cols];
        for row in &x.rows {
            for (j, value) in row.iter().enumerate() {
                stds[j] += (value - means[j]).powi(2) / n;
            }
        }
        for std in &mut stds {
            *std = std.sqrt();
        }
        self.stats = Some((means, stds));
    }

    fn transform(&self, x: &FeatureFrame) -> Result<FeatureFrame> {
        let (means, stds) = self
            .stats
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("scaler not fitted"))?;
        if x.columns.len() != means.len() {
            anyhow::bail!(
                "column count mismatch: fitted on {}, got {}",
                means.len(),
                x.columns.len()
            );
        }
        let rows = x
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(means.iter().zip(stds.iter()))
                    .map(|(v, (mean, std))| {
                        if std.abs() < 1e-10 {
                            0.0 // constant column
                        } else {
                            (v - mean) / std
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(FeatureFrame {
            index: x.index.clone(),
            columns: x.columns.clone(),
            rows,
        })
    }
}

/// Closed set of scaling strategies. The display name matches the
/// conventional scaler names used in experiment tracking tags.
#[derive(Debug, Clone, Display)]
pub enum Scaler {
    #[strum(serialize = "MinMaxScaler")]
    MinMax(MinMaxScaler),
    #[strum(serialize = "StandardScaler")]
    Standard(StandardScaler),
}

impl Scaler {
    pub fn min_max() -> Self {
        Scaler::MinMax(MinMaxScaler::default())
    }

    pub fn standard() -> Self {
        Scaler::Standard(StandardScaler::default())
    }

    pub fn name(&self) -> String {
        self.to_string()
    }

    pub fn fit_transform(&mut self, x: &FeatureFrame) -> Result<FeatureFrame> {
        match self {
            Scaler::MinMax(scaler) => {
                scaler.fit(x);
                scaler.transform(x)
            }
            Scaler::Standard(scaler) => {
                scaler.fit(x);
                scaler.transform(x)
            }
        }
    }

    pub fn transform(&self, x: &FeatureFrame) -> Result<FeatureFrame> {
        match self {
            Scaler::MinMax(scaler) => scaler.transform(x),
            Scaler::Standard(scaler) => scaler.transform(x),
        }
    }

    fn log_summary(&self, x_train: &FeatureFrame, x_test: &FeatureFrame) {
        match self {
            Scaler::MinMax(_) => {
                let (train_min, train_max) = frame_min_max(x_train);
                let (test_min, test_max) = frame_min_max(x_test);
                info!(
                    scaler = %self,
                    train_min = format!("{train_min:.2}"),
                    train_max = format!("{train_max:.2}"),
                    test_min = format!("{test_min:.2}"),
                    test_max = format!("{test_max:.2}"),
                    "scaled predictor summary"
                );
            }
            Scaler::Standard(_) => {
                let (train_mean, train_std) = frame_mean_std(x_train);
                let (test_mean, test_std) = frame_mean_std(x_test);
                info!(
                    scaler = %self,
                    train_mean = format!("{train_mean:.2}"),
                    train_std = format!("{train_std:.2}"),
                    test_mean = format!("{test_mean:.2}"),
                    test_std = format!("{test_std:.2}"),
                    "scaled predictor summary"
                );
            }
        }
    }
}

/// Fits the scaler on the training predictors only and transforms both
/// splits, emitting the variant's diagnostic summary.
pub fn scale_split(
    x_train: &FeatureFrame,
    x_test: &FeatureFrame,
    scaler: &mut Scaler,
) -> Result<(FeatureFrame, FeatureFrame)> {
    let scaled_train = scaler.fit_transform(x_train)?;
    let scaled_test = scaler.transform(x_test)?;
    scaler.log_summary(&scaled_train, &scaled_test);
    Ok((scaled_train, scaled_test))
}

fn frame_min_max(x: &FeatureFrame) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in &x.rows {
        for value in row {
            min = min.min(*value);
            max = max.max(*value);
        }
    }
    (min, max)
}

fn frame_mean_std(x: &FeatureFrame) -> (f64, f64) {
    let n = (x.rows.len() * x.columns.len()).max(1) as f64;
    let mean = x.rows.iter().flatten().sum::<f64>() / n;
    let variance = x
        .rows
        .iter()
        .flatten()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}
