//! Dataset table and per-zone train/test splitting.
//!
//! A [`Dataset`] is a column-oriented table with the three fixed columns of
//! the wind power data (`ZONEID`, `TIMESTAMP`, `TARGETVAR`) plus the numeric
//! weather feature columns. Every row carries a stable index that survives
//! splitting and prediction, so pooled predictions can be realigned with the
//! source tables afterwards.

use anyhow::Result;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const ZONE_COL: &str = "ZONEID";
pub const TIME_COL: &str = "TIMESTAMP";
pub const TARGET_COL: &str = "TARGETVAR";

/// Column-oriented dataset with one target value per row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Stable row index, preserved through splits and predictions.
    pub index: Vec<usize>,
    pub zone_ids: Vec<u32>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub targets: Vec<f64>,
    pub feature_names: Vec<String>,
    /// Row-major feature values, one inner vec per row.
    pub rows: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn new(
        index: Vec<usize>,
        zone_ids: Vec<u32>,
        timestamps: Vec<DateTime<Utc>>,
        targets: Vec<f64>,
        feature_names: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let n = index.len();
        if zone_ids.len() != n || timestamps.len() != n || targets.len() != n || rows.len() != n {
            anyhow::bail!(
                "column length mismatch: {} index rows, {} zones, {} timestamps, {} targets, {} feature rows",
                n,
                zone_ids.len(),
                timestamps.len(),
                targets.len(),
                rows.len()
            );
        }
        if let Some(row) = rows.iter().find(|r| r.len() != feature_names.len()) {
            anyhow::bail!(
                "feature row length mismatch: expected {}, got {}",
                feature_names.len(),
                row.len()
            );
        }
        Ok(Self {
            index,
            zone_ids,
            timestamps,
            targets,
            feature_names,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Full column list in table order, fixed columns first.
    pub fn column_names(&self) -> Vec<String> {
        let mut columns = vec![
            ZONE_COL.to_string(),
            TIME_COL.to_string(),
            TARGET_COL.to_string(),
        ];
        columns.extend(self.feature_names.iter().cloned());
        columns
    }

    /// Distinct zone ids, ascending.
    pub fn zones(&self) -> Vec<u32> {
        self.zone_ids.iter().copied().sorted().dedup().collect()
    }

    /// Predictors and target for one zone, restricted to `features`.
    pub fn zone_frame(&self, zone: u32, features: &[String]) -> Result<(FeatureFrame, TargetSeries)> {
        let positions = features
            .iter()
            .map(|name| {
                self.feature_names
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| anyhow::anyhow!("unknown feature column '{name}'"))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut frame = FeatureFrame {
            index: Vec::new(),
            columns: features.to_vec(),
            rows: Vec::new(),
        };
        let mut target = TargetSeries {
            index: Vec::new(),
            values: Vec::new(),
        };

        for (i, &row_zone) in self.zone_ids.iter().enumerate() {
            if row_zone != zone {
                continue;
            }
            frame.index.push(self.index[i]);
            frame
                .rows
                .push(positions.iter().map(|&p| self.rows[i][p]).collect());
            target.index.push(self.index[i]);
            target.values.push(self.targets[i]);
        }

        Ok((frame, target))
    }
}

/// Predictor matrix for one split, with per-row index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFrame {
    pub index: Vec<usize>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Subset of rows by position (not by index label). Used for CV folds.
    pub fn take(&self, positions: &[usize]) -> FeatureFrame {
        FeatureFrame {
            index: positions.iter().map(|&p| self.index[p]).collect(),
            columns: self.columns.clone(),
            rows: positions.iter().map(|&p| self.rows[p].clone()).collect(),
        }
    }
}

/// Target (or prediction) values for one split, with per-row index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSeries {
    pub index: Vec<usize>,
    pub values: Vec<f64>,
}

impl TargetSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn take(&self, positions: &[usize]) -> TargetSeries {
        TargetSeries {
            index: positions.iter().map(|&p| self.index[p]).collect(),
            values: positions.iter().map(|&p| self.values[p]).collect(),
        }
    }
}

/// Splits both tables to one zone's rows and separates predictors from the
/// target column. Returns `(x_train, x_test, y_train, y_test)`. Inputs are
/// not mutated; row indices are preserved 1:1 between predictors and targets.
pub fn zone_split(
    data_train: &Dataset,
    data_test: &Dataset,
    zone: u32,
    features: &[String],
) -> Result<(FeatureFrame, FeatureFrame, TargetSeries, TargetSeries)> {
    let (x_train, y_train) = data_train.zone_frame(zone, features)?;
    let (x_test, y_test) = data_test.zone_frame(zone, features)?;
    Ok((x_train, x_test, y_train, y_test))
}
