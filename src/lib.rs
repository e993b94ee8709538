//! Per-zone regression modeling for wind power forecasting.
//!
//! The crate covers the modeling loop of a GEFCom-style wind power dataset:
//! - named feature subsets for ablation studies ([`features`])
//! - per-zone train/test splitting ([`dataset`])
//! - optional predictor scaling ([`scaling`])
//! - per-zone fit/predict/score with optional grid-search CV ([`modeling`])
//! - experiment tracking over an MLflow-style service ([`tracking`])
//!
//! Control flow is synchronous and single-threaded; the only shared state is
//! the prediction accumulator owned by the runner.

pub mod config;
pub mod dataset;
pub mod features;
pub mod metrics;
pub mod model;
pub mod modeling;
pub mod scaling;
pub mod telemetry;
pub mod tracking;

pub use dataset::{zone_split, Dataset, FeatureFrame, TargetSeries};
pub use modeling::{run_zone_models, ModelingOptions, ModelingOutcome};
pub use tracking::{ExperimentLogger, RunReport};
