//! End-to-end runs of the per-zone modeling loop.

use chrono::{DateTime, TimeZone, Utc};
use windcast::metrics::rmse;
use windcast::model::{MeanRegressor, RidgeRegressor};
use windcast::modeling::{run_zone_models, ModelingOptions, ParamGrid};
use windcast::scaling::Scaler;
use windcast::tracking::{ExperimentLogger, InMemoryBackend};
use windcast::Dataset;

fn ts(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2012, 1, 1, hour, 0, 0).unwrap()
}

/// Rows interleave zones 1 and 2 so the final realignment join actually has
/// to reorder the accumulated per-zone predictions.
fn train_data() -> Dataset {
    Dataset::new(
        (0..8).collect(),
        vec![1, 2, 1, 2, 1, 2, 1, 2],
        (0..8).map(ts).collect(),
        vec![0.2, 0.1, 0.4, 0.1, 0.6, 0.3, 0.8, 0.9],
        vec!["WS100".to_string()],
        (0..8).map(|i| vec![i as f64]).collect(),
    )
    .unwrap()
}

fn test_data() -> Dataset {
    Dataset::new(
        (0..4).collect(),
        vec![1, 2, 1, 2],
        (0..4).map(ts).collect(),
        vec![0.5, 0.2, 0.7, 0.6],
        vec!["WS100".to_string()],
        (0..4).map(|i| vec![i as f64]).collect(),
    )
    .unwrap()
}

#[test]
fn mean_baseline_scores_per_zone_and_pooled() {
    let backend = InMemoryBackend::new();
    let logger = ExperimentLogger::new(Box::new(backend.clone()), "wind-test");
    let options = ModelingOptions {
        save_models: true,
        print_scores: false,
        infotext: Some("mean baseline".to_string()),
        ..ModelingOptions::default()
    };

    let outcome = run_zone_models(
        &train_data(),
        &test_data(),
        &["WS100".to_string()],
        &MeanRegressor::default(),
        Some(&logger),
        &options,
    )
    .unwrap();

    for scores in [&outcome.trainscore, &outcome.testscore] {
        assert_eq!(
            scores.keys().collect::<Vec<_>>(),
            vec!["TOTAL", "ZONE1", "ZONE2"]
        );
    }

    // zone means: 0.5 for zone 1, 0.35 for zone 2
    let zone1_expected = rmse(&[0.5, 0.7], &[0.5, 0.5]).unwrap();
    let zone2_expected = rmse(&[0.2, 0.6], &[0.35, 0.35]).unwrap();
    assert!((outcome.testscore["ZONE1"] - zone1_expected).abs() < 1e-12);
    assert!((outcome.testscore["ZONE2"] - zone2_expected).abs() < 1e-12);

    // TOTAL is the RMSE of the pooled, realigned predictions...
    let pooled_expected = rmse(&[0.5, 0.2, 0.7, 0.6], &[0.5, 0.35, 0.5, 0.35]).unwrap();
    assert!((outcome.testscore["TOTAL"] - pooled_expected).abs() < 1e-12);
    // ...which is not the average of the per-zone scores
    let average = (zone1_expected + zone2_expected) / 2.0;
    assert!((outcome.testscore["TOTAL"] - average).abs() > 1e-6);

    // retention keyed by zone
    let models = outcome.models.expect("models were retained");
    assert_eq!(models.keys().collect::<Vec<_>>(), vec![&1, &2]);

    // one tracking run per zone, none for TOTAL
    let runs = backend.runs();
    assert_eq!(runs.len(), 2);
    let zone_tags: Vec<&str> = runs.iter().map(|r| r.tags["ZONEID"].as_str()).collect();
    assert_eq!(zone_tags, vec!["ZONE1", "ZONE2"]);
    for run in &runs {
        assert_eq!(run.tags["Model"], "MeanRegressor");
        assert_eq!(run.tags["n_features"], "1");
        assert_eq!(run.tags["info"], "mean baseline");
        assert!(run.metrics.contains_key("train-RMSE"));
        assert!(run.metrics.contains_key("test-RMSE"));
        assert!(run.params.contains_key("Missing Value Handling"));
        // the mean baseline has no hyperparameters to log
        assert!(!run.params.contains_key("hyperparameter"));
        assert!(run.ended_at.is_some());
    }
}

#[test]
fn predictions_are_clipped_to_unit_interval() {
    // targets far above 1 force raw mean predictions > 1
    let train = Dataset::new(
        (0..4).collect(),
        vec![1, 1, 1, 1],
        (0..4).map(ts).collect(),
        vec![1.5, 2.0, 2.5, 3.0],
        vec!["WS100".to_string()],
        (0..4).map(|i| vec![i as f64]).collect(),
    )
    .unwrap();

    let outcome = run_zone_models(
        &train,
        &train,
        &["WS100".to_string()],
        &MeanRegressor::default(),
        None,
        &ModelingOptions {
            print_scores: false,
            ..ModelingOptions::default()
        },
    )
    .unwrap();

    // clipped prediction is exactly 1.0, so the error against each target
    // is target - 1.0
    let expected = rmse(&[1.5, 2.0, 2.5, 3.0], &[1.0; 4]).unwrap();
    assert!((outcome.trainscore["ZONE1"] - expected).abs() < 1e-12);
}

#[test]
fn grid_search_runs_end_to_end_with_scaling() {
    let grid: ParamGrid = [(
        "alpha".to_string(),
        vec![serde_json::json!(0.001), serde_json::json!(10.0)],
    )]
    .into_iter()
    .collect();

    let options = ModelingOptions {
        scaler: Some(Scaler::min_max()),
        print_scores: false,
        grid_search: true,
        param_grid: Some(grid),
        cv_folds: 2,
        ..ModelingOptions::default()
    };

    let outcome = run_zone_models(
        &train_data(),
        &test_data(),
        &["WS100".to_string()],
        &RidgeRegressor::default(),
        None,
        &options,
    )
    .unwrap();

    for scores in [&outcome.trainscore, &outcome.testscore] {
        assert_eq!(scores.len(), 3);
        assert!(scores.values().all(|v| v.is_finite() && *v >= 0.0));
    }
}
