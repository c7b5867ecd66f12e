//! End-to-end tests of the transect → change → time-series → forecast chain
//! on synthetic coastlines.
//!
//! The synthetic coast is a gently curving baseline; later years are the
//! same curve shifted along +y (accretion on the northern side) with
//! some transects deliberately left without observations.

use approx::assert_relative_eq;
use shorewatch_algorithms::analysis::{run_transect_analysis, transect_features, TransectAnalysis};
use shorewatch_algorithms::change::{compute_change, ChangeParams, ChangeType};
use shorewatch_algorithms::forecast::{run_forecast, ForecastParams, Provenance};
use shorewatch_algorithms::transect::{anchor_distances, generate_transects, intersect, TransectParams};
use shorewatch_core::{AnalysisConfig, Curve, PredictorKind, ShorelineEpochs};
use std::collections::BTreeMap;

fn wavy(offset: f64, x0: f64, x1: f64) -> Curve {
    let n = 200;
    let pts: Vec<(f64, f64)> = (0..=n)
        .map(|i| {
            let x = x0 + (x1 - x0) * i as f64 / n as f64;
            (x, 20.0 * (x / 400.0).sin() + offset)
        })
        .collect();
    Curve::from_xy(&pts).unwrap()
}

fn epochs() -> ShorelineEpochs {
    let mut e = ShorelineEpochs::new();
    e.insert(1994, vec![wavy(0.0, 0.0, 1000.0)]);
    // Two tiles in 2004
    e.insert(2004, vec![wavy(4.0, -20.0, 480.0), wavy(4.0, 480.0, 1020.0)]);
    // 2014 misses the eastern end of the coast
    e.insert(2014, vec![wavy(8.0, -20.0, 700.0)]);
    e.insert(2024, vec![wavy(12.0, -20.0, 1020.0)]);
    e
}

fn config() -> AnalysisConfig {
    AnalysisConfig {
        transect_spacing: 50.0,
        transect_length: 100.0,
        ..Default::default()
    }
}

fn analysis() -> TransectAnalysis {
    run_transect_analysis(&epochs(), &config()).unwrap()
}

// ---------------------------------------------------------------------------
// Transect frame
// ---------------------------------------------------------------------------

#[test]
fn anchor_count_matches_floor_rule() {
    let cases: [(f64, f64); 4] = [(1000.0, 50.0), (999.9, 50.0), (12.5, 2.5), (3.0, 7.0)];
    for (len, spacing) in cases {
        let expected = (len / spacing).floor() as usize + 1;
        assert_eq!(anchor_distances(len, spacing).unwrap().len(), expected);
    }

    let baseline = wavy(0.0, 0.0, 1000.0);
    let transects = generate_transects(&baseline, TransectParams { spacing: 50.0, length: 100.0 }).unwrap();
    assert!(transects.len() <= anchor_distances(baseline.length(), 50.0).unwrap().len());
}

#[test]
fn vanishing_spacing_is_rejected() {
    let cfg = AnalysisConfig {
        transect_spacing: 1e-300,
        ..config()
    };
    assert!(cfg.validate().is_ok());
    assert!(run_transect_analysis(&epochs(), &cfg).is_err());
}

#[test]
fn transect_ids_are_gapless() {
    let a = analysis();
    for (i, t) in a.transects.iter().enumerate() {
        assert_eq!(t.id, i as u32);
    }
    assert!(a
        .transects
        .windows(2)
        .all(|w| w[0].distance_along_coast < w[1].distance_along_coast));
}

#[test]
fn intersection_is_deterministic_under_permutation() {
    let a = analysis();
    let fragments = epochs()[&2004].clone();
    let mut reversed = fragments.clone();
    reversed.reverse();

    for t in &a.transects {
        let first = intersect(t, &fragments);
        assert_eq!(first, intersect(t, &fragments));
        assert_eq!(first, intersect(t, &reversed));
    }
}

// ---------------------------------------------------------------------------
// Change metrics
// ---------------------------------------------------------------------------

#[test]
fn two_year_reference_case() {
    let positions: BTreeMap<i32, f64> = [(1994, 10.0), (2024, 40.0)].into_iter().collect();
    let rec = compute_change(0, 0.0, &positions, &[1994, 2004, 2014, 2024], &ChangeParams::default())
        .unwrap();
    assert_relative_eq!(rec.nsm, 30.0);
    assert_relative_eq!(rec.epr, 1.0);
    assert_relative_eq!(rec.mac, 1.0);
    assert_eq!(rec.change_type, ChangeType::Accretion);
    assert_eq!(rec.num_years_data, 2);
}

#[test]
fn classification_follows_epr_sign() {
    let a = analysis();
    assert!(!a.changes.is_empty());
    for r in &a.changes {
        let expected = if r.epr > 0.0 {
            ChangeType::Accretion
        } else if r.epr < 0.0 {
            ChangeType::Erosion
        } else {
            ChangeType::Stable
        };
        assert_eq!(r.change_type, expected);
        assert_eq!(r.nsm > 0.0, r.epr > 0.0);
        assert_eq!(r.mac, r.epr);
    }
}

#[test]
fn coast_wide_accretion() {
    let a = analysis();
    // Every shift is +4 per decade along y; projected onto a transect the
    // displacement is positive wherever a change record exists.
    assert_eq!(a.summary.count(ChangeType::Accretion), a.changes.len());
    assert!(a.summary.mean_epr.unwrap() > 0.0);
    assert_eq!(a.summary.total_transects, a.transects.len());
}

#[test]
fn unobserved_transect_absent_from_changes() {
    let mut e = ShorelineEpochs::new();
    e.insert(1994, vec![wavy(0.0, 0.0, 1000.0)]);
    // Later year only covers the western half
    e.insert(2024, vec![wavy(12.0, -20.0, 400.0)]);
    // A far-away fragment that no transect reaches
    e.insert(2014, vec![Curve::from_xy(&[(0.0, 5000.0), (1000.0, 5000.0)]).unwrap()]);

    let a = run_transect_analysis(&e, &config()).unwrap();
    let east = a
        .transects
        .iter()
        .filter(|t| t.distance_along_coast > 600.0)
        .map(|t| t.id)
        .collect::<Vec<_>>();
    assert!(!east.is_empty());
    for id in east {
        assert!(a.change_for(id).is_none());
    }
    assert!(a.changes.iter().all(|c| !c.positions.contains_key(&2014)));
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[test]
fn tensor_shape_and_no_value_cells() {
    let a = analysis();
    let ts = a.timeseries().unwrap();

    let observed = a.positions.rows.iter().filter(|r| r.num_observed() > 0).count();
    assert_eq!(ts.tensor.shape(), (observed, 4));

    let col_2014 = ts.years().iter().position(|&y| y == 2014).unwrap();
    let mut gaps = 0;
    for (i, meta) in ts.tensor.metadata.iter().enumerate() {
        let cell = ts.tensor.data[[i, col_2014]];
        if meta.years_present.contains(&2014) {
            assert!(cell.is_finite());
        } else {
            assert!(cell.is_nan());
            gaps += 1;
        }
    }
    assert!(gaps > 0, "eastern transects should miss 2014");
}

#[test]
fn tensor_round_trips_into_long_form() {
    let ts = analysis().timeseries().unwrap();
    for meta in &ts.tensor.metadata {
        for &year in &meta.years_present {
            let cell = ts.tensor.get(meta.transect_id, year).unwrap();
            let row = ts
                .rows_for(meta.transect_id)
                .find(|r| r.year == year)
                .expect("tensor cell without long-form row");
            assert_eq!(row.position, cell);
        }
    }
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

#[test]
fn forecast_covers_exactly_the_forecast_years() {
    let ts = analysis().timeseries().unwrap();
    let params = ForecastParams {
        lookback: 3,
        forecast_years: vec![2034, 2044],
        predictor: PredictorKind::Linear,
    };
    let f = run_forecast(&ts, &params).unwrap();

    // Historical rows are the long-form rows, verbatim
    let historical: Vec<_> = f.historical().map(|r| (r.transect_id, r.year, r.position)).collect();
    let expected: Vec<_> = ts.long_form.iter().map(|r| (r.transect_id, r.year, r.position)).collect();
    assert_eq!(historical, expected);

    for id in &f.forecast_transects {
        let years: Vec<i32> = f
            .records
            .iter()
            .filter(|r| r.transect_id == *id && r.provenance == Provenance::Forecast)
            .map(|r| r.year)
            .collect();
        assert_eq!(years, vec![2034, 2044]);
    }
    assert_eq!(f.forecasts().count(), 2 * f.forecast_transects.len());
}

#[test]
fn forecast_continues_linear_trend() {
    let ts = analysis().timeseries().unwrap();
    let params = ForecastParams {
        lookback: 3,
        forecast_years: vec![2034],
        predictor: PredictorKind::Linear,
    };
    let f = run_forecast(&ts, &params).unwrap();

    // A transect with all four years moves by a near-constant step per epoch
    let full = ts
        .tensor
        .metadata
        .iter()
        .find(|m| m.num_observations == 4)
        .unwrap();
    let last = ts.tensor.get(full.transect_id, 2024).unwrap();
    let prev = ts.tensor.get(full.transect_id, 2014).unwrap();
    let next = f
        .forecasts()
        .find(|r| r.transect_id == full.transect_id)
        .unwrap();
    assert_relative_eq!(next.position, last + (last - prev), epsilon = 1e-2);
}

#[test]
fn auto_predictor_trains_on_enough_windows() {
    let ts = analysis().timeseries().unwrap();
    let params = ForecastParams {
        lookback: 2,
        ..Default::default()
    };
    let f = run_forecast(&ts, &params).unwrap();
    assert_eq!(f.predictor, "regression");
    assert!(f.forecasts().all(|r| r.position.is_finite()));
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[test]
fn transect_layer_has_one_feature_per_transect() {
    let a = analysis();
    let fc = transect_features(&a);
    assert_eq!(fc.len(), a.transects.len());
    assert!(fc.iter().all(|f| f.get_property("transect_id").is_some()));
}
