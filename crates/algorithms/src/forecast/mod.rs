//! Forecast adapter
//!
//! Turns the sequence tensor into forward-looking positions through a
//! [`Predictor`]. Which predictor is active is decided by the caller; the
//! adapter only sees the trait.
//!
//! Gaps are forward-filled before windowing: the last known position
//! propagates, nothing is interpolated or zero-filled. Forecast years are
//! predicted recursively, one epoch step each.

mod predictor;

pub use predictor::{
    select_predictor, training_windows, LinearExtrapolation, Predictor, RegressionPredictor,
};

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use shorewatch_core::io::{Cell, Table};
use shorewatch_core::{AnalysisConfig, Error, PredictorKind, Result};
use std::fmt::{self, Write as _};
use tracing::{info, warn};

use crate::maybe_rayon::*;
use crate::timeseries::{SequenceTensor, TimeSeries};

/// Parameters for the forecast stage
#[derive(Debug, Clone)]
pub struct ForecastParams {
    /// Trailing positions fed to the predictor
    pub lookback: usize,
    /// Strictly increasing years after the last canonical year
    pub forecast_years: Vec<i32>,
    pub predictor: PredictorKind,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            lookback: 3,
            forecast_years: vec![2034, 2044],
            predictor: PredictorKind::Auto,
        }
    }
}

impl From<&AnalysisConfig> for ForecastParams {
    fn from(cfg: &AnalysisConfig) -> Self {
        Self {
            lookback: cfg.lookback,
            forecast_years: cfg.forecast_years.clone(),
            predictor: cfg.predictor,
        }
    }
}

impl ForecastParams {
    pub fn validate(&self, years: &[i32]) -> Result<()> {
        let Some(&last) = years.last() else {
            return Err(Error::EmptyYears);
        };
        if self.lookback == 0 || self.lookback > years.len() {
            return Err(Error::invalid(
                "lookback",
                self.lookback,
                format!("must be between 1 and {}", years.len()),
            ));
        }
        let mut prev = last;
        for &fy in &self.forecast_years {
            if fy <= prev {
                return Err(Error::invalid(
                    "forecast_years",
                    fy,
                    format!("must be strictly increasing and after {}", last),
                ));
            }
            prev = fy;
        }
        Ok(())
    }
}

/// Whether a record was observed or predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Historical,
    Forecast,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Historical => "historical",
            Provenance::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub transect_id: u32,
    pub year: i32,
    pub position: f64,
    pub provenance: Provenance,
}

/// Historical and forecast records of one forecast run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    /// Name of the predictor that produced the forecast rows
    pub predictor: String,
    pub lookback: usize,
    pub historical_years: Vec<i32>,
    pub forecast_years: Vec<i32>,
    /// Transects that had a complete lookback window
    pub forecast_transects: Vec<u32>,
    /// Historical rows first, then forecast rows by transect and year
    pub records: Vec<ForecastRecord>,
}

impl Forecast {
    pub fn historical(&self) -> impl Iterator<Item = &ForecastRecord> {
        self.records
            .iter()
            .filter(|r| r.provenance == Provenance::Historical)
    }

    pub fn forecasts(&self) -> impl Iterator<Item = &ForecastRecord> {
        self.records
            .iter()
            .filter(|r| r.provenance == Provenance::Forecast)
    }

    /// Plain-text summary
    pub fn report(&self) -> String {
        let join = |ys: &[i32]| ys.iter().map(|y| y.to_string()).collect::<Vec<_>>().join(", ");
        let mut out = String::new();
        let _ = writeln!(out, "SHORELINE FORECAST SUMMARY");
        let _ = writeln!(out, "{}", "=".repeat(60));
        let _ = writeln!(out, "{:.<40} {}", "Predictor ", self.predictor);
        let _ = writeln!(out, "{:.<40} {}", "Lookback window ", self.lookback);
        let _ = writeln!(out, "{:.<40} {}", "Transects forecast ", self.forecast_transects.len());
        let _ = writeln!(out, "{:.<40} {}", "Historical years ", join(&self.historical_years));
        let _ = writeln!(out, "{:.<40} {}", "Forecast years ", join(&self.forecast_years));
        let _ = writeln!(out, "{:.<40} {}", "Historical records ", self.historical().count());
        let _ = writeln!(out, "{:.<40} {}", "Forecast records ", self.forecasts().count());
        out
    }
}

/// Propagate the last known value forward over NaN gaps.
///
/// Leading gaps stay NaN.
pub fn forward_fill(row: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut last = f64::NAN;
    row.iter()
        .map(|&v| {
            if v.is_finite() {
                last = v;
            }
            last
        })
        .collect()
}

/// Trailing `lookback` values of a forward-filled row, if all are known
pub fn lookback_window(filled: &[f64], lookback: usize) -> Option<&[f64]> {
    if lookback == 0 || filled.len() < lookback {
        return None;
    }
    let window = &filled[filled.len() - lookback..];
    window.iter().all(|v| v.is_finite()).then_some(window)
}

/// Forecast every lookback-eligible transect with `predictor`.
///
/// Historical rows are copied verbatim from the long-form table; each
/// eligible transect gets exactly one forecast row per forecast year.
pub fn forecast_positions(
    series: &TimeSeries,
    params: &ForecastParams,
    predictor: &dyn Predictor,
) -> Result<Forecast> {
    let tensor: &SequenceTensor = &series.tensor;
    params.validate(&tensor.years)?;

    let per_transect: Vec<(u32, Vec<f64>)> = (0..tensor.num_transects())
        .into_par_iter()
        .filter_map(|i| {
            let id = tensor.metadata[i].transect_id;
            let filled = forward_fill(tensor.row(i));
            let Some(window) = lookback_window(&filled, params.lookback) else {
                warn!(
                    "Transect {}: fewer than {} trailing positions, not forecast",
                    id, params.lookback
                );
                return None;
            };
            Some(predict_recursive(predictor, window, params.forecast_years.len()).map(|p| (id, p)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut records: Vec<ForecastRecord> = series
        .long_form
        .iter()
        .map(|r| ForecastRecord {
            transect_id: r.transect_id,
            year: r.year,
            position: r.position,
            provenance: Provenance::Historical,
        })
        .collect();

    for (id, predictions) in &per_transect {
        records.extend(
            params
                .forecast_years
                .iter()
                .zip(predictions)
                .map(|(&year, &position)| ForecastRecord {
                    transect_id: *id,
                    year,
                    position,
                    provenance: Provenance::Forecast,
                }),
        );
    }

    info!(
        "Forecast {} transects for {:?} with {} predictor",
        per_transect.len(),
        params.forecast_years,
        predictor.name()
    );

    Ok(Forecast {
        predictor: predictor.name().to_string(),
        lookback: params.lookback,
        historical_years: tensor.years.clone(),
        forecast_years: params.forecast_years.clone(),
        forecast_transects: per_transect.iter().map(|(id, _)| *id).collect(),
        records,
    })
}

/// Select the predictor named by `params` and forecast with it
pub fn run_forecast(series: &TimeSeries, params: &ForecastParams) -> Result<Forecast> {
    params.validate(&series.tensor.years)?;
    let predictor = select_predictor(params.predictor, &series.tensor, params.lookback)?;
    forecast_positions(series, params, predictor.as_ref())
}

fn predict_recursive(predictor: &dyn Predictor, window: &[f64], steps: usize) -> Result<Vec<f64>> {
    let mut window = window.to_vec();
    let mut out = Vec::with_capacity(steps);
    for _ in 0..steps {
        let next = predictor.predict_next(&window)?;
        if !next.is_finite() {
            return Err(Error::Algorithm(format!(
                "{} predictor returned a non-finite position",
                predictor.name()
            )));
        }
        out.push(next);
        window.remove(0);
        window.push(next);
    }
    Ok(out)
}

/// Tabulate forecast records as `transect_id, year, position, provenance`
pub fn forecast_table(forecast: &Forecast) -> Result<Table> {
    let mut table = Table::new(["transect_id", "year", "position", "provenance"]);
    for r in &forecast.records {
        table.push_row(vec![
            Cell::from(r.transect_id as i64),
            Cell::from(r.year),
            Cell::from(r.position),
            Cell::from(r.provenance.as_str()),
        ])?;
    }
    Ok(table)
}
