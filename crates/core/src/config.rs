//! Analysis configuration
//!
//! Every field has a default, so a JSON file only needs the keys it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Which forecasting model backs the forecast adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    /// Trained model when enough training windows exist, linear otherwise
    #[default]
    Auto,
    /// Trained least-squares model over lookback windows
    Regression,
    /// Per-transect straight-line extrapolation
    Linear,
}

impl std::str::FromStr for PredictorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(PredictorKind::Auto),
            "regression" | "trained" | "model" => Ok(PredictorKind::Regression),
            "linear" | "lin" => Ok(PredictorKind::Linear),
            _ => Err(Error::invalid(
                "predictor",
                s,
                "use auto, regression or linear",
            )),
        }
    }
}

/// Configuration surface consumed by the transect / time-series / forecast stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Year whose shoreline anchors the transects (earliest year with data if unset)
    pub reference_year: Option<i32>,
    /// Arc-length spacing between transect anchors
    pub transect_spacing: f64,
    /// Full length of each transect
    pub transect_length: f64,
    /// Canonical ordered observation years
    pub years: Vec<i32>,
    /// Years to forecast, each one epoch step after the previous
    pub forecast_years: Vec<i32>,
    /// Number of trailing positions fed to the predictor
    pub lookback: usize,
    /// Deadband around zero EPR classified as stable (0 = exact sign test)
    pub stability_threshold: f64,
    pub predictor: PredictorKind,
    /// Number of years kept by the shoreline cache
    pub cache_capacity: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_year: None,
            transect_spacing: 50.0,
            transect_length: 300.0,
            years: vec![1994, 2004, 2014, 2024],
            forecast_years: vec![2034, 2044],
            lookback: 3,
            stability_threshold: 0.0,
            predictor: PredictorKind::Auto,
            cache_capacity: 8,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: AnalysisConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Canonical years sorted ascending without duplicates
    pub fn canonical_years(&self) -> Vec<i32> {
        let mut years = self.years.clone();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Check the configuration for values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(self.transect_spacing > 0.0 && self.transect_spacing.is_finite()) {
            return Err(Error::invalid(
                "transect_spacing",
                self.transect_spacing,
                "must be a positive finite number",
            ));
        }
        if !(self.transect_length > 0.0 && self.transect_length.is_finite()) {
            return Err(Error::invalid(
                "transect_length",
                self.transect_length,
                "must be a positive finite number",
            ));
        }
        if self.years.is_empty() {
            return Err(Error::EmptyYears);
        }
        if !(self.stability_threshold >= 0.0 && self.stability_threshold.is_finite()) {
            return Err(Error::invalid(
                "stability_threshold",
                self.stability_threshold,
                "must be a non-negative finite number",
            ));
        }

        let years = self.canonical_years();
        if self.lookback == 0 || self.lookback > years.len() {
            return Err(Error::invalid(
                "lookback",
                self.lookback,
                format!("must be between 1 and {} (number of years)", years.len()),
            ));
        }

        let last = years[years.len() - 1];
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

        if let Some(ry) = self.reference_year {
            if !years.contains(&ry) {
                return Err(Error::invalid(
                    "reference_year",
                    ry,
                    "must be one of the canonical years",
                ));
            }
        }

        if self.cache_capacity == 0 {
            return Err(Error::invalid("cache_capacity", 0, "must be at least 1"));
        }

        Ok(())
    }
}
