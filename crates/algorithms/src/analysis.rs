//! Transect analysis: baseline selection through change statistics
//!
//! Runs the fixed sequence baseline → transects → positions → change records
//! over shoreline epochs that have already been loaded.

use geo_types::{Geometry, LineString};
use serde::{Deserialize, Serialize};
use shorewatch_core::vector::{Feature, FeatureCollection};
use shorewatch_core::{AnalysisConfig, Curve, Error, Result, ShorelineEpochs};
use tracing::{info, warn};

use crate::change::{compute_shoreline_change, ChangeParams, ChangeRecord, ChangeSummary};
use crate::timeseries::{assemble_timeseries, TimeSeries};
use crate::transect::{generate_transects, measure_positions, PositionTable, Transect, TransectParams};

/// Choose the reference year and its baseline curve.
///
/// Without an explicit year the earliest year in `epochs` is used. When the
/// year has several fragments the longest one becomes the baseline.
///
/// # Errors
/// [`Error::NoShorelineData`] for empty epochs, [`Error::MissingReferenceYear`]
/// when the requested year has no fragments.
pub fn select_baseline(epochs: &ShorelineEpochs, reference_year: Option<i32>) -> Result<(i32, Curve)> {
    let year = match reference_year {
        Some(y) => y,
        None => *epochs.keys().next().ok_or(Error::NoShorelineData)?,
    };

    let baseline = epochs
        .get(&year)
        .and_then(|fragments| {
            fragments
                .iter()
                .max_by(|a, b| a.length().total_cmp(&b.length()))
        })
        .ok_or(Error::MissingReferenceYear(year))?;

    info!(
        "Baseline from {}: {} points, length {:.2}",
        year,
        baseline.num_points(),
        baseline.length()
    );
    Ok((year, baseline.clone()))
}

/// Everything the transect stage produces, serialisable for later stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransectAnalysis {
    pub reference_year: i32,
    /// Canonical years the positions were measured for
    pub years: Vec<i32>,
    pub baseline: Curve,
    pub transects: Vec<Transect>,
    pub positions: PositionTable,
    pub changes: Vec<ChangeRecord>,
    pub summary: ChangeSummary,
}

impl TransectAnalysis {
    pub fn change_for(&self, transect_id: u32) -> Option<&ChangeRecord> {
        self.changes.iter().find(|c| c.transect_id == transect_id)
    }

    /// Assemble the time series of this analysis
    pub fn timeseries(&self) -> Result<TimeSeries> {
        assemble_timeseries(&self.positions, &self.changes)
    }

    pub fn report(&self) -> String {
        self.summary.report(self.reference_year, &self.years)
    }
}

/// Run the transect stage over loaded epochs.
///
/// Fails only on invalid configuration or when no usable baseline exists.
/// A run where no transect reaches two observations succeeds with a warning
/// and an empty change list.
pub fn run_transect_analysis(epochs: &ShorelineEpochs, config: &AnalysisConfig) -> Result<TransectAnalysis> {
    config.validate()?;
    if epochs.is_empty() {
        return Err(Error::NoShorelineData);
    }

    let years = config.canonical_years();
    let reference = config.reference_year.or_else(|| {
        years
            .iter()
            .copied()
            .find(|y| epochs.get(y).is_some_and(|f| !f.is_empty()))
    });
    let (reference_year, baseline) = select_baseline(epochs, reference)?;

    let transects = generate_transects(
        &baseline,
        TransectParams {
            spacing: config.transect_spacing,
            length: config.transect_length,
        },
    )?;

    let positions = measure_positions(&transects, epochs, &years);
    let changes = compute_shoreline_change(
        &positions,
        ChangeParams {
            stability_threshold: config.stability_threshold,
        },
    )?;
    if changes.is_empty() {
        warn!("Transect analysis produced no change records");
    }

    let summary = ChangeSummary::from_records(transects.len(), &changes);
    Ok(TransectAnalysis {
        reference_year,
        years,
        baseline,
        transects,
        positions,
        changes,
        summary,
    })
}

/// Transect lines with their change attributes.
///
/// Transects without a change record keep only their id and distance.
pub fn transect_features(analysis: &TransectAnalysis) -> FeatureCollection {
    let mut fc = FeatureCollection::new();
    for t in &analysis.transects {
        let line = LineString::from(vec![t.start, t.end]);
        let mut feature = Feature::new(Geometry::LineString(line));
        feature.id = Some(t.id.to_string());
        feature.set_property("transect_id", i64::from(t.id));
        feature.set_property("distance_along_coast", t.distance_along_coast);

        let change = analysis.change_for(t.id);
        feature.set_property("nsm", change.map(|c| c.nsm));
        feature.set_property("epr", change.map(|c| c.epr));
        feature.set_property("mac", change.map(|c| c.mac));
        feature.set_property("change_type", change.map(|c| c.change_type.as_str()));
        feature.set_property("num_years_data", change.map(|c| c.num_years_data as i64));
        fc.push(feature);
    }
    fc
}
