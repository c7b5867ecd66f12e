//! Change metrics per transect
//!
//! From the positions a transect observed over the canonical years:
//!
//! - **NSM** (net shoreline movement): last position minus first
//! - **EPR** (end point rate): NSM over the elapsed years
//! - **MAC** (mean annual change): the same endpoint rate as EPR
//!
//! plus an erosion / stable / accretion class from the sign of EPR.

mod summary;

pub use summary::ChangeSummary;

use serde::{Deserialize, Serialize};
use shorewatch_core::io::{Cell, Table};
use shorewatch_core::{Algorithm, Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

use crate::maybe_rayon::*;
use crate::transect::PositionTable;

/// Three-way shoreline stability class, written as `Erosion`, `Stable` or
/// `Accretion` in every output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeType {
    Erosion,
    Stable,
    Accretion,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Erosion => "Erosion",
            ChangeType::Stable => "Stable",
            ChangeType::Accretion => "Accretion",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an end point rate.
///
/// Rates strictly above `threshold` are accretion, strictly below
/// `-threshold` erosion, anything in between stable. A threshold of 0 is an
/// exact sign test.
pub fn classify(epr: f64, threshold: f64) -> ChangeType {
    if epr > threshold {
        ChangeType::Accretion
    } else if epr < -threshold {
        ChangeType::Erosion
    } else {
        ChangeType::Stable
    }
}

/// Parameters for change computation
#[derive(Debug, Clone, Default)]
pub struct ChangeParams {
    /// Deadband around zero EPR classified as stable
    pub stability_threshold: f64,
}

impl ChangeParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.stability_threshold >= 0.0 && self.stability_threshold.is_finite()) {
            return Err(Error::invalid(
                "stability_threshold",
                self.stability_threshold,
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Change statistics for one transect with at least two observed years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub transect_id: u32,
    pub distance_along_coast: f64,
    pub nsm: f64,
    pub epr: f64,
    pub mac: f64,
    pub change_type: ChangeType,
    pub num_years_data: usize,
    /// Observed positions, canonical years only
    pub positions: BTreeMap<i32, f64>,
}

impl ChangeRecord {
    pub fn first_year(&self) -> Option<i32> {
        self.positions.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.positions.keys().next_back().copied()
    }
}

/// Change metrics for a single transect.
///
/// Only positions for years in `canonical_years` are considered. Returns
/// `None` (and logs a warning) when fewer than two such years were observed.
pub fn compute_change(
    transect_id: u32,
    distance_along_coast: f64,
    positions: &BTreeMap<i32, f64>,
    canonical_years: &[i32],
    params: &ChangeParams,
) -> Option<ChangeRecord> {
    let observed: BTreeMap<i32, f64> = canonical_years
        .iter()
        .filter_map(|y| positions.get(y).map(|&p| (*y, p)))
        .filter(|(_, p)| p.is_finite())
        .collect();

    if observed.len() < 2 {
        warn!(
            "Transect {}: {} observed year(s), at least 2 needed for change metrics",
            transect_id,
            observed.len()
        );
        return None;
    }

    let (&first_year, &first) = observed.iter().next()?;
    let (&last_year, &last) = observed.iter().next_back()?;

    let nsm = last - first;
    let time_span = (last_year - first_year) as f64;
    let epr = if time_span == 0.0 { 0.0 } else { nsm / time_span };

    Some(ChangeRecord {
        transect_id,
        distance_along_coast,
        nsm,
        epr,
        mac: epr,
        change_type: classify(epr, params.stability_threshold),
        num_years_data: observed.len(),
        positions: observed,
    })
}

/// Change metrics for every transect of a position table.
///
/// Transects with fewer than two observations are left out. Records come
/// back in transect-id order.
pub fn compute_shoreline_change(
    table: &PositionTable,
    params: ChangeParams,
) -> Result<Vec<ChangeRecord>> {
    params.validate()?;
    if table.years.is_empty() {
        return Err(Error::EmptyYears);
    }

    let mut records: Vec<ChangeRecord> = table
        .rows
        .as_slice()
        .into_par_iter()
        .filter_map(|row| {
            compute_change(
                row.transect_id,
                row.distance_along_coast,
                &row.positions,
                &table.years,
                &params,
            )
        })
        .collect();
    records.sort_by_key(|r| r.transect_id);

    let excluded = table.rows.len() - records.len();
    if records.is_empty() {
        warn!("No transect had enough observations for change metrics");
    } else {
        info!(
            "Computed change metrics for {} transects ({} excluded)",
            records.len(),
            excluded
        );
    }
    Ok(records)
}

/// Change metrics algorithm over a position table
#[derive(Debug, Clone, Default)]
pub struct ShorelineChange;

impl Algorithm for ShorelineChange {
    type Input = PositionTable;
    type Output = Vec<ChangeRecord>;
    type Params = ChangeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ShorelineChange"
    }

    fn description(&self) -> &'static str {
        "Net shoreline movement, end point rate and stability class per transect"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        compute_shoreline_change(&input, params)
    }
}

/// Tabulate change records with one `position_<year>` column per year.
///
/// Years a record did not observe are left empty; positions in years not
/// listed are not tabulated.
pub fn change_table(records: &[ChangeRecord], years: &[i32]) -> Result<Table> {
    let mut headers: Vec<String> = [
        "transect_id",
        "distance_along_coast",
        "nsm",
        "epr",
        "mac",
        "change_type",
        "num_years_data",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    headers.extend(years.iter().map(|y| format!("position_{}", y)));

    let mut table = Table::new(headers);
    for r in records {
        let mut row = vec![
            Cell::from(r.transect_id as i64),
            Cell::from(r.distance_along_coast),
            Cell::from(r.nsm),
            Cell::from(r.epr),
            Cell::from(r.mac),
            Cell::from(r.change_type.as_str()),
            Cell::from(r.num_years_data),
        ];
        row.extend(years.iter().map(|y| Cell::from(r.positions.get(y).copied())));
        table.push_row(row)?;
    }
    Ok(table)
}
