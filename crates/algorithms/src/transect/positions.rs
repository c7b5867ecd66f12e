//! Per-transect, per-year shoreline positions

use serde::{Deserialize, Serialize};
use shorewatch_core::ShorelineEpochs;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::{intersect, Transect};
use crate::maybe_rayon::*;

/// Observed positions for one transect.
///
/// Years without a crossing are absent from `positions`; they are never
/// filled with zero or interpolated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransectPositions {
    pub transect_id: u32,
    pub distance_along_coast: f64,
    /// Year → distance from the transect's first endpoint
    pub positions: BTreeMap<i32, f64>,
}

impl TransectPositions {
    pub fn num_observed(&self) -> usize {
        self.positions.len()
    }

    /// Observed years restricted to `canonical`, in canonical order
    pub fn observed_years(&self, canonical: &[i32]) -> Vec<i32> {
        canonical
            .iter()
            .copied()
            .filter(|y| self.positions.contains_key(y))
            .collect()
    }
}

/// Position table for every transect over the canonical years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionTable {
    /// Canonical years, ascending
    pub years: Vec<i32>,
    /// One row per transect, in transect-id order
    pub rows: Vec<TransectPositions>,
}

impl PositionTable {
    pub fn get(&self, transect_id: u32) -> Option<&TransectPositions> {
        self.rows.iter().find(|r| r.transect_id == transect_id)
    }

    /// Total number of (transect, year) observations
    pub fn num_observations(&self) -> usize {
        self.rows.iter().map(TransectPositions::num_observed).sum()
    }
}

/// Measure every transect against every canonical year's shoreline.
///
/// Transects are processed independently (in parallel with the `parallel`
/// feature); the output is ordered by transect id regardless.
pub fn measure_positions(
    transects: &[Transect],
    epochs: &ShorelineEpochs,
    years: &[i32],
) -> PositionTable {
    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();

    for year in &years {
        if !epochs.contains_key(year) {
            warn!("No shoreline data for {}; every transect lacks this year", year);
        }
    }

    let mut rows: Vec<TransectPositions> = transects
        .into_par_iter()
        .map(|t| {
            let mut positions = BTreeMap::new();
            for &year in &years {
                let Some(fragments) = epochs.get(&year) else {
                    continue;
                };
                match intersect(t, fragments) {
                    Some(hit) => {
                        positions.insert(year, hit.distance);
                    }
                    None => warn!("Transect {}: no shoreline intersection in {}", t.id, year),
                }
            }
            TransectPositions {
                transect_id: t.id,
                distance_along_coast: t.distance_along_coast,
                positions,
            }
        })
        .collect();
    rows.sort_by_key(|r| r.transect_id);

    let table = PositionTable { years, rows };
    info!(
        "Measured {} positions over {} transects",
        table.num_observations(),
        table.rows.len()
    );
    table
}
