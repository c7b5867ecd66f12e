//! Transect sampling frame
//!
//! - Generate: perpendicular transects at uniform arc-length spacing along a baseline
//! - Intersect: where a year's shoreline crosses each transect
//! - Positions: per-transect, per-year crossing distances

mod generate;
mod intersect;
mod positions;

pub use generate::{
    anchor_distances, generate_transects, TransectGenerator, TransectParams, MAX_ANCHORS,
};
pub use intersect::{intersect, transect_crossings, Crossing};
pub use positions::{measure_positions, PositionTable, TransectPositions};

use geo_types::{Coord, Line};
use serde::{Deserialize, Serialize};
use shorewatch_core::geometry::{distance, lerp, project_onto_segment};

/// A fixed sampling segment perpendicular to the baseline.
///
/// Created once per run from the reference curve and never re-anchored:
/// every epoch is measured against the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transect {
    /// 0-based id in baseline traversal order
    pub id: u32,
    /// Arc-length position of the anchor along the baseline
    pub distance_along_coast: f64,
    /// First endpoint; positions are measured from here
    pub start: Coord<f64>,
    pub end: Coord<f64>,
}

impl Transect {
    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    pub fn line(&self) -> Line<f64> {
        Line::new(self.start, self.end)
    }

    /// Anchor point on the baseline (the transect midpoint)
    pub fn anchor(&self) -> Coord<f64> {
        lerp(self.start, self.end, 0.5)
    }

    /// Distance from `start` to the closest point on the transect
    pub fn project(&self, p: Coord<f64>) -> f64 {
        project_onto_segment(p, self.start, self.end)
    }

    /// Point at distance `d` from `start`, clamped to the segment
    pub fn point_at(&self, d: f64) -> Coord<f64> {
        let len = self.length();
        if len == 0.0 {
            return self.start;
        }
        lerp(self.start, self.end, (d / len).clamp(0.0, 1.0))
    }
}
