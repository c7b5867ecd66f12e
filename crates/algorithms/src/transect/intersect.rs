//! Shoreline-transect intersection
//!
//! A transect may cross a year's shoreline zero, one or several times
//! (sinuous coasts, spits, overlapping tiles). All crossings over all
//! fragments are collected and the one nearest the transect's first
//! endpoint wins.

use geo_types::{Coord, Line};
use serde::{Deserialize, Serialize};
use shorewatch_core::geometry::{distance, segment_intersection};
use shorewatch_core::Curve;
use std::cmp::Ordering;

use super::Transect;

const SAME_POINT_EPS: f64 = 1e-9;

/// A resolved shoreline crossing on a transect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crossing {
    pub point: Coord<f64>,
    /// Distance from the transect's first endpoint
    pub distance: f64,
}

fn bbox_overlaps(a: &Line<f64>, b: &Line<f64>) -> bool {
    let (a_min_x, a_max_x) = min_max(a.start.x, a.end.x);
    let (a_min_y, a_max_y) = min_max(a.start.y, a.end.y);
    let (b_min_x, b_max_x) = min_max(b.start.x, b.end.x);
    let (b_min_y, b_max_y) = min_max(b.start.y, b.end.y);
    a_min_x <= b_max_x && a_max_x >= b_min_x && a_min_y <= b_max_y && a_max_y >= b_min_y
}

#[inline]
fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Total order on crossings: distance first, then x, then y.
fn crossing_order(a: &Crossing, b: &Crossing) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.point.x.total_cmp(&b.point.x))
        .then(a.point.y.total_cmp(&b.point.y))
}

/// Every crossing of the transect with every fragment.
///
/// Point intersections are taken as-is; a collinear overlap contributes its
/// first endpoint along the transect. The result is sorted by distance from
/// the transect start.
pub fn transect_crossings(transect: &Transect, fragments: &[Curve]) -> Vec<Crossing> {
    let line = transect.line();
    let mut crossings: Vec<Crossing> = fragments
        .iter()
        .flat_map(|fragment| fragment.segments())
        .filter(|seg| bbox_overlaps(&line, seg))
        .filter_map(|seg| segment_intersection(line, seg))
        .map(|hit| {
            let point = hit.first_point();
            Crossing {
                point,
                distance: transect.project(point),
            }
        })
        .collect();

    crossings.sort_by(crossing_order);
    // A crossing on a shared vertex is reported by both adjacent segments.
    crossings.dedup_by(|a, b| {
        (a.distance - b.distance).abs() <= SAME_POINT_EPS
            && distance(a.point, b.point) <= SAME_POINT_EPS
    });
    crossings
}

/// Resolve the shoreline position on a transect for one epoch.
///
/// Returns `None` (no observation) when no fragment touches the transect.
/// With several crossings, the smallest distance from the transect's first
/// endpoint is chosen; ties are broken on coordinates so the answer does not
/// depend on fragment order.
pub fn intersect(transect: &Transect, fragments: &[Curve]) -> Option<Crossing> {
    transect_crossings(transect, fragments).into_iter().next()
}
