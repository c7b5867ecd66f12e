//! Point and segment primitives
//!
//! Thin helpers over `geo_types::Coord` plus segment intersection resolved
//! through `geo`'s robust `line_intersection`.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo_types::{Coord, Line};

/// Lengths at or below this are treated as zero.
pub const DEGENERATE_EPS: f64 = 1e-12;

/// Euclidean distance between two coordinates
#[inline]
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Dot product of two vectors
#[inline]
pub fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Linear interpolation between `a` and `b` at parameter `t`
#[inline]
pub fn lerp(a: Coord<f64>, b: Coord<f64>, t: f64) -> Coord<f64> {
    Coord {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    }
}

/// Unit vector pointing from `from` to `to`.
///
/// Returns `None` when the two points coincide.
pub fn unit_vector(from: Coord<f64>, to: Coord<f64>) -> Option<Coord<f64>> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    if len <= DEGENERATE_EPS {
        return None;
    }
    Some(Coord { x: dx / len, y: dy / len })
}

/// Rotate a vector by +90° (counter-clockwise).
#[inline]
pub fn perpendicular(v: Coord<f64>) -> Coord<f64> {
    Coord { x: -v.y, y: v.x }
}

/// Arc-length position along segment `a → b` of the point closest to `p`.
///
/// The result is clamped to `[0, |ab|]`.
pub fn project_onto_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let len = distance(a, b);
    if len <= DEGENERATE_EPS {
        return 0.0;
    }
    let dir = Coord {
        x: (b.x - a.x) / len,
        y: (b.y - a.y) / len,
    };
    let rel = Coord {
        x: p.x - a.x,
        y: p.y - a.y,
    };
    dot(rel, dir).clamp(0.0, len)
}

/// Result of intersecting two segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// Segments cross or touch at a single point
    Point(Coord<f64>),
    /// Segments are collinear and share a stretch.
    ///
    /// `start` and `end` are ordered along the direction of the first
    /// segment passed to [`segment_intersection`].
    Overlap { start: Coord<f64>, end: Coord<f64> },
}

impl SegmentIntersection {
    /// The point this intersection resolves to: the crossing itself, or the
    /// first endpoint of an overlap.
    pub fn first_point(&self) -> Coord<f64> {
        match *self {
            SegmentIntersection::Point(c) => c,
            SegmentIntersection::Overlap { start, .. } => start,
        }
    }
}

/// Intersect segment `a` with segment `b`.
pub fn segment_intersection(a: Line<f64>, b: Line<f64>) -> Option<SegmentIntersection> {
    match line_intersection(a, b)? {
        LineIntersection::SinglePoint { intersection, .. } => {
            Some(SegmentIntersection::Point(intersection))
        }
        LineIntersection::Collinear { intersection } => {
            let p = project_onto_segment(intersection.start, a.start, a.end);
            let q = project_onto_segment(intersection.end, a.start, a.end);
            let (start, end) = if p <= q {
                (intersection.start, intersection.end)
            } else {
                (intersection.end, intersection.start)
            };
            if distance(start, end) <= DEGENERATE_EPS {
                Some(SegmentIntersection::Point(start))
            } else {
                Some(SegmentIntersection::Overlap { start, end })
            }
        }
    }
}
