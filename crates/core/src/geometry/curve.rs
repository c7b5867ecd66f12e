//! Validated polyline with arc-length parameterisation

use geo_types::{Coord, Line, LineString};
use serde::{Deserialize, Serialize};

use super::primitives::{distance, lerp, DEGENERATE_EPS};
use crate::error::{Error, Result};

/// An ordered sequence of at least two distinct planar points.
///
/// Consecutive duplicate points are collapsed on construction, so every
/// segment has non-zero length. Cumulative arc lengths are cached, making
/// [`Curve::point_at`] a binary search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f64; 2]>", into = "Vec<[f64; 2]>")]
pub struct Curve {
    coords: Vec<Coord<f64>>,
    cumulative: Vec<f64>,
}

impl Curve {
    /// Build a curve from coordinates.
    ///
    /// # Errors
    /// [`Error::DegenerateCurve`] if any coordinate is non-finite or fewer
    /// than two distinct points remain after collapsing duplicates.
    pub fn new<I>(coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        let mut kept: Vec<Coord<f64>> = Vec::new();
        for c in coords {
            if !c.x.is_finite() || !c.y.is_finite() {
                return Err(Error::DegenerateCurve(format!(
                    "non-finite coordinate ({}, {})",
                    c.x, c.y
                )));
            }
            match kept.last() {
                Some(&prev) if distance(prev, c) <= DEGENERATE_EPS => {}
                _ => kept.push(c),
            }
        }

        if kept.len() < 2 {
            return Err(Error::DegenerateCurve(format!(
                "need at least 2 distinct points, got {}",
                kept.len()
            )));
        }

        let mut cumulative = Vec::with_capacity(kept.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for w in kept.windows(2) {
            total += distance(w[0], w[1]);
            cumulative.push(total);
        }

        Ok(Self {
            coords: kept,
            cumulative,
        })
    }

    /// Convenience constructor from `(x, y)` tuples
    pub fn from_xy(points: &[(f64, f64)]) -> Result<Self> {
        Self::new(points.iter().map(|&(x, y)| Coord { x, y }))
    }

    /// Total arc length
    pub fn length(&self) -> f64 {
        *self.cumulative.last().unwrap_or(&0.0)
    }

    /// Number of vertices
    pub fn num_points(&self) -> usize {
        self.coords.len()
    }

    pub fn coords(&self) -> &[Coord<f64>] {
        &self.coords
    }

    pub fn start(&self) -> Coord<f64> {
        self.coords[0]
    }

    pub fn end(&self) -> Coord<f64> {
        self.coords[self.coords.len() - 1]
    }

    /// Iterate over the curve's segments in traversal order
    pub fn segments(&self) -> impl Iterator<Item = Line<f64>> + '_ {
        self.coords.windows(2).map(|w| Line::new(w[0], w[1]))
    }

    /// Point at arc-length distance `d` from the start.
    ///
    /// `d` is clamped to `[0, length]`.
    pub fn point_at(&self, d: f64) -> Coord<f64> {
        let total = self.length();
        if d.is_nan() || d <= 0.0 {
            return self.start();
        }
        if d >= total {
            return self.end();
        }

        // First vertex strictly beyond d; cumulative[0] = 0 <= d < total.
        let idx = self.cumulative.partition_point(|&c| c <= d);
        let i = idx - 1;
        let seg_len = self.cumulative[idx] - self.cumulative[i];
        let t = (d - self.cumulative[i]) / seg_len;
        lerp(self.coords[i], self.coords[idx], t)
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.coords.clone())
    }
}

impl TryFrom<LineString<f64>> for Curve {
    type Error = Error;

    fn try_from(ls: LineString<f64>) -> Result<Self> {
        Curve::new(ls.0)
    }
}

impl TryFrom<Vec<[f64; 2]>> for Curve {
    type Error = Error;

    fn try_from(points: Vec<[f64; 2]>) -> Result<Self> {
        Curve::new(points.into_iter().map(|[x, y]| Coord { x, y }))
    }
}

impl From<Curve> for LineString<f64> {
    fn from(curve: Curve) -> Self {
        LineString::new(curve.coords)
    }
}

impl From<Curve> for Vec<[f64; 2]> {
    fn from(curve: Curve) -> Self {
        curve.coords.iter().map(|c| [c.x, c.y]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn l_shape() -> Curve {
        Curve::from_xy(&[(0.0, 0.0), (10.0, 0.0), (10.0, 5.0)]).unwrap()
    }

    #[test]
    fn test_length() {
        assert_relative_eq!(l_shape().length(), 15.0);
    }

    #[test]
    fn test_point_at_interior() {
        let curve = l_shape();
        let p = curve.point_at(12.5);
        assert_relative_eq!(p.x, 10.0);
        assert_relative_eq!(p.y, 2.5);
    }

    #[test]
    fn test_point_at_vertex() {
        let p = l_shape().point_at(10.0);
        assert_relative_eq!(p.x, 10.0);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn test_point_at_clamped() {
        let curve = l_shape();
        assert_eq!(curve.point_at(-3.0), curve.start());
        assert_eq!(curve.point_at(100.0), curve.end());
    }

    #[test]
    fn test_duplicates_collapsed() {
        let curve =
            Curve::from_xy(&[(0.0, 0.0), (0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 0.0)]).unwrap();
        assert_eq!(curve.num_points(), 3);
        assert_eq!(curve.segments().count(), 2);
    }

    #[test]
    fn test_rejects_single_distinct_point() {
        let err = Curve::from_xy(&[(1.0, 1.0), (1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, Error::DegenerateCurve(_)));
        assert!(Curve::from_xy(&[]).is_err());
    }

    #[test]
    fn test_rejects_nan() {
        assert!(Curve::from_xy(&[(0.0, 0.0), (f64::NAN, 1.0)]).is_err());
    }

    #[test]
    fn test_serde_as_coordinate_array() {
        let curve = l_shape();
        let json = serde_json::to_string(&curve).unwrap();
        assert_eq!(json, "[[0.0,0.0],[10.0,0.0],[10.0,5.0]]");
        let back: Curve = serde_json::from_str(&json).unwrap();
        assert_eq!(back, curve);
        assert!(serde_json::from_str::<Curve>("[[1.0,1.0]]").is_err());
    }
}
