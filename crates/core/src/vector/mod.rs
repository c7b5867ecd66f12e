//! Vector data structures
//!
//! - Feature: geometry + attributes
//! - FeatureCollection: collection of features
//! - Shoreline fragments per year, flattened to [`Curve`]s

pub mod geojson;

use geo_types::{Geometry, LineString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::geometry::Curve;

/// Shoreline fragments keyed by observation year.
///
/// One year may hold several disjoint fragments (one per image tile, for
/// instance).
pub type ShorelineEpochs = BTreeMap<i32, Vec<Curve>>;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            AttributeValue::Float(v)
        } else {
            AttributeValue::Null
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(AttributeValue::Null)
    }
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes, ordered by key
    pub properties: BTreeMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: BTreeMap::new(),
            id: None,
        }
    }

    /// Create a feature with no geometry
    pub fn empty() -> Self {
        Self {
            geometry: None,
            properties: BTreeMap::new(),
            id: None,
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }

    /// Linear parts of the geometry as curves.
    ///
    /// Polygons contribute their rings (a land/water mask contour is often
    /// delivered as a polygon). Points carry no shoreline and yield nothing.
    /// Degenerate parts are skipped with a warning.
    pub fn curves(&self) -> Vec<Curve> {
        let mut parts: Vec<&LineString<f64>> = Vec::new();
        match &self.geometry {
            Some(Geometry::LineString(ls)) => parts.push(ls),
            Some(Geometry::MultiLineString(mls)) => parts.extend(mls.0.iter()),
            Some(Geometry::Polygon(p)) => {
                parts.push(p.exterior());
                parts.extend(p.interiors().iter());
            }
            Some(Geometry::MultiPolygon(mp)) => {
                for p in &mp.0 {
                    parts.push(p.exterior());
                    parts.extend(p.interiors().iter());
                }
            }
            _ => {}
        }

        parts
            .into_iter()
            .filter_map(|ls| match Curve::try_from(ls.clone()) {
                Ok(curve) => Some(curve),
                Err(e) => {
                    warn!("Skipping shoreline part of feature {:?}: {}", self.id, e);
                    None
                }
            })
            .collect()
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self { features: Vec::new() }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    /// All linear parts of all features, in feature order
    pub fn curves(&self) -> Vec<Curve> {
        self.features.iter().flat_map(Feature::curves).collect()
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

/// Combined arc length of a set of fragments
pub fn total_length(curves: &[Curve]) -> f64 {
    curves.iter().map(Curve::length).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{MultiLineString, Point, Polygon};

    #[test]
    fn test_linestring_feature_curves() {
        let f = Feature::new(Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (5.0, 0.0),
        ])));
        let curves = f.curves();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].length(), 5.0);
    }

    #[test]
    fn test_multilinestring_skips_degenerate_parts() {
        let f = Feature::new(Geometry::MultiLineString(MultiLineString::new(vec![
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]),
            LineString::from(vec![(3.0, 3.0), (3.0, 3.0)]),
            LineString::from(vec![(0.0, 1.0), (0.0, 2.0)]),
        ])));
        assert_eq!(f.curves().len(), 2);
    }

    #[test]
    fn test_polygon_rings_become_curves() {
        let poly = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 0.0)]),
            vec![],
        );
        let f = Feature::new(Geometry::Polygon(poly));
        let curves = f.curves();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].num_points(), 4);
    }

    #[test]
    fn test_point_has_no_curves() {
        let f = Feature::new(Geometry::Point(Point::new(1.0, 2.0)));
        assert!(f.curves().is_empty());
        assert!(Feature::empty().curves().is_empty());
    }

    #[test]
    fn test_attribute_from_nan_is_null() {
        assert_eq!(AttributeValue::from(f64::NAN), AttributeValue::Null);
        assert_eq!(AttributeValue::from(None::<f64>), AttributeValue::Null);
        assert_eq!(AttributeValue::from(Some(2.5)).as_f64(), Some(2.5));
    }

    #[test]
    fn test_collection_total_length() {
        let mut fc = FeatureCollection::new();
        fc.push(Feature::new(Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (3.0, 4.0),
        ]))));
        fc.push(Feature::new(Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (0.0, 2.0),
        ]))));
        assert_eq!(fc.len(), 2);
        assert_eq!(total_length(&fc.curves()), 7.0);
    }
}
