//! GeoJSON data types.
//!
//! Lightweight serde models for the subset of RFC 7946 that shoreline
//! exchange needs: feature collections of points, lines and polygons with
//! flat properties. Positions may carry a third (z) ordinate, which is ignored.

use geo_types::{Coord, Geometry, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AttributeValue, Feature, FeatureCollection};
use crate::error::{Error, Result};

type Position = Vec<f64>;

/// GeoJSON geometry object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

/// GeoJSON feature object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    pub geometry: Option<GeoJsonGeometry>,

    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

/// GeoJSON feature collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoJsonFeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,

    pub features: Vec<GeoJsonFeature>,
}

fn to_coord(pos: &[f64]) -> Result<Coord<f64>> {
    match pos {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(Error::Other(format!(
            "GeoJSON position needs at least 2 ordinates, got {}",
            pos.len()
        ))),
    }
}

fn to_line_string(positions: &[Position]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|p| to_coord(p))
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn to_polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|r| to_line_string(r));
    let exterior = match rings.next() {
        Some(r) => r?,
        None => LineString::new(vec![]),
    };
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn from_line_string(ls: &LineString<f64>) -> Vec<Position> {
    ls.0.iter().map(|c| vec![c.x, c.y]).collect()
}

fn from_polygon(p: &Polygon<f64>) -> Vec<Vec<Position>> {
    std::iter::once(p.exterior())
        .chain(p.interiors().iter())
        .map(from_line_string)
        .collect()
}

impl GeoJsonGeometry {
    /// Convert to a `geo_types` geometry
    pub fn to_geometry(&self) -> Result<Geometry<f64>> {
        Ok(match self {
            GeoJsonGeometry::Point { coordinates } => {
                Geometry::Point(Point::from(to_coord(coordinates)?))
            }
            GeoJsonGeometry::LineString { coordinates } => {
                Geometry::LineString(to_line_string(coordinates)?)
            }
            GeoJsonGeometry::MultiLineString { coordinates } => Geometry::MultiLineString(
                MultiLineString::new(
                    coordinates
                        .iter()
                        .map(|ls| to_line_string(ls))
                        .collect::<Result<Vec<_>>>()?,
                ),
            ),
            GeoJsonGeometry::Polygon { coordinates } => Geometry::Polygon(to_polygon(coordinates)?),
            GeoJsonGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon(
                MultiPolygon::new(
                    coordinates
                        .iter()
                        .map(|p| to_polygon(p))
                        .collect::<Result<Vec<_>>>()?,
                ),
            ),
        })
    }

    /// Convert from a `geo_types` geometry.
    ///
    /// Returns `None` for geometry kinds outside the supported subset.
    pub fn from_geometry(geom: &Geometry<f64>) -> Option<Self> {
        match geom {
            Geometry::Point(p) => Some(GeoJsonGeometry::Point {
                coordinates: vec![p.x(), p.y()],
            }),
            Geometry::Line(l) => Some(GeoJsonGeometry::LineString {
                coordinates: vec![vec![l.start.x, l.start.y], vec![l.end.x, l.end.y]],
            }),
            Geometry::LineString(ls) => Some(GeoJsonGeometry::LineString {
                coordinates: from_line_string(ls),
            }),
            Geometry::MultiLineString(mls) => Some(GeoJsonGeometry::MultiLineString {
                coordinates: mls.0.iter().map(from_line_string).collect(),
            }),
            Geometry::Polygon(p) => Some(GeoJsonGeometry::Polygon {
                coordinates: from_polygon(p),
            }),
            Geometry::MultiPolygon(mp) => Some(GeoJsonGeometry::MultiPolygon {
                coordinates: mp.0.iter().map(from_polygon).collect(),
            }),
            _ => None,
        }
    }
}

fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => AttributeValue::from(n.as_f64()),
        },
        Value::String(s) => AttributeValue::String(s.clone()),
        other => AttributeValue::String(other.to_string()),
    }
}

fn from_attribute(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Int(i) => Value::from(*i),
        AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AttributeValue::String(s) => Value::String(s.clone()),
    }
}

impl TryFrom<&GeoJsonFeatureCollection> for FeatureCollection {
    type Error = Error;

    fn try_from(fc: &GeoJsonFeatureCollection) -> Result<Self> {
        if fc.kind != "FeatureCollection" {
            return Err(Error::Other(format!(
                "expected a GeoJSON FeatureCollection, got type {:?}",
                fc.kind
            )));
        }

        let mut out = FeatureCollection::new();
        for f in &fc.features {
            let mut feature = match &f.geometry {
                Some(g) => Feature::new(g.to_geometry()?),
                None => Feature::empty(),
            };
            feature.id = f.id.as_ref().map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
            if let Some(props) = &f.properties {
                for (k, v) in props {
                    feature.set_property(k.clone(), to_attribute(v));
                }
            }
            out.push(feature);
        }
        Ok(out)
    }
}

impl From<&FeatureCollection> for GeoJsonFeatureCollection {
    fn from(fc: &FeatureCollection) -> Self {
        let features = fc
            .iter()
            .map(|f| GeoJsonFeature {
                kind: "Feature".to_string(),
                id: f.id.clone().map(Value::String),
                geometry: f.geometry.as_ref().and_then(GeoJsonGeometry::from_geometry),
                properties: Some(
                    f.properties
                        .iter()
                        .map(|(k, v)| (k.clone(), from_attribute(v)))
                        .collect(),
                ),
            })
            .collect();

        GeoJsonFeatureCollection {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// Parse a GeoJSON FeatureCollection document
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection> {
    let raw: GeoJsonFeatureCollection = serde_json::from_str(text)?;
    FeatureCollection::try_from(&raw)
}

/// Serialize a FeatureCollection as a pretty-printed GeoJSON document
pub fn to_geojson_string(fc: &FeatureCollection) -> Result<String> {
    Ok(serde_json::to_string_pretty(&GeoJsonFeatureCollection::from(fc))?)
}
