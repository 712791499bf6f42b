//! Map features and their GeoJSON representation.
//!
//! Coordinates follow GeoJSON order, `[longitude, latitude]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{BoundingBox, GeoPoint, OmanaError, OmanaResult};

/// Geometry types supported on the map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: [f64; 2],
    },

    LineString {
        coordinates: Vec<[f64; 2]>,
    },

    /// Array of linear rings; the first is the exterior, the rest are holes.
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
}

impl Geometry {
    pub fn point(lat: f64, lng: f64) -> Self {
        Geometry::Point {
            coordinates: [lng, lat],
        }
    }

    /// Build a line string; needs at least two positions.
    pub fn line_string(points: &[GeoPoint]) -> OmanaResult<Self> {
        if points.len() < 2 {
            return Err(OmanaError::InvalidGeometry(format!(
                "line string needs at least 2 positions, got {}",
                points.len()
            )));
        }
        Ok(Geometry::LineString {
            coordinates: points.iter().map(|p| p.to_lng_lat()).collect(),
        })
    }

    /// Build a single-ring polygon, closing the ring if needed.
    pub fn polygon(points: &[GeoPoint]) -> OmanaResult<Self> {
        if points.len() < 3 {
            return Err(OmanaError::InvalidGeometry(format!(
                "polygon needs at least 3 positions, got {}",
                points.len()
            )));
        }
        let mut ring: Vec<[f64; 2]> = points.iter().map(|p| p.to_lng_lat()).collect();
        if ring.first() != ring.last() {
            ring.push(ring[0]);
        }
        Ok(Geometry::Polygon {
            coordinates: vec![ring],
        })
    }

    /// Every position in the geometry, in order.
    pub fn positions(&self) -> Vec<GeoPoint> {
        match self {
            Geometry::Point { coordinates } => vec![GeoPoint::from_lng_lat(*coordinates)],
            Geometry::LineString { coordinates } => coordinates
                .iter()
                .map(|c| GeoPoint::from_lng_lat(*c))
                .collect(),
            Geometry::Polygon { coordinates } => coordinates
                .iter()
                .flatten()
                .map(|c| GeoPoint::from_lng_lat(*c))
                .collect(),
        }
    }

    /// Geographic bounds, `None` for an empty geometry.
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(self.positions())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
            Geometry::Polygon { .. } => "Polygon",
        }
    }
}

/// A flat property value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

/// Rendering hints carried with each feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureStyle {
    /// CSS-style hex color, e.g. "#E4572E"
    pub color: String,
    /// Marker radius or stroke width in pixels
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            color: "#3388FF".to_string(),
            size: 6.0,
            label: None,
        }
    }
}

/// A map entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub style: FeatureStyle,
}

impl Feature {
    pub fn new(id: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: BTreeMap::new(),
            style: FeatureStyle::default(),
        }
    }

    /// Set a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: FeatureStyle) -> Self {
        self.style = style;
        self
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.geometry.bbox()
    }

    /// GeoJSON Feature object. The style is folded into the properties
    /// under `style:`-prefixed keys so it never shadows a data property.
    pub fn to_geojson(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for (key, value) in &self.properties {
            properties.insert(key.clone(), serde_json::json!(value));
        }
        properties.insert("style:color".into(), serde_json::json!(self.style.color));
        properties.insert("style:size".into(), serde_json::json!(self.style.size));
        if let Some(label) = &self.style.label {
            properties.insert("style:label".into(), serde_json::json!(label));
        }

        serde_json::json!({
            "type": "Feature",
            "id": self.id,
            "geometry": self.geometry,
            "properties": properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_serializes_as_geojson() {
        let json = serde_json::to_value(Geometry::point(23.58, 58.38)).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["coordinates"][0], 58.38);
        assert_eq!(json["coordinates"][1], 23.58);
    }

    #[test]
    fn test_polygon_ring_is_closed() {
        let pts = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
        ];
        match Geometry::polygon(&pts).unwrap() {
            Geometry::Polygon { coordinates } => {
                assert_eq!(coordinates[0].len(), 4);
                assert_eq!(coordinates[0][0], coordinates[0][3]);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_short_geometries_rejected() {
        let one = [GeoPoint::new(0.0, 0.0)];
        assert!(Geometry::line_string(&one).is_err());
        assert!(Geometry::polygon(&one).is_err());
    }

    #[test]
    fn test_property_values_untagged() {
        let feature = Feature::new("h-1", Geometry::point(1.0, 2.0))
            .with_property("house", 1001u32)
            .with_property("street", "Way 3021")
            .with_property("occupied", true);
        let json = feature.to_geojson();
        assert_eq!(json["properties"]["house"], 1001.0);
        assert_eq!(json["properties"]["street"], "Way 3021");
        assert_eq!(json["properties"]["occupied"], true);
        assert_eq!(json["properties"]["style:color"], "#3388FF");
    }

    #[test]
    fn test_style_does_not_overwrite_properties() {
        let style = FeatureStyle {
            label: Some("Bait Al Zubair".to_string()),
            ..FeatureStyle::default()
        };
        let feature = Feature::new("w-1", Geometry::point(1.0, 2.0))
            .with_property("color", "white")
            .with_property("size", 3u32)
            .with_property("label", "museum")
            .with_style(style);

        let props = &feature.to_geojson()["properties"];
        assert_eq!(props["color"], "white");
        assert_eq!(props["size"], 3.0);
        assert_eq!(props["label"], "museum");
        assert_eq!(props["style:color"], "#3388FF");
        assert_eq!(props["style:label"], "Bait Al Zubair");
    }
}
