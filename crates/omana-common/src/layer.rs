//! Layers and projects.
//!
//! A project holds an ordered list of layers; each layer owns its full
//! feature list. Layers are rebuilt wholesale when their inputs change,
//! never patched feature by feature.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BoundingBox, CrsCode, Feature, OmanaError, OmanaResult};

/// Unique identifier for a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A toggle-able group of features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,

    /// Human-readable title for the layer list
    pub title: String,

    pub visible: bool,

    /// Opacity scale in [0, 1]
    pub opacity: f64,

    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: LayerId::new(id),
            title: title.into(),
            visible: true,
            opacity: 1.0,
            features: Vec::new(),
        }
    }

    /// Replace the whole feature list.
    pub fn rebuild(&mut self, features: Vec<Feature>) {
        self.features = features;
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    /// Extent of all features, `None` when the layer is empty.
    pub fn extent(&self) -> Option<BoundingBox> {
        let mut bounds: Option<BoundingBox> = None;
        for bbox in self.features.iter().filter_map(Feature::bbox) {
            bounds = Some(match bounds {
                Some(mut acc) => {
                    acc.min_x = acc.min_x.min(bbox.min_x);
                    acc.min_y = acc.min_y.min(bbox.min_y);
                    acc.max_x = acc.max_x.max(bbox.max_x);
                    acc.max_y = acc.max_y.max(bbox.max_y);
                    acc
                }
                None => bbox,
            });
        }
        bounds
    }
}

/// Descriptive project metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A CRS, a bounding extent and an ordered set of layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub crs: CrsCode,
    pub extent: BoundingBox,
    pub metadata: ProjectMetadata,
    pub layers: Vec<Layer>,
}

impl Project {
    pub fn new(title: impl Into<String>, crs: CrsCode, extent: BoundingBox) -> Self {
        Self {
            crs,
            extent,
            metadata: ProjectMetadata {
                title: title.into(),
                description: None,
                author: None,
                created_at: Utc::now(),
            },
            layers: Vec::new(),
        }
    }

    /// Append a layer; ids must be unique.
    pub fn add_layer(&mut self, layer: Layer) -> OmanaResult<()> {
        if self.layer(&layer.id.0).is_some() {
            return Err(OmanaError::invalid_parameter(
                "layer",
                format!("duplicate layer id '{}'", layer.id),
            ));
        }
        self.layers.push(layer);
        Ok(())
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id.0 == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id.0 == id)
    }

    /// Visible layers in draw order.
    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.visible)
    }

    /// Flip visibility; returns the new state.
    pub fn toggle_layer(&mut self, id: &str) -> OmanaResult<bool> {
        let layer = self
            .layer_mut(id)
            .ok_or_else(|| OmanaError::LayerNotFound(id.to_string()))?;
        layer.visible = !layer.visible;
        Ok(layer.visible)
    }

    pub fn set_opacity(&mut self, id: &str, opacity: f64) -> OmanaResult<()> {
        self.layer_mut(id)
            .ok_or_else(|| OmanaError::LayerNotFound(id.to_string()))?
            .set_opacity(opacity);
        Ok(())
    }

    /// Features of visible layers whose bounds intersect `bounds`.
    pub fn features_in(&self, bounds: &BoundingBox) -> Vec<&Feature> {
        self.visible_layers()
            .flat_map(|l| l.features.iter())
            .filter(|f| f.bbox().map_or(false, |b| b.intersects(bounds)))
            .collect()
    }

    /// GeoJSON FeatureCollection of all visible features.
    pub fn to_geojson(&self) -> serde_json::Value {
        let features: Vec<serde_json::Value> = self
            .visible_layers()
            .flat_map(|layer| {
                layer.features.iter().map(move |f| {
                    let mut json = f.to_geojson();
                    json["properties"]["layer"] = serde_json::json!(layer.id.0);
                    json["properties"]["opacity"] = serde_json::json!(layer.opacity);
                    json
                })
            })
            .collect();

        serde_json::json!({
            "type": "FeatureCollection",
            "crs": self.crs.to_string(),
            "features": features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Geometry;

    fn project() -> Project {
        let mut project = Project::new(
            "Seeb",
            CrsCode::Epsg4326,
            BoundingBox::new(58.0, 23.0, 59.0, 24.0),
        );
        let mut houses = Layer::new("houses", "Houses");
        houses.rebuild(vec![
            Feature::new("h1", Geometry::point(23.5, 58.5)),
            Feature::new("h2", Geometry::point(23.9, 58.9)),
        ]);
        project.add_layer(houses).unwrap();
        project.add_layer(Layer::new("notes", "Notes")).unwrap();
        project
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let mut project = project();
        assert!(project.add_layer(Layer::new("houses", "Again")).is_err());
    }

    #[test]
    fn test_toggle_and_filter() {
        let mut project = project();
        let window = BoundingBox::new(58.4, 23.4, 58.6, 23.6);
        assert_eq!(project.features_in(&window).len(), 1);

        assert!(!project.toggle_layer("houses").unwrap());
        assert!(project.features_in(&window).is_empty());
        assert!(project.toggle_layer("houses").unwrap());
        assert!(project.toggle_layer("missing").is_err());
    }

    #[test]
    fn test_opacity_clamped() {
        let mut project = project();
        project.set_opacity("houses", 1.7).unwrap();
        assert_eq!(project.layer("houses").unwrap().opacity, 1.0);
        project.set_opacity("houses", -0.2).unwrap();
        assert_eq!(project.layer("houses").unwrap().opacity, 0.0);
    }

    #[test]
    fn test_layer_extent() {
        let project = project();
        let extent = project.layer("houses").unwrap().extent().unwrap();
        assert_eq!(extent, BoundingBox::new(58.5, 23.5, 58.9, 23.9));
        assert!(project.layer("notes").unwrap().extent().is_none());
    }

    #[test]
    fn test_geojson_export() {
        let project = project();
        let json = project.to_geojson();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"].as_array().unwrap().len(), 2);
        assert_eq!(json["features"][0]["properties"]["layer"], "houses");
    }
}
