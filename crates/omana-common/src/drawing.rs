//! User-drawn map elements: walls, plots and doors.
//!
//! Elements are captured in screen space and snapped to a square grid
//! before they are stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Feature, FeatureStyle, Geometry, OmanaError, OmanaResult, ScreenPoint, ScreenTransform};

/// Kind of drawn element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Wall,
    Plot,
    Door,
}

impl ElementKind {
    /// Minimum number of vertices for a valid element.
    pub fn min_points(&self) -> usize {
        match self {
            ElementKind::Wall | ElementKind::Door => 2,
            ElementKind::Plot => 3,
        }
    }

    fn style(&self) -> FeatureStyle {
        let (color, size) = match self {
            ElementKind::Wall => ("#5C5C5C", 4.0),
            ElementKind::Plot => ("#8FBC8F", 1.0),
            ElementKind::Door => ("#A0522D", 3.0),
        };
        FeatureStyle {
            color: color.to_string(),
            size,
            label: None,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wall" => Some(ElementKind::Wall),
            "plot" => Some(ElementKind::Plot),
            "door" => Some(ElementKind::Door),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ElementKind::Wall => "wall",
            ElementKind::Plot => "plot",
            ElementKind::Door => "door",
        };
        write!(f, "{}", name)
    }
}

/// Round each coordinate to the nearest multiple of `cell`.
///
/// A non-positive cell disables snapping.
pub fn snap_to_grid(point: ScreenPoint, cell: f64) -> ScreenPoint {
    if cell <= 0.0 || !cell.is_finite() {
        return point;
    }
    ScreenPoint::new(
        (point.x / cell).round() * cell,
        (point.y / cell).round() * cell,
    )
}

/// A shape drawn by the user on the canvas overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapElement {
    pub id: Uuid,
    pub kind: ElementKind,
    /// Snapped vertices in screen space
    pub points: Vec<ScreenPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MapElement {
    /// Snap the raw vertices and validate the vertex count.
    pub fn new(kind: ElementKind, points: &[ScreenPoint], cell: f64) -> OmanaResult<Self> {
        if points.len() < kind.min_points() {
            return Err(OmanaError::InvalidGeometry(format!(
                "{} needs at least {} points, got {}",
                kind,
                kind.min_points(),
                points.len()
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            points: points.iter().map(|p| snap_to_grid(*p, cell)).collect(),
            label: None,
            created_at: Utc::now(),
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Convert to a geographic feature through `transform`.
    pub fn to_feature(&self, transform: &dyn ScreenTransform) -> OmanaResult<Feature> {
        let positions: Vec<_> = self.points.iter().map(|p| transform.to_geo(*p)).collect();
        let geometry = match self.kind {
            ElementKind::Wall | ElementKind::Door => Geometry::line_string(&positions)?,
            ElementKind::Plot => Geometry::polygon(&positions)?,
        };

        let mut style = self.kind.style();
        style.label = self.label.clone();

        Ok(Feature::new(self.id.to_string(), geometry)
            .with_property("kind", self.kind.to_string())
            .with_style(style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoPoint;

    /// 1 px == 0.001 degree, origin at (lat 24, lng 58).
    struct Fixed;

    impl ScreenTransform for Fixed {
        fn to_screen(&self, p: GeoPoint) -> ScreenPoint {
            ScreenPoint::new((p.lng - 58.0) * 1000.0, (24.0 - p.lat) * 1000.0)
        }

        fn to_geo(&self, p: ScreenPoint) -> GeoPoint {
            GeoPoint::new(24.0 - p.y / 1000.0, 58.0 + p.x / 1000.0)
        }
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(
            snap_to_grid(ScreenPoint::new(13.0, 27.0), 10.0),
            ScreenPoint::new(10.0, 30.0)
        );
        assert_eq!(
            snap_to_grid(ScreenPoint::new(13.0, 27.0), 0.0),
            ScreenPoint::new(13.0, 27.0)
        );
    }

    #[test]
    fn test_element_snaps_points() {
        let el = MapElement::new(
            ElementKind::Wall,
            &[ScreenPoint::new(2.0, 3.0), ScreenPoint::new(48.0, 6.0)],
            5.0,
        )
        .unwrap();
        assert_eq!(
            el.points,
            vec![ScreenPoint::new(0.0, 5.0), ScreenPoint::new(50.0, 5.0)]
        );
    }

    #[test]
    fn test_plot_needs_three_points() {
        let err = MapElement::new(
            ElementKind::Plot,
            &[ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 0.0)],
            1.0,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_plot_to_polygon_feature() {
        let el = MapElement::new(
            ElementKind::Plot,
            &[
                ScreenPoint::new(0.0, 0.0),
                ScreenPoint::new(100.0, 0.0),
                ScreenPoint::new(100.0, 100.0),
            ],
            1.0,
        )
        .unwrap()
        .with_label("Garden");
        let feature = el.to_feature(&Fixed).unwrap();
        assert_eq!(feature.geometry.type_name(), "Polygon");
        assert_eq!(feature.style.label.as_deref(), Some("Garden"));
        let bbox = feature.bbox().unwrap();
        assert!((bbox.east() - 58.1).abs() < 1e-9);
        assert!((bbox.south() - 23.9).abs() < 1e-9);
    }
}
