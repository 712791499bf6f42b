//! Screen-space feature picking.
//!
//! A linear scan over every feature of every visible layer, in layer order
//! and then feature order. The first feature within the pixel threshold is
//! returned, even if a later one is closer: layer order doubles as pick
//! priority. There is no spatial index.

use omana_common::{Feature, Geometry, GeoPoint, Layer, ScreenPoint, ScreenTransform};
use tracing::trace;

/// Default pick radius in pixels.
pub const DEFAULT_HIT_THRESHOLD: f64 = 12.0;

/// A picked feature.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub layer_id: &'a str,
    pub feature: &'a Feature,
    /// Screen distance from the pointer to the feature, in pixels
    pub distance: f64,
}

/// Return the first feature of the visible `layers` within `threshold`
/// pixels of `pointer`.
pub fn pick_feature<'a, T>(
    layers: impl IntoIterator<Item = &'a Layer>,
    transform: &T,
    pointer: ScreenPoint,
    threshold: f64,
) -> Option<Hit<'a>>
where
    T: ScreenTransform + ?Sized,
{
    for layer in layers.into_iter().filter(|l| l.visible) {
        for feature in &layer.features {
            let distance = screen_distance(&feature.geometry, transform, pointer);
            if distance <= threshold {
                trace!(layer = %layer.id, feature = %feature.id, distance, "Picked feature");
                return Some(Hit {
                    layer_id: &layer.id.0,
                    feature,
                    distance,
                });
            }
        }
    }
    None
}

/// Every feature within `threshold`, in scan order.
pub fn features_within<'a, T>(
    layers: impl IntoIterator<Item = &'a Layer>,
    transform: &T,
    pointer: ScreenPoint,
    threshold: f64,
) -> Vec<Hit<'a>>
where
    T: ScreenTransform + ?Sized,
{
    let mut hits = Vec::new();
    for layer in layers.into_iter().filter(|l| l.visible) {
        for feature in &layer.features {
            let distance = screen_distance(&feature.geometry, transform, pointer);
            if distance <= threshold {
                hits.push(Hit {
                    layer_id: &layer.id.0,
                    feature,
                    distance,
                });
            }
        }
    }
    hits
}

/// Pixel distance from `pointer` to a geometry.
///
/// Points use the distance to the projected position, line strings the
/// distance to the nearest segment. Polygons are zero inside the exterior
/// ring, otherwise the distance to the nearest ring edge.
pub fn screen_distance<T>(geometry: &Geometry, transform: &T, pointer: ScreenPoint) -> f64
where
    T: ScreenTransform + ?Sized,
{
    let project = |c: &[f64; 2]| transform.to_screen(GeoPoint::from_lng_lat(*c));

    match geometry {
        Geometry::Point { coordinates } => project(coordinates).distance_to(pointer),
        Geometry::LineString { coordinates } => {
            let pts: Vec<ScreenPoint> = coordinates.iter().map(project).collect();
            polyline_distance(&pts, pointer)
        }
        Geometry::Polygon { coordinates } => {
            let rings: Vec<Vec<ScreenPoint>> = coordinates
                .iter()
                .map(|ring| ring.iter().map(project).collect())
                .collect();
            match rings.first() {
                Some(exterior) if point_in_ring(exterior, pointer) => 0.0,
                _ => rings
                    .iter()
                    .map(|ring| polyline_distance(ring, pointer))
                    .fold(f64::INFINITY, f64::min),
            }
        }
    }
}

fn polyline_distance(points: &[ScreenPoint], p: ScreenPoint) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => only.distance_to(p),
        _ => points
            .windows(2)
            .map(|w| segment_distance(w[0], w[1], p))
            .fold(f64::INFINITY, f64::min),
    }
}

fn segment_distance(a: ScreenPoint, b: ScreenPoint, p: ScreenPoint) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a.distance_to(p);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    ScreenPoint::new(a.x + t * dx, a.y + t * dy).distance_to(p)
}

/// Even-odd ray casting.
fn point_in_ring(ring: &[ScreenPoint], p: ScreenPoint) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        let a = ScreenPoint::new(0.0, 0.0);
        let b = ScreenPoint::new(10.0, 0.0);
        assert_eq!(segment_distance(a, b, ScreenPoint::new(5.0, 3.0)), 3.0);
        assert_eq!(segment_distance(a, b, ScreenPoint::new(13.0, 4.0)), 5.0);
        assert_eq!(segment_distance(a, a, ScreenPoint::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_point_in_ring() {
        let square = [
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(10.0, 0.0),
            ScreenPoint::new(10.0, 10.0),
            ScreenPoint::new(0.0, 10.0),
            ScreenPoint::new(0.0, 0.0),
        ];
        assert!(point_in_ring(&square, ScreenPoint::new(5.0, 5.0)));
        assert!(!point_in_ring(&square, ScreenPoint::new(15.0, 5.0)));
    }

    #[test]
    fn test_polyline_distance_empty() {
        assert!(polyline_distance(&[], ScreenPoint::new(0.0, 0.0)).is_infinite());
    }
}
