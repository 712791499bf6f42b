//! Test data generators for positions and Overpass responses.
//!
//! These generators create predictable, verifiable patterns that can be
//! used across the test suite.

/// Cell-center points for every cell of a `grid x grid` subdivision.
///
/// Points are returned row-major, so the n-th point (0-based) lies in plot
/// `n + 1` of the rectangle.
///
/// # Example
///
/// ```
/// use test_utils::cell_centers;
///
/// let pts = cell_centers((0.0, 0.0, 100.0, 100.0), 10);
/// assert_eq!(pts.len(), 100);
/// assert_eq!(pts[0], (5.0, 5.0));
/// assert_eq!(pts[11], (15.0, 15.0));
/// ```
pub fn cell_centers(rect: (f64, f64, f64, f64), grid: u32) -> Vec<(f64, f64)> {
    let (sx, sy, ex, ey) = rect;
    let cw = (ex - sx) / grid as f64;
    let ch = (ey - sy) / grid as f64;
    let mut points = Vec::with_capacity((grid * grid) as usize);
    for row in 0..grid {
        for col in 0..grid {
            points.push((
                sx + (col as f64 + 0.5) * cw,
                sy + (row as f64 + 0.5) * ch,
            ));
        }
    }
    points
}

/// Points evenly spaced along a horizontal line, `count` of them.
pub fn horizontal_run(start: (f64, f64), step: f64, count: usize) -> Vec<(f64, f64)> {
    (0..count)
        .map(|i| (start.0 + step * i as f64, start.1))
        .collect()
}

/// A minimal Overpass JSON body: one closed building way and one open way.
///
/// Node ids 1-4 form a square, way 100 is closed (building), way 200 is an
/// open two-node way, way 300 references a missing node.
pub fn overpass_sample_response() -> String {
    r#"{
  "version": 0.6,
  "generator": "Overpass API",
  "elements": [
    {"type": "way", "id": 100, "nodes": [1, 2, 3, 4, 1], "tags": {"building": "house", "name": "Bait Al Zubair"}},
    {"type": "way", "id": 200, "nodes": [1, 2], "tags": {"barrier": "wall"}},
    {"type": "way", "id": 300, "nodes": [1, 99], "tags": {"building": "yes"}},
    {"type": "node", "id": 1, "lat": 23.60, "lon": 58.40},
    {"type": "node", "id": 2, "lat": 23.60, "lon": 58.41},
    {"type": "node", "id": 3, "lat": 23.61, "lon": 58.41},
    {"type": "node", "id": 4, "lat": 23.61, "lon": 58.40},
    {"type": "node", "id": 5, "lat": 23.62, "lon": 58.42, "tags": {"entrance": "main"}}
  ]
}"#
    .to_string()
}
