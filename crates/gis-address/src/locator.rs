//! Geo-grid locator.
//!
//! Maps a planar point to the zone containing it and to a plot number in
//! the zone's `grid_size x grid_size` subdivision. Plots are numbered
//! row-major from 1 starting at the zone's `(start_x, start_y)` corner.

use omana_common::Zone;
use serde::Serialize;

/// Default subdivision of a zone along each axis.
pub const DEFAULT_GRID_SIZE: u32 = 10;

/// Result of locating a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneMatch<'a> {
    pub zone: &'a Zone,
    /// Plot number; may fall outside the grid, see [`ZoneMatch::in_grid`]
    pub plot: i64,
    pub grid_size: u32,
}

impl<'a> ZoneMatch<'a> {
    /// Locate `(x, y)` on a specific zone, whether or not it contains it.
    pub fn on_zone(zone: &'a Zone, x: f64, y: f64, grid_size: u32) -> Self {
        Self {
            zone,
            plot: plot_number(zone, x, y, grid_size),
            grid_size,
        }
    }

    /// Whether the plot lies in `1..=grid_size²`.
    pub fn in_grid(&self) -> bool {
        let cells = i64::from(self.grid_size) * i64::from(self.grid_size);
        (1..=cells).contains(&self.plot)
    }

    /// House number for the `seq`-th house placed in this plot.
    pub fn house_number(&self, seq: u64) -> i64 {
        house_number(self.plot, seq)
    }
}

/// Find the first zone containing `(x, y)`.
///
/// Containment is inclusive on every edge, so a point on a shared edge
/// belongs to whichever zone is listed first.
pub fn locate(x: f64, y: f64, zones: &[Zone], grid_size: u32) -> Option<ZoneMatch<'_>> {
    zones
        .iter()
        .find(|z| z.contains(x, y))
        .map(|zone| ZoneMatch::on_zone(zone, x, y, grid_size))
}

/// Like [`locate`], falling back to `default` when no zone contains the
/// point. The plot is then computed on the default zone's geometry and is
/// usually out of range.
pub fn locate_or<'a>(
    x: f64,
    y: f64,
    zones: &'a [Zone],
    default: &'a Zone,
    grid_size: u32,
) -> ZoneMatch<'a> {
    locate(x, y, zones, grid_size).unwrap_or_else(|| ZoneMatch::on_zone(default, x, y, grid_size))
}

/// Plot number of `(x, y)` within `zone`.
///
/// No clamping: a point on the far edge yields column or row `grid_size`,
/// and a point before the start corner yields a negative index.
pub fn plot_number(zone: &Zone, x: f64, y: f64, grid_size: u32) -> i64 {
    let grid = grid_size.max(1);
    let cell_w = zone.width() / f64::from(grid);
    let cell_h = zone.height() / f64::from(grid);

    // `as` saturates on infinities and maps NaN to 0 for degenerate zones
    let col = ((x - zone.start_x) / cell_w).floor() as i64;
    let row = ((y - zone.start_y) / cell_h).floor() as i64;

    row.saturating_mul(i64::from(grid))
        .saturating_add(col)
        .saturating_add(1)
}

/// `plot * 100 + (seq % 10) + 1`.
///
/// Only ten distinct houses per plot; the eleventh reuses the first
/// house's number.
pub fn house_number(plot: i64, seq: u64) -> i64 {
    plot.saturating_mul(100)
        .saturating_add((seq % 10) as i64 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(code: &str, rect: (f64, f64, f64, f64)) -> Zone {
        Zone {
            code: code.to_string(),
            name: code.to_string(),
            sector: "S-A".to_string(),
            number: 1,
            start_x: rect.0,
            start_y: rect.1,
            end_x: rect.2,
            end_y: rect.3,
        }
    }

    #[test]
    fn test_corner_plots() {
        let z = zone("A-001", (100.0, 100.0, 400.0, 300.0));
        assert_eq!(plot_number(&z, 100.0, 100.0, 10), 1);
        assert_eq!(plot_number(&z, 390.0, 290.0, 10), 100);
        assert_eq!(plot_number(&z, 130.0, 100.0, 10), 2);
        assert_eq!(plot_number(&z, 100.0, 120.0, 10), 11);
    }

    #[test]
    fn test_far_edge_is_out_of_grid() {
        let z = zone("A-001", (100.0, 100.0, 400.0, 300.0));
        let m = locate(400.0, 300.0, std::slice::from_ref(&z), 10).unwrap();
        assert_eq!(m.plot, 111);
        assert!(!m.in_grid());
    }

    #[test]
    fn test_house_number_wraps_every_ten() {
        assert_eq!(house_number(1, 0), 101);
        assert_eq!(house_number(1, 9), 110);
        assert_eq!(house_number(1, 10), 101);
        assert_eq!(house_number(45, 2), 4503);
    }

    #[test]
    fn test_zero_grid_treated_as_one() {
        let z = zone("A-001", (0.0, 0.0, 10.0, 10.0));
        assert_eq!(plot_number(&z, 5.0, 5.0, 0), 1);
    }

    #[test]
    fn test_degenerate_zone_does_not_panic() {
        let z = zone("A-001", (5.0, 5.0, 5.0, 5.0));
        let _ = plot_number(&z, 6.0, 6.0, 10);
        let _ = plot_number(&z, 5.0, 5.0, 10);
    }
}
