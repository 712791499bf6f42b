//! Linear (plate carrée) projection onto a fixed-size drawing surface.
//!
//! Each axis is interpolated independently between the edges of a
//! geographic bounding box:
//!
//! - `x = (lng - west) / (east - west) * width + margin_x`
//! - `y = (north - lat) / (north - south) * height + margin_y`
//!
//! Y is flipped because north is up on screen. No Mercator or ellipsoid
//! correction is applied.

use omana_common::{
    BoundingBox, GeoPoint, MapSettings, OmanaError, OmanaResult, ScreenPoint, ScreenTransform,
};

/// Linear projector between a geographic box and a pixel surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearProjector {
    /// Geographic extent mapped onto the surface
    pub bounds: BoundingBox,
    /// Drawable width in pixels (excluding margins)
    pub width: f64,
    /// Drawable height in pixels (excluding margins)
    pub height: f64,
    /// Horizontal offset added to every projected x
    pub margin_x: f64,
    /// Vertical offset added to every projected y
    pub margin_y: f64,
}

impl LinearProjector {
    /// Create a projector with no margins.
    pub fn new(bounds: BoundingBox, width: f64, height: f64) -> OmanaResult<Self> {
        Self::with_margins(bounds, width, height, 0.0, 0.0)
    }

    /// Create a projector with explicit margins.
    ///
    /// Fails when the bounds span zero (or negative) degrees on either axis
    /// or the surface has a non-positive size, since both would make the
    /// interpolation divide by zero.
    pub fn with_margins(
        bounds: BoundingBox,
        width: f64,
        height: f64,
        margin_x: f64,
        margin_y: f64,
    ) -> OmanaResult<Self> {
        if !bounds.is_valid() {
            return Err(OmanaError::ProjectionError(format!(
                "bounds must span a positive area, got west={} south={} east={} north={}",
                bounds.west(),
                bounds.south(),
                bounds.east(),
                bounds.north()
            )));
        }
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(OmanaError::ProjectionError(format!(
                "surface must have a positive size, got {}x{}",
                width, height
            )));
        }

        Ok(Self {
            bounds,
            width,
            height,
            margin_x,
            margin_y,
        })
    }

    /// Build from the `map` section of the configuration.
    pub fn from_settings(settings: &MapSettings) -> OmanaResult<Self> {
        Self::with_margins(
            settings.bounds,
            settings.surface_width,
            settings.surface_height,
            settings.margin_x,
            settings.margin_y,
        )
    }

    /// Project a geographic position to surface pixels.
    pub fn project(&self, lat: f64, lng: f64) -> ScreenPoint {
        let b = &self.bounds;
        let x = (lng - b.west()) / (b.east() - b.west()) * self.width + self.margin_x;
        let y = (b.north() - lat) / (b.north() - b.south()) * self.height + self.margin_y;
        ScreenPoint::new(x, y)
    }

    /// Inverse of [`project`](Self::project).
    pub fn unproject(&self, screen_x: f64, screen_y: f64) -> GeoPoint {
        let b = &self.bounds;
        let lng = (screen_x - self.margin_x) / self.width * (b.east() - b.west()) + b.west();
        let lat = b.north() - (screen_y - self.margin_y) / self.height * (b.north() - b.south());
        GeoPoint::new(lat, lng)
    }

    /// Whether a screen point falls on the drawable area (margins excluded).
    pub fn on_surface(&self, point: ScreenPoint) -> bool {
        point.x >= self.margin_x
            && point.x <= self.margin_x + self.width
            && point.y >= self.margin_y
            && point.y <= self.margin_y + self.height
    }

    /// Pixels per degree along each axis.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.width / self.bounds.width(),
            self.height / self.bounds.height(),
        )
    }
}

impl ScreenTransform for LinearProjector {
    fn to_screen(&self, point: GeoPoint) -> ScreenPoint {
        self.project(point.lat, point.lng)
    }

    fn to_geo(&self, point: ScreenPoint) -> GeoPoint {
        self.unproject(point.x, point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> LinearProjector {
        LinearProjector::new(BoundingBox::from_edges(58.0, 23.0, 59.0, 24.0), 1000.0, 1000.0)
            .unwrap()
    }

    #[test]
    fn test_corners() {
        let proj = unit();

        let nw = proj.project(24.0, 58.0);
        assert_eq!((nw.x, nw.y), (0.0, 0.0));

        let se = proj.project(23.0, 59.0);
        assert_eq!((se.x, se.y), (1000.0, 1000.0));
    }

    #[test]
    fn test_y_axis_flipped() {
        let proj = unit();
        let north = proj.project(23.9, 58.5);
        let south = proj.project(23.1, 58.5);
        assert!(north.y < south.y, "north should be above south: {} vs {}", north.y, south.y);
    }

    #[test]
    fn test_margins_offset() {
        let proj = LinearProjector::with_margins(
            BoundingBox::from_edges(58.0, 23.0, 59.0, 24.0),
            800.0,
            600.0,
            20.0,
            10.0,
        )
        .unwrap();
        let p = proj.project(23.5, 58.5);
        assert!((p.x - 420.0).abs() < 1e-9, "x got {}", p.x);
        assert!((p.y - 310.0).abs() < 1e-9, "y got {}", p.y);
        assert!(proj.on_surface(p));
        assert!(!proj.on_surface(ScreenPoint::new(5.0, 5.0)));
    }

    #[test]
    fn test_roundtrip() {
        let proj = LinearProjector::with_margins(
            BoundingBox::from_edges(58.30, 23.55, 58.50, 23.65),
            1024.0,
            768.0,
            16.0,
            16.0,
        )
        .unwrap();

        let (lat, lng) = (23.5891, 58.4102);
        let screen = proj.project(lat, lng);
        let back = proj.unproject(screen.x, screen.y);

        assert!((back.lat - lat).abs() < 1e-12, "lat roundtrip failed: {} vs {}", lat, back.lat);
        assert!((back.lng - lng).abs() < 1e-12, "lng roundtrip failed: {} vs {}", lng, back.lng);
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        let flat = BoundingBox::from_edges(58.0, 23.0, 58.0, 24.0);
        assert!(matches!(
            LinearProjector::new(flat, 100.0, 100.0),
            Err(OmanaError::ProjectionError(_))
        ));
    }

    #[test]
    fn test_zero_surface_rejected() {
        let b = BoundingBox::from_edges(58.0, 23.0, 59.0, 24.0);
        assert!(LinearProjector::new(b, 0.0, 100.0).is_err());
        assert!(LinearProjector::new(b, 100.0, f64::NAN).is_err());
    }

    #[test]
    fn test_scale() {
        let (sx, sy) = unit().scale();
        assert_eq!(sx, 1000.0);
        assert_eq!(sy, 1000.0);
    }
}
