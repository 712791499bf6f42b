//! Base-map tile and static image URLs.

use omana_common::{GeoPoint, OmanaError, OmanaResult, TileCoord, TileSettings};

const OSM_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const MAPBOX_STATIC_BASE: &str = "https://api.mapbox.com/styles/v1";

fn fill_template(template: &str, tile: &TileCoord) -> String {
    template
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
}

/// Standard OpenStreetMap raster tile URL.
pub fn osm_tile_url(tile: &TileCoord) -> String {
    fill_template(OSM_TEMPLATE, tile)
}

/// Mapbox Static Images API URL centered on `center`.
pub fn mapbox_static_url(
    style: &str,
    center: GeoPoint,
    zoom: f64,
    width: u32,
    height: u32,
    token: &str,
) -> OmanaResult<String> {
    if token.trim().is_empty() {
        return Err(OmanaError::ConfigError(
            "a Mapbox access token is required (set MAPBOX_TOKEN)".to_string(),
        ));
    }
    if width == 0 || height == 0 || width > 1280 || height > 1280 {
        return Err(OmanaError::invalid_parameter(
            "size",
            format!("{}x{} is outside 1..=1280", width, height),
        ));
    }
    Ok(format!(
        "{}/{}/static/{:.6},{:.6},{}/{}x{}?access_token={}",
        MAPBOX_STATIC_BASE, style, center.lng, center.lat, zoom, width, height, token
    ))
}

/// URL builders bound to configured templates and credentials.
#[derive(Debug, Clone)]
pub struct TileUrls {
    osm_template: String,
    mapbox_style: String,
    mapbox_token: Option<String>,
}

impl TileUrls {
    pub fn from_settings(settings: &TileSettings) -> Self {
        Self {
            osm_template: settings.osm_template.clone(),
            mapbox_style: settings.mapbox_style.clone(),
            mapbox_token: settings.mapbox_token.clone(),
        }
    }

    pub fn osm(&self, tile: &TileCoord) -> String {
        fill_template(&self.osm_template, tile)
    }

    pub fn mapbox_static(
        &self,
        center: GeoPoint,
        zoom: f64,
        width: u32,
        height: u32,
    ) -> OmanaResult<String> {
        let token = self.mapbox_token.as_deref().unwrap_or_default();
        mapbox_static_url(&self.mapbox_style, center, zoom, width, height, token)
    }
}
