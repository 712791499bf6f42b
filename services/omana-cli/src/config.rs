//! Configuration loading with command-line and environment overrides.

use std::path::Path;

use anyhow::{Context, Result};
use omana_common::MapConfig;
use tracing::info;

/// Load the layout from `path`, or fall back to the built-in demo layout,
/// then apply credential and endpoint overrides.
pub fn load(
    path: Option<&Path>,
    mapbox_token: Option<String>,
    overpass_url: Option<String>,
) -> Result<MapConfig> {
    let mut config = match path {
        Some(path) => MapConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            info!("No configuration file given, using built-in layout");
            MapConfig::builtin()
        }
    };

    if let Some(token) = mapbox_token.filter(|t| !t.trim().is_empty()) {
        config.tiles.mapbox_token = Some(token);
    }
    if let Some(url) = overpass_url.filter(|u| !u.trim().is_empty()) {
        info!(endpoint = %url, "Using Overpass endpoint override");
        config.overpass.endpoint = url;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_with_overrides() {
        let config = load(
            None,
            Some("pk.test".to_string()),
            Some("http://localhost:12345/api/interpreter".to_string()),
        )
        .unwrap();
        assert_eq!(config.tiles.mapbox_token.as_deref(), Some("pk.test"));
        assert_eq!(config.overpass.endpoint, "http://localhost:12345/api/interpreter");
    }

    #[test]
    fn test_blank_overrides_ignored() {
        let config = load(None, Some("  ".to_string()), Some(String::new())).unwrap();
        assert!(config.tiles.mapbox_token.is_none());
        assert_eq!(config.overpass.endpoint, "https://overpass-api.de/api/interpreter");
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load(Some(Path::new("/no/such/omana.yaml")), None, None).unwrap_err();
        assert!(err.to_string().contains("/no/such/omana.yaml"));
    }
}
