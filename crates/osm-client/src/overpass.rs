//! Overpass API queries and response parsing.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use omana_common::{
    BoundingBox, Feature, FeatureStyle, GeoPoint, Geometry, OmanaError, OmanaResult,
    OverpassSettings,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::governorate::Governorate;

/// Server-side timeout written into the query header, in seconds.
const QUERY_TIMEOUT_SECS: u32 = 25;

/// An Overpass QL query over a bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct OverpassQuery {
    pub bounds: BoundingBox,
    /// Element selector placed before the bbox, e.g. `way["building"]`
    pub selector: String,
    pub timeout_secs: u32,
}

impl OverpassQuery {
    /// Every building way in `bounds`, with the nodes they reference.
    pub fn buildings(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            selector: r#"way["building"]"#.to_string(),
            timeout_secs: QUERY_TIMEOUT_SECS,
        }
    }

    pub fn to_ql(&self) -> String {
        format!(
            "[out:json][timeout:{}];({}({}););out body;>;out skel qt;",
            self.timeout_secs,
            self.selector,
            self.bounds.to_overpass_string()
        )
    }
}

impl fmt::Display for OverpassQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ql())
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    element_type: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    nodes: Option<Vec<i64>>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

fn building_style(tags: &BTreeMap<String, String>) -> FeatureStyle {
    let color = if tags.contains_key("building") {
        "#B5651D"
    } else if tags.contains_key("barrier") {
        "#555555"
    } else {
        "#3388FF"
    };
    FeatureStyle {
        color: color.to_string(),
        size: 2.0,
        label: tags.get("name").cloned(),
    }
}

fn to_feature(
    kind: &str,
    id: i64,
    geometry: Geometry,
    tags: BTreeMap<String, String>,
) -> Feature {
    let style = building_style(&tags);
    let mut feature = Feature::new(format!("{}/{}", kind, id), geometry)
        .with_property("osm_id", id)
        .with_property("osm_type", kind)
        .with_style(style);
    for (key, value) in tags {
        feature = feature.with_property(key, value);
    }
    feature
}

/// Convert an Overpass JSON body into features.
///
/// Closed ways become polygons and open ways line strings. Nodes with tags
/// become points; untagged nodes only supply way coordinates. A way that
/// references a node missing from the response is skipped.
pub fn parse_overpass(body: &str) -> OmanaResult<Vec<Feature>> {
    let response: OverpassResponse = serde_json::from_str(body)
        .map_err(|e| OmanaError::ResponseParseError(format!("invalid Overpass JSON: {}", e)))?;

    let nodes: HashMap<i64, GeoPoint> = response
        .elements
        .iter()
        .filter(|e| e.element_type == "node")
        .filter_map(|e| Some((e.id, GeoPoint::new(e.lat?, e.lon?))))
        .collect();

    let mut features = Vec::new();
    let mut skipped = 0usize;
    for element in response.elements {
        match element.element_type.as_str() {
            "way" => {
                let Some(refs) = element.nodes else {
                    skipped += 1;
                    continue;
                };
                let points: Option<Vec<GeoPoint>> =
                    refs.iter().map(|id| nodes.get(id).copied()).collect();
                let Some(points) = points else {
                    debug!(way = element.id, "Way references unknown nodes, skipping");
                    skipped += 1;
                    continue;
                };

                let closed = refs.len() >= 4 && refs.first() == refs.last();
                let geometry = if closed {
                    Geometry::polygon(&points)
                } else {
                    Geometry::line_string(&points)
                };
                match geometry {
                    Ok(geometry) => {
                        features.push(to_feature("way", element.id, geometry, element.tags))
                    }
                    Err(e) => {
                        debug!(way = element.id, error = %e, "Degenerate way, skipping");
                        skipped += 1;
                    }
                }
            }
            "node" if !element.tags.is_empty() => {
                if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
                    features.push(to_feature(
                        "node",
                        element.id,
                        Geometry::point(lat, lon),
                        element.tags,
                    ));
                }
            }
            _ => {}
        }
    }

    debug!(features = features.len(), skipped, "Parsed Overpass response");
    Ok(features)
}

/// HTTP client for an Overpass interpreter endpoint.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    endpoint: String,
}

impl OverpassClient {
    pub fn new(settings: &OverpassSettings) -> OmanaResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(30)))
            .user_agent(concat!("omana-map/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OmanaError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a query and return the raw response body.
    pub async fn execute(&self, query: &OverpassQuery) -> OmanaResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.to_ql())])
            .send()
            .await
            .map_err(|e| OmanaError::NetworkError(format!("{}: {}", self.endpoint, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OmanaError::NetworkError(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let snippet: String = body.chars().take(256).collect();
            return Err(OmanaError::NetworkError(format!(
                "Overpass returned HTTP {}: {}",
                status, snippet
            )));
        }
        Ok(body)
    }

    /// Fetch building footprints in `bounds`.
    #[instrument(skip(self), fields(bbox = %bounds.to_overpass_string()))]
    pub async fn fetch_buildings(&self, bounds: &BoundingBox) -> OmanaResult<Vec<Feature>> {
        let body = self.execute(&OverpassQuery::buildings(*bounds)).await?;
        let features = parse_overpass(&body)?;
        info!(count = features.len(), "Fetched buildings");
        Ok(features)
    }

    /// Fetch buildings for each governorate, one request at a time.
    ///
    /// A failed governorate is logged and contributes an empty list.
    pub async fn fetch_all(
        &self,
        governorates: &[Governorate],
    ) -> Vec<(&'static str, Vec<Feature>)> {
        let mut results = Vec::with_capacity(governorates.len());
        for governorate in governorates {
            match self.fetch_buildings(&governorate.bounds()).await {
                Ok(features) => results.push((governorate.code, features)),
                Err(e) => {
                    error!(governorate = governorate.code, error = %e, "Overpass fetch failed");
                    results.push((governorate.code, Vec::new()));
                }
            }
        }

        let empty = results.iter().filter(|(_, f)| f.is_empty()).count();
        if empty > 0 {
            warn!(empty, total = results.len(), "Some governorates returned no features");
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buildings_query() {
        let q = OverpassQuery::buildings(BoundingBox::from_edges(58.3, 23.55, 58.5, 23.65));
        assert_eq!(
            q.to_ql(),
            "[out:json][timeout:25];(way[\"building\"](23.5500000,58.3000000,23.6500000,58.5000000););out body;>;out skel qt;"
        );
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_overpass("<html>rate limited</html>"),
            Err(OmanaError::ResponseParseError(_))
        ));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_overpass(r#"{"elements": []}"#).unwrap().is_empty());
        assert!(parse_overpass("{}").unwrap().is_empty());
    }
}
