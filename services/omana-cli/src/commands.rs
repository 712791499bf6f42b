//! Subcommand handlers.
//!
//! Every handler prints its result to stdout as pretty JSON or a URL.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use gis_address::{locate, AddressCode, AddressGenerator, CivilNumber, IdCard};
use omana_common::tile::tile_for_point;
use omana_common::{
    BoundingBox, CrsCode, Feature, GeoPoint, Layer, MapConfig, MapElement, Project,
};
use osm_client::{Governorate, OverpassClient, TileUrls, GOVERNORATES};
use projection::{pick_feature, LinearProjector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;
use storage::{LocalStore, MapState};
use tracing::{info, warn};

use crate::{Command, DrawAction, NotesAction};

const DRAWINGS_LAYER: &str = "drawings";

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(command: Command, config: &MapConfig, store_dir: &Path) -> Result<()> {
    match command {
        Command::Locate { x, y } => locate_point(config, x, y),
        Command::Encode { x, y, seq } => encode(config, x, y, seq),
        Command::Decode { code } => decode(&code),
        Command::Project { lat, lng } => {
            let projector = LinearProjector::from_settings(&config.map)?;
            let p = projector.project(lat, lng);
            print_json(&json!({ "x": p.x, "y": p.y, "on_surface": projector.on_surface(p) }))
        }
        Command::Unproject { x, y } => {
            let projector = LinearProjector::from_settings(&config.map)?;
            print_json(&projector.unproject(x, y))
        }
        Command::Pick {
            x,
            y,
            feature_files,
            threshold,
        } => pick(config, store_dir, x, y, &feature_files, threshold),
        Command::Generate {
            points,
            count,
            seed,
            cards,
        } => generate(config, points.as_deref(), count, seed, cards),
        Command::Civil { number, count } => civil(number.as_deref(), count),
        Command::Fetch {
            governorates,
            bbox,
            out,
        } => fetch(config, &governorates, bbox.as_deref(), out.as_deref()).await,
        Command::TileUrl {
            lat,
            lng,
            zoom,
            mapbox,
            width,
            height,
        } => {
            let urls = TileUrls::from_settings(&config.tiles);
            let center = GeoPoint::new(lat, lng);
            let tile = tile_for_point(center, zoom);
            let mut out = json!({ "tile": tile.path(), "osm": urls.osm(&tile) });
            if mapbox {
                out["mapbox"] = json!(urls.mapbox_static(center, f64::from(zoom), width, height)?);
            }
            print_json(&out)
        }
        Command::Notes { action } => notes(store_dir, action),
        Command::Link {
            civil_number,
            house_id,
        } => {
            let civil: CivilNumber = civil_number.parse()?;
            with_state(store_dir, |state| {
                if let Some(previous) = state.link(civil.clone(), &house_id) {
                    info!(civil = %civil, previous = %previous, "Replaced existing link");
                }
                print_json(&json!({ "civil_number": civil, "house_id": house_id }))
            })
        }
        Command::Unlink { civil_number } => {
            let civil: CivilNumber = civil_number.parse()?;
            with_state(store_dir, |state| match state.unlink(&civil) {
                Some(house) => print_json(&json!({ "civil_number": civil, "unlinked_from": house })),
                None => bail!("civil number {} is not linked", civil),
            })
        }
        Command::Draw { action } => draw(config, store_dir, action),
    }
}

/// Load state, apply `f`, and save only when `f` succeeds.
fn with_state<F>(store_dir: &Path, f: F) -> Result<()>
where
    F: FnOnce(&mut MapState) -> Result<()>,
{
    let store = LocalStore::open(store_dir)?;
    let mut state = MapState::load(&store);
    f(&mut state)?;
    state.save(&store).context("Failed to save map state")?;
    Ok(())
}

fn locate_point(config: &MapConfig, x: f64, y: f64) -> Result<()> {
    match locate(x, y, &config.layout.zones, config.map.grid_size) {
        Some(found) => {
            let (sector, region) = config.layout.lineage(found.zone)?;
            print_json(&json!({
                "zone": found.zone.code,
                "sector": sector.code,
                "region": region.code,
                "plot": found.plot,
                "in_grid": found.in_grid(),
            }))
        }
        None => print_json(&json!({ "zone": null })),
    }
}

fn encode(config: &MapConfig, x: f64, y: f64, seq: u64) -> Result<()> {
    let generator = AddressGenerator::new(&config.layout, config.map.grid_size)?;
    let address = generator.address_for(x, y, seq)?;
    print_json(&json!({
        "address": address,
        "local": address.local_code().map(|c| c.to_string()).map_err(|e| e.to_string()),
        "national": address.national_code().map(|c| c.to_string()).map_err(|e| e.to_string()),
    }))
}

fn decode(code: &str) -> Result<()> {
    let parsed = AddressCode::parse(code.trim())
        .ok_or_else(|| anyhow!("'{}' is not a valid Local or National address code", code))?;
    print_json(&parsed)
}

fn drawings_layer(state: &MapState, projector: &LinearProjector) -> Result<Layer> {
    let mut layer = Layer::new(DRAWINGS_LAYER, "Drawings");
    let features = state
        .elements()
        .iter()
        .map(|e| e.to_feature(projector))
        .collect::<Result<Vec<_>, _>>()?;
    layer.rebuild(features);
    Ok(layer)
}

fn read_features(path: &Path) -> Result<Vec<Feature>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read features from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a feature list", path.display()))
}

fn pick(
    config: &MapConfig,
    store_dir: &Path,
    x: f64,
    y: f64,
    feature_files: &[std::path::PathBuf],
    threshold: Option<f64>,
) -> Result<()> {
    let projector = LinearProjector::from_settings(&config.map)?;
    let store = LocalStore::open(store_dir)?;
    let state = MapState::load(&store);

    // User drawings sit above fetched layers
    let mut layers = vec![drawings_layer(&state, &projector)?];
    for path in feature_files {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("features")
            .to_string();
        let mut layer = Layer::new(id.clone(), id);
        layer.rebuild(read_features(path)?);
        layers.push(layer);
    }

    let pointer = omana_common::ScreenPoint::new(x, y);
    let threshold = threshold.unwrap_or(config.map.hit_threshold);
    match pick_feature(&layers, &projector, pointer, threshold) {
        Some(hit) => print_json(&json!({
            "layer": hit.layer_id,
            "distance": hit.distance,
            "feature": hit.feature,
        })),
        None => print_json(&json!({ "feature": null })),
    }
}

fn read_points(path: &Path) -> Result<Vec<(f64, f64)>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read points from {}", path.display()))?;
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|line| {
            crate::parse_point(line)
                .map(|p| (p.x, p.y))
                .map_err(|e| anyhow!(e))
        })
        .collect()
}

fn random_points(config: &MapConfig, rng: &mut StdRng, count: usize) -> Vec<(f64, f64)> {
    let zones = &config.layout.zones;
    if zones.is_empty() {
        return Vec::new();
    }
    (0..count)
        .filter_map(|_| {
            let zone = &zones[rng.gen_range(0..zones.len())];
            if zone.width() <= 0.0 || zone.height() <= 0.0 {
                return None;
            }
            Some((
                rng.gen_range(zone.start_x..zone.end_x),
                rng.gen_range(zone.start_y..zone.end_y),
            ))
        })
        .collect()
}

fn generate(
    config: &MapConfig,
    points: Option<&Path>,
    count: usize,
    seed: Option<u64>,
    cards: bool,
) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let points = match points {
        Some(path) => read_points(path)?,
        None => random_points(config, &mut rng, count),
    };

    let generator = AddressGenerator::new(&config.layout, config.map.grid_size)?;
    let report = generator.generate_batch(&points)?;

    let today = Utc::now().date_naive();
    let mut rows = Vec::with_capacity(report.addresses.len());
    for address in &report.addresses {
        let mut row = json!({
            "address": address,
            "local": address.local_code().ok().map(|c| c.to_string()),
            "national": address.national_code().ok().map(|c| c.to_string()),
        });
        if cards {
            match IdCard::mock(&mut rng, address, today) {
                Ok(card) => row["id_card"] = json!(card),
                Err(e) => warn!(block = %address.block_code, error = %e, "No ID card for address"),
            }
        }
        rows.push(row);
    }

    print_json(&json!({
        "addresses": rows,
        "collisions": report.collisions,
        "fallbacks": report.fallbacks,
    }))
}

fn civil(number: Option<&str>, count: usize) -> Result<()> {
    match number {
        Some(number) => {
            let parsed: CivilNumber = number.trim().parse()?;
            print_json(&json!({ "civil_number": parsed, "valid": true }))
        }
        None => {
            let mut rng = rand::thread_rng();
            let numbers: Vec<CivilNumber> =
                (0..count).map(|_| CivilNumber::generate(&mut rng)).collect();
            print_json(&numbers)
        }
    }
}

async fn fetch(
    config: &MapConfig,
    codes: &[String],
    bbox: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let client = OverpassClient::new(&config.overpass)?;

    let (features, summary) = match bbox {
        Some(bbox) => {
            let bounds = BoundingBox::from_bbox_string(bbox)
                .with_context(|| format!("Invalid --bbox '{}'", bbox))?;
            let features = client.fetch_buildings(&bounds).await?;
            let summary = json!({ "bbox": bounds.to_overpass_string(), "count": features.len() });
            (features, summary)
        }
        None => {
            let selection: Vec<Governorate> = if codes.is_empty() {
                GOVERNORATES.to_vec()
            } else {
                codes
                    .iter()
                    .map(|c| {
                        Governorate::by_code(c)
                            .copied()
                            .ok_or_else(|| anyhow!("unknown governorate '{}'", c))
                    })
                    .collect::<Result<_>>()?
            };

            let results = client.fetch_all(&selection).await;
            let summary = json!(results
                .iter()
                .map(|(code, f)| json!({ "governorate": code, "count": f.len() }))
                .collect::<Vec<_>>());
            (results.into_iter().flat_map(|(_, f)| f).collect(), summary)
        }
    };

    if let Some(path) = out {
        let body = serde_json::to_string(&features)?;
        fs::write(path, body)
            .with_context(|| format!("Failed to write features to {}", path.display()))?;
        info!(path = %path.display(), count = features.len(), "Wrote features");
    }
    print_json(&summary)
}

fn notes(store_dir: &Path, action: NotesAction) -> Result<()> {
    match action {
        NotesAction::Set { house_id, text } => with_state(store_dir, |state| {
            state.set_note(&house_id, &text);
            print_json(&json!({ "house_id": house_id, "note": state.note(&house_id) }))
        }),
        NotesAction::Clear { house_id } => with_state(store_dir, |state| {
            let cleared = state.clear_note(&house_id);
            print_json(&json!({ "house_id": house_id, "cleared": cleared }))
        }),
        NotesAction::Get { house_id } => {
            let state = MapState::load(&LocalStore::open(store_dir)?);
            print_json(&json!({
                "house_id": house_id,
                "note": state.note(&house_id),
                "civil_numbers": state.civils_for(&house_id),
            }))
        }
        NotesAction::List => {
            let state = MapState::load(&LocalStore::open(store_dir)?);
            let notes: serde_json::Map<String, serde_json::Value> = state
                .notes()
                .map(|(house, note)| (house.to_string(), json!(note)))
                .collect();
            print_json(&notes)
        }
    }
}

fn draw(config: &MapConfig, store_dir: &Path, action: DrawAction) -> Result<()> {
    let projector = LinearProjector::from_settings(&config.map)?;
    match action {
        DrawAction::Add {
            kind,
            points,
            label,
        } => with_state(store_dir, |state| {
            let mut element = MapElement::new(kind, &points, config.map.snap_cell)?;
            if let Some(label) = label {
                element = element.with_label(label);
            }
            let feature = element.to_feature(&projector)?;
            print_json(&json!({ "element": element, "feature": feature.to_geojson() }))?;
            state.add_element(element);
            Ok(())
        }),
        DrawAction::Remove { id } => with_state(store_dir, |state| match state.remove_element(id) {
            Some(element) => print_json(&element),
            None => bail!("no drawn element with id {}", id),
        }),
        DrawAction::List => {
            let state = MapState::load(&LocalStore::open(store_dir)?);
            print_json(state.elements())
        }
        DrawAction::Export => {
            let state = MapState::load(&LocalStore::open(store_dir)?);
            let mut project = Project::new(DRAWINGS_LAYER, CrsCode::Epsg4326, config.map.bounds);
            project.add_layer(drawings_layer(&state, &projector)?)?;
            print_json(&project.to_geojson())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_points_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.txt");
        fs::write(&path, "# houses\n10,20\n\n 30.5 , 40\n").unwrap();
        assert_eq!(read_points(&path).unwrap(), vec![(10.0, 20.0), (30.5, 40.0)]);

        fs::write(&path, "10;20\n").unwrap();
        assert!(read_points(&path).is_err());
    }

    #[test]
    fn test_random_points_stay_in_zones() {
        let config = MapConfig::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        let points = random_points(&config, &mut rng, 50);
        assert_eq!(points.len(), 50);
        for (x, y) in points {
            assert!(locate(x, y, &config.layout.zones, 10).is_some());
        }
    }

    #[test]
    fn test_with_state_saves_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        with_state(dir.path(), |state| {
            state.set_note("h1", "kept");
            Ok(())
        })
        .unwrap();
        let failed = with_state(dir.path(), |state| {
            state.set_note("h1", "dropped");
            bail!("abort")
        });
        assert!(failed.is_err());

        let state = MapState::load(&LocalStore::open(dir.path()).unwrap());
        assert_eq!(state.note("h1").unwrap().text, "kept");
    }

    #[test]
    fn test_drawings_layer_projects_elements() {
        let config = MapConfig::builtin();
        let projector = LinearProjector::from_settings(&config.map).unwrap();
        let mut state = MapState::new();
        state.add_element(
            MapElement::new(
                omana_common::ElementKind::Door,
                &[
                    omana_common::ScreenPoint::new(100.0, 100.0),
                    omana_common::ScreenPoint::new(120.0, 100.0),
                ],
                config.map.snap_cell,
            )
            .unwrap(),
        );
        let layer = drawings_layer(&state, &projector).unwrap();
        assert_eq!(layer.features.len(), 1);
        assert!(config.map.bounds.contains(layer.features[0].geometry.positions()[0]));
    }
}
