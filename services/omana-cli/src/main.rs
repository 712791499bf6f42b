//! Omana address map command-line tool.
//!
//! Locates points on the block grid, formats and parses address codes,
//! projects coordinates, fetches OSM buildings and manages the locally
//! persisted drawings, house notes and civil-number links.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use omana_common::{ElementKind, ScreenPoint};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "omana")]
#[command(about = "Grid addressing and mapping tools for Omani blocks")]
struct Args {
    /// Layout/configuration YAML (built-in demo layout when omitted)
    #[arg(long, global = true, env = "OMANA_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding persisted map state
    #[arg(long, global = true, env = "OMANA_STORE_DIR", default_value = ".omana")]
    store_dir: PathBuf,

    /// Mapbox access token for static map URLs
    #[arg(long, global = true, env = "MAPBOX_TOKEN", hide_env_values = true)]
    mapbox_token: Option<String>,

    /// Overpass interpreter endpoint override
    #[arg(long, global = true, env = "OVERPASS_URL")]
    overpass_url: Option<String>,

    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the zone and plot containing a planar point
    Locate {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Generate the address codes for a house at a planar point
    Encode {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        /// Sequential index of the house
        #[arg(long, default_value = "0")]
        seq: u64,
    },

    /// Parse a Local or National address code
    Decode { code: String },

    /// Geographic position to surface pixels
    Project {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },

    /// Surface pixels to geographic position
    Unproject {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Find the feature under a surface pixel
    Pick {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        /// Feature files (from `fetch --out`), one layer each, in priority order
        #[arg(long = "features")]
        feature_files: Vec<PathBuf>,
        /// Pick radius in pixels (configured default when omitted)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Generate addresses for a batch of points
    Generate {
        /// File of `x,y` lines; random points over the layout when omitted
        #[arg(long)]
        points: Option<PathBuf>,
        /// Number of random points
        #[arg(long, default_value = "20")]
        count: usize,
        /// Seed for random points and mock cards
        #[arg(long)]
        seed: Option<u64>,
        /// Also issue a mock ID card for every address
        #[arg(long)]
        cards: bool,
    },

    /// Validate or generate civil numbers
    Civil {
        /// Number to validate
        number: Option<String>,
        /// How many numbers to generate when none is given
        #[arg(long, default_value = "1")]
        count: usize,
    },

    /// Fetch building footprints from Overpass
    Fetch {
        /// Governorate codes (e.g. MSC); all eleven when neither this nor --bbox is set
        #[arg(long = "governorate")]
        governorates: Vec<String>,
        /// Explicit box as west,south,east,north
        #[arg(long, conflicts_with = "governorates", allow_hyphen_values = true)]
        bbox: Option<String>,
        /// Write fetched features to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print base-map URLs for a position
    TileUrl {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, default_value = "16")]
        zoom: u32,
        /// Also build a Mapbox static image URL
        #[arg(long)]
        mapbox: bool,
        #[arg(long, default_value = "600")]
        width: u32,
        #[arg(long, default_value = "400")]
        height: u32,
    },

    /// Manage house notes
    Notes {
        #[command(subcommand)]
        action: NotesAction,
    },

    /// Link a civil number to a house
    Link { civil_number: String, house_id: String },

    /// Remove the link for a civil number
    Unlink { civil_number: String },

    /// Manage drawn walls, plots and doors
    Draw {
        #[command(subcommand)]
        action: DrawAction,
    },
}

#[derive(Subcommand, Debug)]
enum NotesAction {
    Set { house_id: String, text: String },
    Get { house_id: String },
    Clear { house_id: String },
    List,
}

#[derive(Subcommand, Debug)]
enum DrawAction {
    /// Add an element from surface points (`x,y`), snapped to the grid
    Add {
        /// wall, plot or door
        #[arg(value_parser = parse_kind)]
        kind: ElementKind,
        #[arg(required = true, value_parser = parse_point)]
        points: Vec<ScreenPoint>,
        #[arg(long)]
        label: Option<String>,
    },
    Remove { id: uuid::Uuid },
    List,
    /// Export drawings as a GeoJSON FeatureCollection
    Export,
}

fn parse_kind(s: &str) -> Result<ElementKind, String> {
    ElementKind::parse(s).ok_or_else(|| format!("unknown element kind '{}'", s))
}

fn parse_point(s: &str) -> Result<ScreenPoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x in '{}'", s))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y in '{}'", s))?;
    Ok(ScreenPoint::new(x, y))
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries command output, logs go to stderr
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args)?;

    let config = config::load(
        args.config.as_deref(),
        args.mapbox_token.clone(),
        args.overpass_url.clone(),
    )?;
    debug!(zones = config.layout.zones.len(), "Configuration ready");

    commands::run(args.command, &config, &args.store_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("13,27").unwrap(), ScreenPoint::new(13.0, 27.0));
        assert_eq!(parse_point(" 1.5 , -2 ").unwrap(), ScreenPoint::new(1.5, -2.0));
        assert!(parse_point("13").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_cli_parses_draw() {
        let args = Args::try_parse_from(["omana", "draw", "add", "wall", "0,0", "100,0", "--label", "North"])
            .unwrap();
        match args.command {
            Command::Draw {
                action: DrawAction::Add { kind, points, label },
            } => {
                assert_eq!(kind, ElementKind::Wall);
                assert_eq!(points.len(), 2);
                assert_eq!(label.as_deref(), Some("North"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_conflicting_fetch_args() {
        assert!(Args::try_parse_from([
            "omana",
            "fetch",
            "--governorate",
            "MSC",
            "--bbox",
            "58,23,59,24"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
