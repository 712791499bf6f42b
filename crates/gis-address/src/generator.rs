//! Address generation for batches of house positions.

use std::collections::BTreeMap;

use omana_common::{AdminLayout, OmanaError, OmanaResult, Zone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::code::{LocalCode, NationalCode};
use crate::locator::{locate, ZoneMatch};

/// A fully resolved address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub region_code: String,
    pub wilayat_number: u32,
    pub sector_code: String,
    pub sector_letter: char,
    pub sector_number: u32,
    pub block_code: String,
    pub block_number: u32,
    pub plot_number: i64,
    pub house_number: i64,
    pub street_name: String,
    /// Position the address was generated for
    pub x: f64,
    pub y: f64,
    /// True when no zone contained the point and the first zone was used
    #[serde(default)]
    pub fallback: bool,
}

impl Address {
    /// Sector-level code. Region and block are dropped.
    pub fn local_code(&self) -> OmanaResult<LocalCode> {
        LocalCode::new(self.sector_letter, self.plot_number, self.house_number)
    }

    pub fn national_code(&self) -> OmanaResult<NationalCode> {
        NationalCode::new(
            &self.region_code,
            i64::from(self.wilayat_number),
            i64::from(self.sector_number),
            i64::from(self.block_number),
            self.plot_number,
            self.house_number,
        )
    }

    /// The fields two houses must share to receive the same code.
    pub fn key(&self) -> AddressKey {
        AddressKey {
            region: self.region_code.clone(),
            sector: self.sector_code.clone(),
            block: self.block_code.clone(),
            plot: self.plot_number,
            house: self.house_number,
        }
    }
}

/// Identity of an address for collision detection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AddressKey {
    pub region: String,
    pub sector: String,
    pub block: String,
    pub plot: i64,
    pub house: i64,
}

/// Addresses sharing one key, by index into the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub key: AddressKey,
    pub indices: Vec<usize>,
}

/// Output of [`AddressGenerator::generate_batch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub addresses: Vec<Address>,
    pub collisions: Vec<Collision>,
    /// Number of points that fell outside every zone
    pub fallbacks: usize,
}

/// Group addresses with identical keys, ordered by first occurrence.
pub fn find_collisions(addresses: &[Address]) -> Vec<Collision> {
    let mut groups: BTreeMap<AddressKey, Vec<usize>> = BTreeMap::new();
    for (idx, address) in addresses.iter().enumerate() {
        groups.entry(address.key()).or_default().push(idx);
    }

    let mut collisions: Vec<Collision> = groups
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(key, indices)| Collision { key, indices })
        .collect();
    collisions.sort_by_key(|c| c.indices[0]);
    collisions
}

/// Derives addresses from positions on a fixed administrative layout.
#[derive(Debug, Clone)]
pub struct AddressGenerator<'a> {
    layout: &'a AdminLayout,
    grid_size: u32,
}

impl<'a> AddressGenerator<'a> {
    pub fn new(layout: &'a AdminLayout, grid_size: u32) -> OmanaResult<Self> {
        if layout.zones.is_empty() {
            return Err(OmanaError::ConfigError(
                "cannot generate addresses without zones".to_string(),
            ));
        }
        if grid_size == 0 {
            return Err(OmanaError::invalid_parameter("grid_size", "must be positive"));
        }
        Ok(Self { layout, grid_size })
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    fn first_zone(&self) -> OmanaResult<&'a Zone> {
        self.layout
            .zones
            .first()
            .ok_or_else(|| OmanaError::ZoneNotFound("<empty layout>".to_string()))
    }

    /// Address of the `seq`-th house, placed at `(x, y)`.
    ///
    /// Points outside every zone are numbered against the first zone and
    /// flagged with `fallback`.
    pub fn address_for(&self, x: f64, y: f64, seq: u64) -> OmanaResult<Address> {
        let (found, fallback) = match locate(x, y, &self.layout.zones, self.grid_size) {
            Some(found) => (found, false),
            None => {
                let zone = self.first_zone()?;
                warn!(x, y, zone = %zone.code, "Point outside all zones, using first zone");
                (ZoneMatch::on_zone(zone, x, y, self.grid_size), true)
            }
        };

        if !found.in_grid() {
            debug!(zone = %found.zone.code, plot = found.plot, "Plot outside zone grid");
        }

        let (sector, region) = self.layout.lineage(found.zone)?;
        let street_name = if sector.streets.is_empty() {
            sector.name.clone()
        } else {
            sector.streets[(seq % sector.streets.len() as u64) as usize].clone()
        };

        Ok(Address {
            region_code: region.code.clone(),
            wilayat_number: region.wilayat_number,
            sector_code: sector.code.clone(),
            sector_letter: sector.letter,
            sector_number: sector.number,
            block_code: found.zone.code.clone(),
            block_number: found.zone.number,
            plot_number: found.plot,
            house_number: found.house_number(seq),
            street_name,
            x,
            y,
            fallback,
        })
    }

    /// Generate addresses for `points`, indexing them in input order.
    #[instrument(skip(self, points), fields(count = points.len()))]
    pub fn generate_batch(&self, points: &[(f64, f64)]) -> OmanaResult<BatchReport> {
        let addresses = points
            .iter()
            .enumerate()
            .map(|(seq, &(x, y))| self.address_for(x, y, seq as u64))
            .collect::<OmanaResult<Vec<_>>>()?;

        let collisions = find_collisions(&addresses);
        for collision in &collisions {
            warn!(
                block = %collision.key.block,
                plot = collision.key.plot,
                house = collision.key.house,
                houses = ?collision.indices,
                "Address collision"
            );
        }

        let fallbacks = addresses.iter().filter(|a| a.fallback).count();
        info!(
            addresses = addresses.len(),
            collisions = collisions.len(),
            fallbacks,
            "Generated address batch"
        );

        Ok(BatchReport {
            addresses,
            collisions,
            fallbacks,
        })
    }
}
