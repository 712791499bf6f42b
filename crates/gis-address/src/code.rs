//! Address code schemas.
//!
//! Two independent, regex-validated string forms:
//!
//! | Schema   | Format                                            | Example                      |
//! |----------|---------------------------------------------------|------------------------------|
//! | Local    | `SQ-{sector}-{plot:03}-{house:04}`                | `SQ-A-001-1001`              |
//! | National | `OM-{region}-{wilayat:02}-{sector:02}-{block:03}-{plot:03}-{house:05}` | `OM-MSC-03-01-002-045-04503` |
//!
//! Codes are validated against the anchored pattern before any field is
//! split out, so parsing never panics on malformed input. Values that do
//! not fit a field are rejected at construction instead of producing a
//! string the parser would refuse.
//!
//! The Local schema carries sector, plot and house only. Region and block
//! are not recoverable from it.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use omana_common::{OmanaError, OmanaResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

static LOCAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^SQ-([A-D])-([0-9]{3})-([0-9]{4})$").expect("valid local code regex")
});

static NATIONAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^OM-([A-Z]{3})-([0-9]{2})-([0-9]{2})-([0-9]{3})-([0-9]{3})-([0-9]{5})$")
        .expect("valid national code regex")
});

/// Sector letters the Local schema accepts.
pub const LOCAL_SECTORS: [char; 4] = omana_common::LOCAL_SECTOR_LETTERS;

/// Check that `value` fits a zero-padded decimal field of `width` digits.
fn fit(field: &'static str, value: i64, width: usize) -> OmanaResult<u32> {
    let max = 10i64.pow(width as u32) - 1;
    if (0..=max).contains(&value) {
        Ok(value as u32)
    } else {
        Err(OmanaError::FieldOverflow { field, value, width })
    }
}

/// Local (sector-level) address code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LocalFields")]
pub struct LocalCode {
    sector: char,
    plot: u32,
    house: u32,
}

impl LocalCode {
    pub fn new(sector: char, plot: i64, house: i64) -> OmanaResult<Self> {
        if !LOCAL_SECTORS.contains(&sector) {
            return Err(OmanaError::invalid_parameter(
                "sector",
                format!("'{}' is not one of A, B, C or D", sector),
            ));
        }
        Ok(Self {
            sector,
            plot: fit("plot", plot, 3)?,
            house: fit("house", house, 4)?,
        })
    }

    pub fn sector(&self) -> char {
        self.sector
    }

    pub fn plot(&self) -> u32 {
        self.plot
    }

    pub fn house(&self) -> u32 {
        self.house
    }

    /// Parse a Local code; `None` for anything not matching the schema.
    pub fn parse(code: &str) -> Option<Self> {
        let caps = LOCAL_RE.captures(code)?;
        Some(Self {
            sector: caps[1].chars().next()?,
            plot: caps[2].parse().ok()?,
            house: caps[3].parse().ok()?,
        })
    }

    pub fn is_valid(code: &str) -> bool {
        LOCAL_RE.is_match(code)
    }
}

impl fmt::Display for LocalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQ-{}-{:03}-{:04}", self.sector, self.plot, self.house)
    }
}

impl FromStr for LocalCode {
    type Err = OmanaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| OmanaError::InvalidCode(s.to_string()))
    }
}

/// Unchecked wire form of [`LocalCode`].
#[derive(Deserialize)]
struct LocalFields {
    sector: char,
    plot: i64,
    house: i64,
}

impl TryFrom<LocalFields> for LocalCode {
    type Error = OmanaError;

    fn try_from(f: LocalFields) -> Result<Self, Self::Error> {
        Self::new(f.sector, f.plot, f.house)
    }
}

/// National address code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "NationalFields")]
pub struct NationalCode {
    region: String,
    wilayat: u32,
    sector: u32,
    block: u32,
    plot: u32,
    house: u32,
}

impl NationalCode {
    pub fn new(
        region: &str,
        wilayat: i64,
        sector: i64,
        block: i64,
        plot: i64,
        house: i64,
    ) -> OmanaResult<Self> {
        if region.len() != 3 || !region.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(OmanaError::invalid_parameter(
                "region",
                format!("'{}' must be three upper-case letters", region),
            ));
        }
        Ok(Self {
            region: region.to_string(),
            wilayat: fit("wilayat", wilayat, 2)?,
            sector: fit("sector", sector, 2)?,
            block: fit("block", block, 3)?,
            plot: fit("plot", plot, 3)?,
            house: fit("house", house, 5)?,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn wilayat(&self) -> u32 {
        self.wilayat
    }

    pub fn sector(&self) -> u32 {
        self.sector
    }

    pub fn block(&self) -> u32 {
        self.block
    }

    pub fn plot(&self) -> u32 {
        self.plot
    }

    pub fn house(&self) -> u32 {
        self.house
    }

    /// Parse a National code; `None` for anything not matching the schema.
    pub fn parse(code: &str) -> Option<Self> {
        let caps = NATIONAL_RE.captures(code)?;
        Some(Self {
            region: caps[1].to_string(),
            wilayat: caps[2].parse().ok()?,
            sector: caps[3].parse().ok()?,
            block: caps[4].parse().ok()?,
            plot: caps[5].parse().ok()?,
            house: caps[6].parse().ok()?,
        })
    }

    pub fn is_valid(code: &str) -> bool {
        NATIONAL_RE.is_match(code)
    }
}

impl fmt::Display for NationalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OM-{}-{:02}-{:02}-{:03}-{:03}-{:05}",
            self.region, self.wilayat, self.sector, self.block, self.plot, self.house
        )
    }
}

impl FromStr for NationalCode {
    type Err = OmanaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| OmanaError::InvalidCode(s.to_string()))
    }
}

/// Unchecked wire form of [`NationalCode`].
#[derive(Deserialize)]
struct NationalFields {
    region: String,
    wilayat: i64,
    sector: i64,
    block: i64,
    plot: i64,
    house: i64,
}

impl TryFrom<NationalFields> for NationalCode {
    type Error = OmanaError;

    fn try_from(f: NationalFields) -> Result<Self, Self::Error> {
        Self::new(&f.region, f.wilayat, f.sector, f.block, f.plot, f.house)
    }
}

/// Either schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "schema", rename_all = "lowercase")]
pub enum AddressCode {
    Local(LocalCode),
    National(NationalCode),
}

impl AddressCode {
    /// Try each schema against its own pattern.
    pub fn parse(code: &str) -> Option<Self> {
        LocalCode::parse(code)
            .map(AddressCode::Local)
            .or_else(|| NationalCode::parse(code).map(AddressCode::National))
    }

    pub fn schema(&self) -> &'static str {
        match self {
            AddressCode::Local(_) => "local",
            AddressCode::National(_) => "national",
        }
    }

    pub fn plot(&self) -> u32 {
        match self {
            AddressCode::Local(c) => c.plot(),
            AddressCode::National(c) => c.plot(),
        }
    }

    pub fn house(&self) -> u32 {
        match self {
            AddressCode::Local(c) => c.house(),
            AddressCode::National(c) => c.house(),
        }
    }
}

impl fmt::Display for AddressCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressCode::Local(c) => c.fmt(f),
            AddressCode::National(c) => c.fmt(f),
        }
    }
}

impl FromStr for AddressCode {
    type Err = OmanaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| OmanaError::InvalidCode(s.to_string()))
    }
}
