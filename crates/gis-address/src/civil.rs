//! Civil numbers and mock ID cards.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate};
use once_cell::sync::Lazy;
use omana_common::{OmanaError, OmanaResult};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::generator::Address;

static CIVIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]{7}$").expect("valid civil number regex"));

/// Validity period of an ID card.
pub const CARD_VALIDITY_YEARS: u32 = 10;

const MALE_NAMES: &[&str] = &[
    "Ahmed", "Mohammed", "Salim", "Khalid", "Hamed", "Said", "Sultan", "Nasser", "Yousuf", "Talal",
];
const FEMALE_NAMES: &[&str] = &[
    "Fatma", "Aisha", "Maryam", "Zainab", "Huda", "Salma", "Noor", "Amal", "Shamsa", "Latifa",
];
const FAMILY_NAMES: &[&str] = &[
    "Al Balushi",
    "Al Busaidi",
    "Al Harthy",
    "Al Hinai",
    "Al Kindi",
    "Al Maamari",
    "Al Rawahi",
    "Al Saadi",
    "Al Shukaili",
    "Al Wahaibi",
];

/// An eight-digit civil number with a non-zero leading digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CivilNumber(String);

impl CivilNumber {
    pub fn parse(s: &str) -> Option<Self> {
        CIVIL_RE.is_match(s).then(|| Self(s.to_string()))
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(10_000_000u32..=99_999_999).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CivilNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CivilNumber {
    type Err = OmanaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            OmanaError::invalid_parameter("civil_number", format!("'{}' is not eight digits", s))
        })
    }
}

impl TryFrom<String> for CivilNumber {
    type Error = OmanaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CivilNumber> for String {
    fn from(c: CivilNumber) -> Self {
        c.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "M"),
            Gender::Female => write!(f, "F"),
        }
    }
}

/// A mock national ID card tied to an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdCard {
    pub civil_number: CivilNumber,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    /// National address code of the card holder's house
    pub address_code: String,
}

impl IdCard {
    /// Fabricate a card for a resident of `address`, issued within the
    /// last ten years relative to `today`.
    pub fn mock<R: Rng + ?Sized>(rng: &mut R, address: &Address, today: NaiveDate) -> OmanaResult<Self> {
        let gender = if rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };
        let given = match gender {
            Gender::Male => MALE_NAMES,
            Gender::Female => FEMALE_NAMES,
        };
        let first = given.choose(rng).copied().unwrap_or("Ahmed");
        let family = FAMILY_NAMES.choose(rng).copied().unwrap_or("Al Balushi");

        let age_days = rng.gen_range(18 * 365..=80 * 365);
        let date_of_birth = today - Duration::days(age_days);
        let issue_date = today - Duration::days(rng.gen_range(0..CARD_VALIDITY_YEARS as i64 * 365));
        let expiry_date = issue_date
            .checked_add_months(Months::new(CARD_VALIDITY_YEARS * 12))
            .ok_or_else(|| {
                OmanaError::invalid_parameter("issue_date", "expiry date out of range")
            })?;

        Ok(Self {
            civil_number: CivilNumber::generate(rng),
            full_name: format!("{} {}", first, family),
            gender,
            date_of_birth,
            issue_date,
            expiry_date,
            address_code: address.national_code()?.to_string(),
        })
    }

    /// Expired on the expiry date itself.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today >= self.expiry_date
    }
}
