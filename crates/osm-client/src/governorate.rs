//! The eleven governorates of Oman with approximate extents.

use omana_common::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Governorate {
    /// Three-letter code used by national address codes
    pub code: &'static str,
    pub name: &'static str,
    /// (west, south, east, north) in degrees
    pub extent: (f64, f64, f64, f64),
}

impl Governorate {
    pub fn bounds(&self) -> BoundingBox {
        let (w, s, e, n) = self.extent;
        BoundingBox::from_edges(w, s, e, n)
    }

    /// Case-insensitive lookup by code.
    pub fn by_code(code: &str) -> Option<&'static Governorate> {
        GOVERNORATES.iter().find(|g| g.code.eq_ignore_ascii_case(code))
    }
}

pub const GOVERNORATES: [Governorate; 11] = [
    Governorate { code: "MSC", name: "Muscat", extent: (57.90, 23.00, 59.20, 23.80) },
    Governorate { code: "DHO", name: "Dhofar", extent: (51.90, 16.60, 55.50, 19.50) },
    Governorate { code: "MSN", name: "Musandam", extent: (55.90, 25.60, 56.60, 26.40) },
    Governorate { code: "BUR", name: "Al Buraimi", extent: (55.50, 23.60, 56.40, 24.50) },
    Governorate { code: "DAK", name: "Ad Dakhiliyah", extent: (56.50, 22.20, 58.20, 23.40) },
    Governorate { code: "BAN", name: "Al Batinah North", extent: (56.20, 23.90, 57.30, 24.90) },
    Governorate { code: "BAS", name: "Al Batinah South", extent: (57.00, 23.30, 58.00, 24.00) },
    Governorate { code: "SHS", name: "Ash Sharqiyah South", extent: (58.40, 21.00, 59.90, 22.80) },
    Governorate { code: "SHN", name: "Ash Sharqiyah North", extent: (58.00, 21.90, 59.00, 23.00) },
    Governorate { code: "DHA", name: "Ad Dhahirah", extent: (55.90, 22.60, 57.00, 23.90) },
    Governorate { code: "WUS", name: "Al Wusta", extent: (55.00, 18.50, 58.00, 21.50) },
];
