//! Common test fixtures for omana-map tests.
//!
//! Plain tuples and strings so every crate in the workspace can use them
//! without a dependency cycle on the model crates.

/// Zone rectangles as (start_x, start_y, end_x, end_y).
pub mod zones {
    /// The reference block used for plot numbering examples.
    pub const REFERENCE: (f64, f64, f64, f64) = (100.0, 100.0, 400.0, 300.0);

    /// A block directly east of `REFERENCE`, sharing its edge at x = 400.
    pub const EAST_NEIGHBOUR: (f64, f64, f64, f64) = (400.0, 100.0, 700.0, 300.0);

    /// A square 1000x1000 block starting at the origin.
    pub const SQUARE: (f64, f64, f64, f64) = (0.0, 0.0, 1000.0, 1000.0);
}

/// Geographic bounds as (west, south, east, north).
pub mod bounds {
    /// Central Muscat, the default map view
    pub const MUSCAT: (f64, f64, f64, f64) = (58.30, 23.55, 58.50, 23.65);

    /// Sultanate of Oman
    pub const OMAN: (f64, f64, f64, f64) = (51.9, 16.6, 59.9, 26.4);

    /// A one-degree square for easy arithmetic
    pub const UNIT: (f64, f64, f64, f64) = (58.0, 23.0, 59.0, 24.0);

    /// Zero-width box (invalid for projection)
    pub const DEGENERATE: (f64, f64, f64, f64) = (58.0, 23.0, 58.0, 24.0);
}

/// Address codes.
pub mod codes {
    pub const LOCAL_VALID: &str = "SQ-A-001-1001";
    pub const LOCAL_BAD_SECTOR: &str = "SQ-E-001-1001";
    pub const LOCAL_BAD_WIDTH: &str = "SQ-A-01-1001";
    pub const LOCAL_MISSING_SEGMENT: &str = "SQ-A-1001";
    pub const LOCAL_BAD_SEPARATOR: &str = "SQ_A_001_1001";

    pub const NATIONAL_VALID: &str = "OM-MSC-03-01-002-045-04503";
    pub const NATIONAL_LOWERCASE_REGION: &str = "OM-msc-03-01-002-045-04503";
}

/// Civil numbers.
pub mod civil {
    pub const VALID: &str = "12345678";
    pub const LEADING_ZERO: &str = "01234567";
    pub const TOO_SHORT: &str = "1234567";
}
