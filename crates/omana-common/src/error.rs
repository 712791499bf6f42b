//! Error types for the Omana map crates.

use thiserror::Error;

/// Result type alias using OmanaError.
pub type OmanaResult<T> = Result<T, OmanaError>;

/// Primary error type for address, projection and storage operations.
#[derive(Debug, Error)]
pub enum OmanaError {
    // === Input Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid address code: {0}")]
    InvalidCode(String),

    #[error("Value {value} does not fit the {width}-digit '{field}' field")]
    FieldOverflow {
        field: &'static str,
        value: i64,
        width: usize,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    // === Lookup Errors ===
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Sector not found: {0}")]
    SectorNotFound(String),

    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    // === Processing Errors ===
    #[error("Projection error: {0}")]
    ProjectionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Failed to parse response: {0}")]
    ResponseParseError(String),
}

impl OmanaError {
    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        OmanaError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by caller input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            OmanaError::InvalidParameter { .. }
                | OmanaError::InvalidCode(_)
                | OmanaError::FieldOverflow { .. }
                | OmanaError::InvalidGeometry(_)
                | OmanaError::InvalidBounds(_)
                | OmanaError::InvalidCrs(_)
        )
    }
}

impl From<std::io::Error> for OmanaError {
    fn from(err: std::io::Error) -> Self {
        OmanaError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for OmanaError {
    fn from(err: serde_json::Error) -> Self {
        OmanaError::StorageError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for OmanaError {
    fn from(err: serde_yaml::Error) -> Self {
        OmanaError::ConfigError(format!("YAML error: {}", err))
    }
}
