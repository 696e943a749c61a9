//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum AtlasTypesError {
    /// Geometry conversion error.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
    /// Coordinate reference system is not known to the crate.
    #[error("unknown coordinate reference system: {0}")]
    UnknownCrs(String),
}
