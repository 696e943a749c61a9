//! Error types used by the crate.

use thiserror::Error;

/// Atlas error type.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// I/O error (network or file).
    #[error("failed to load data")]
    Io,
    /// Remote service responded with an unexpected status.
    #[error("remote service returned status {0}")]
    Http(u16),
    /// Error decoding data.
    #[error("failed to decode data: {0}")]
    Decoding(String),
    /// Malformed XML document.
    #[error("invalid xml: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Malformed JSON document.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// Coordinates cannot be converted between coordinate systems.
    #[error("projection failed: {0}")]
    Projection(String),
    /// Geometry of this type cannot be used here.
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(&'static str),
    /// Invalid tool or layer configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// Item not found.
    #[error("item not found")]
    NotFound,
}

#[cfg(not(target_arch = "wasm32"))]
impl From<reqwest::Error> for AtlasError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Http(status.as_u16()),
            None => Self::Io,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for AtlasError {
    fn from(value: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(value.into())
    }
}

impl From<atlas_types::error::AtlasTypesError> for AtlasError {
    fn from(value: atlas_types::error::AtlasTypesError) -> Self {
        Self::Configuration(value.to_string())
    }
}
