//! Error types for the catalogue

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Catalogue errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The backend answered with a non-success status
    #[error("Catalogue request failed (status {status}): {message}")]
    Fetch { status: u16, message: String },

    /// No row matched the requested id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Failed to parse the response body
    #[error("Invalid catalogue response: {0}")]
    InvalidResponse(String),

    /// Base URL or key unusable
    #[error("Invalid catalogue configuration: {0}")]
    Config(String),

    /// Transport failure from the HTTP bridge
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }
}

impl From<core_runtime::Error> for CatalogError {
    fn from(error: core_runtime::Error) -> Self {
        CatalogError::Config(error.to_string())
    }
}

/// Result type for catalogue operations
pub type Result<T> = std::result::Result<T, CatalogError>;
