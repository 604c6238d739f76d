use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The engine could not open the source (unreachable URI, unsupported format).
    #[error("Failed to load {uri}: {reason}")]
    LoadFailed { uri: String, reason: String },

    /// The handle no longer refers to a live engine resource.
    #[error("Engine handle is stale: {0}")]
    StaleHandle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Shorthand used by engine adapters when rejecting an unloaded handle.
    pub fn stale(handle: impl std::fmt::Display) -> Self {
        BridgeError::StaleHandle(handle.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
