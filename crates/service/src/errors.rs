use thiserror::Error;

/// Failures from the binary asset medium.
///
/// "Absent" is never an error; repository reads report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Payload rejected before touching the medium (empty or oversized).
    #[error("invalid asset: {0}")]
    Invalid(String),
    /// Medium unreachable or corrupt.
    #[error("asset storage io error: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid asset: {0}")]
    InvalidAsset(String),
    #[error("asset storage error: {0}")]
    Storage(String),
    /// Entity-store commit failed after assets were already mutated; the
    /// new blob may be stored while the URL pointer is stale.
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }
}

impl From<AssetError> for ServiceError {
    fn from(e: AssetError) -> Self {
        match e {
            AssetError::Invalid(msg) => ServiceError::InvalidAsset(msg),
            AssetError::Io(msg) => ServiceError::Storage(msg),
        }
    }
}
