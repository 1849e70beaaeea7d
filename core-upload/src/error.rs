use bridge_traits::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Host error: {0}")]
    Host(#[from] BridgeError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Manifest encoding failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl UploadError {
    /// Whether the host reported its upload queue is full
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, UploadError::Host(e) if e.is_capacity_exceeded())
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_passes_through_conversion() {
        let err: UploadError = BridgeError::CapacityExceeded("full".to_string()).into();
        assert!(err.is_capacity_exceeded());

        let err: UploadError = BridgeError::OperationFailed("disk".to_string()).into();
        assert!(!err.is_capacity_exceeded());

        let err: UploadError = AuthError::NotAuthenticated.into();
        assert!(!err.is_capacity_exceeded());
    }
}
