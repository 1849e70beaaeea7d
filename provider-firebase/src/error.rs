//! Error types for the Firebase provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FirebaseError {
    /// No bearer token could be obtained for the user
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Firestore answered with a non-success status
    #[error("Firestore API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, FirebaseError>;

impl From<FirebaseError> for BridgeError {
    fn from(error: FirebaseError) -> Self {
        match error {
            FirebaseError::AuthenticationFailed(msg) => {
                BridgeError::OperationFailed(format!("Authentication failed: {}", msg))
            }
            FirebaseError::ApiError {
                status_code,
                message,
            } => BridgeError::OperationFailed(format!(
                "Firestore error (status {}): {}",
                status_code, message
            )),
            FirebaseError::BridgeError(e) => e,
        }
    }
}
