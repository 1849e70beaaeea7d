use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Token fetch failed: {0}")]
    TokenFetchFailed(String),

    #[error("Identity provider returned an expired token")]
    TokenExpired,

    #[error("Token fetch timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u128 },

    #[error("Identity provider error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
