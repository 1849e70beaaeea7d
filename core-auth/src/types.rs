use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the signed-in user, as assigned by the identity service.
///
/// Appears in object paths and inventory records, so it is kept verbatim.
///
/// ```
/// use core_auth::UserId;
///
/// let user = UserId::new("uid_123");
/// assert_eq!(user.as_str(), "uid_123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Short-lived bearer credential.
///
/// `Debug` output never contains the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    secret: String,
    /// Expiry reported by the identity service, if known
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Raw token value for the `Authorization` header
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether the token has passed its reported expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires_at| expires_at <= Utc::now())
            .unwrap_or(false)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("secret", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
