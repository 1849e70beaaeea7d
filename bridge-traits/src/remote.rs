//! Remote inventory abstraction
//!
//! A server-side record of which assets a user has uploaded. The core
//! mirrors its local dedup manifest here on a best-effort basis; the local
//! manifest stays authoritative.

use async_trait::async_trait;

use crate::error::Result;

/// One inventory record to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    /// Dedup key of the uploaded asset
    pub key: String,
    /// Label of the component that produced the upload
    pub source: String,
}

/// Remote inventory store keyed by user identity
///
/// Implementations stamp each record with the server's own clock.
#[async_trait]
pub trait InventoryMirror: Send + Sync {
    /// Write one record per entry under the user's inventory
    async fn record_uploaded(&self, user_id: &str, records: &[InventoryRecord]) -> Result<()>;
}
