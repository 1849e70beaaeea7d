//! Firestore inventory connector
//!
//! Implements [`InventoryMirror`] with batched `documents:commit` requests.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use bridge_traits::remote::{InventoryMirror, InventoryRecord};
use core_auth::{IdentityProvider, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::FirebaseError;
use crate::types::{CommitRequest, Document, FieldTransform, Value, Write};

/// Firestore REST API base URL
const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";

/// Firestore limit on writes per commit
pub const MAX_WRITES_PER_COMMIT: usize = 500;

const INVENTORY_COLLECTION: &str = "inventory";
const SOURCE_FIELD: &str = "source";
const UPLOADED_AT_FIELD: &str = "uploadedAt";

/// Remote inventory mirror writing to Cloud Firestore
///
/// # Example
///
/// ```ignore
/// use provider_firebase::FirestoreInventoryMirror;
///
/// let mirror = FirestoreInventoryMirror::new(http_client, identity, "my-project", "users");
/// mirror.record_uploaded("uid_1", &records).await?;
/// ```
pub struct FirestoreInventoryMirror {
    http_client: Arc<dyn HttpClient>,
    identity: Arc<dyn IdentityProvider>,
    project_id: String,
    collection_root: String,
    retry_policy: RetryPolicy,
}

impl FirestoreInventoryMirror {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        identity: Arc<dyn IdentityProvider>,
        project_id: impl Into<String>,
        collection_root: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            identity,
            project_id: project_id.into(),
            collection_root: collection_root.into(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    /// Full resource name of one inventory document
    pub fn document_name(&self, user_id: &str, key: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.database_path(),
            self.collection_root,
            user_id,
            INVENTORY_COLLECTION,
            key
        )
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents:commit",
            FIRESTORE_API_BASE,
            urlencoding::encode(&self.project_id)
        )
    }

    fn build_commit(&self, user_id: &str, records: &[InventoryRecord]) -> CommitRequest {
        let writes = records
            .iter()
            .map(|record| {
                let mut fields = BTreeMap::new();
                fields.insert(SOURCE_FIELD.to_string(), Value::String(record.source.clone()));

                Write {
                    update: Document {
                        name: self.document_name(user_id, &record.key),
                        fields,
                    },
                    update_transforms: vec![FieldTransform::request_time(UPLOADED_AT_FIELD)],
                }
            })
            .collect();

        CommitRequest { writes }
    }

    async fn commit(&self, token: &str, body: &CommitRequest) -> std::result::Result<(), FirebaseError> {
        let request = HttpRequest::new(HttpMethod::Post, self.commit_url())
            .bearer_token(token)
            .json(body)?;

        let response = self
            .http_client
            .execute_with_retry(request, self.retry_policy.clone())
            .await?;

        if !response.is_success() {
            return Err(FirebaseError::ApiError {
                status_code: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl InventoryMirror for FirestoreInventoryMirror {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn record_uploaded(&self, user_id: &str, records: &[InventoryRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let token = self
            .identity
            .fetch_token(&UserId::new(user_id))
            .await
            .map_err(|e| FirebaseError::AuthenticationFailed(e.to_string()))?;

        // Later chunks are still attempted after a failed one
        let mut last_error: Option<BridgeError> = None;
        for chunk in records.chunks(MAX_WRITES_PER_COMMIT) {
            let body = self.build_commit(user_id, chunk);
            match self.commit(token.secret(), &body).await {
                Ok(()) => debug!(written = chunk.len(), "Inventory chunk committed"),
                Err(e) => {
                    warn!(error = %e, written = chunk.len(), "Inventory chunk failed");
                    last_error = Some(e.into());
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
