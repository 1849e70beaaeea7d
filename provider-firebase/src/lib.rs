//! # Firebase Provider
//!
//! Remote inventory mirror backed by the Cloud Firestore REST API.
//!
//! ## Overview
//!
//! Every asset the upload controller enqueues is also recorded as a document
//! under the signed-in user's inventory collection:
//!
//! ```text
//! <collection-root>/<user id>/inventory/<dedup key>
//!     source:     "background-upload"
//!     uploadedAt: <server REQUEST_TIME>
//! ```
//!
//! Writes go through a single `documents:commit` call per chunk of at most
//! 500 documents, the Firestore per-commit limit. Authentication reuses the
//! host's [`IdentityProvider`](core_auth::IdentityProvider).

pub mod connector;
pub mod error;
pub mod types;

pub use connector::FirestoreInventoryMirror;
pub use error::{FirebaseError, Result};
