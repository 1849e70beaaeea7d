//! Firestore REST request types
//!
//! Only the subset of the `documents:commit` body the inventory mirror
//! writes. See <https://firebase.google.com/docs/firestore/reference/rest/v1/projects.databases.documents/commit>.

use serde::Serialize;
use std::collections::BTreeMap;

/// Body of `POST .../documents:commit`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CommitRequest {
    pub writes: Vec<Write>,
}

/// One document write with optional server-side field transforms
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Write {
    pub update: Document,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub update_transforms: Vec<FieldTransform>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Document {
    /// Full resource name, `projects/{p}/databases/(default)/documents/...`
    pub name: String,
    pub fields: BTreeMap<String, Value>,
}

/// Firestore typed value; only strings are written
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum Value {
    #[serde(rename = "stringValue")]
    String(String),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldTransform {
    pub field_path: String,
    pub set_to_server_value: ServerValue,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerValue {
    RequestTime,
}

impl FieldTransform {
    /// Stamp `field_path` with the server's commit time
    pub fn request_time(field_path: impl Into<String>) -> Self {
        Self {
            field_path: field_path.into(),
            set_to_server_value: ServerValue::RequestTime,
        }
    }
}
