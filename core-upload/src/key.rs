//! Dedup keys
//!
//! Host identifiers such as PhotoKit's `"9F983DBA-EC35-42B8/L0/001"` carry
//! a stable prefix followed by path-like suffixes. The key keeps only the
//! prefix, restricted to `[A-Za-z0-9-]`, so it is safe as a file name, an
//! object path segment and a document id.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    /// Derive the key for a host asset identifier.
    ///
    /// Returns `None` when nothing usable is left after sanitizing.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let head = identifier.split(['/', '\\']).next().unwrap_or(identifier);
        let key: String = head
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();

        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str) -> Option<String> {
        DedupKey::from_identifier(id).map(|k| k.as_str().to_string())
    }

    #[test]
    fn test_keeps_prefix_before_separator() {
        assert_eq!(key("9F983DBA-EC35-42B8/L0/001"), Some("9F983DBA-EC35-42B8".to_string()));
        assert_eq!(key("abc\\def"), Some("abc".to_string()));
    }

    #[test]
    fn test_strips_unsafe_characters() {
        assert_eq!(key("a b_c.d:e-9"), Some("abcde-9".to_string()));
        assert_eq!(key("ünïcode-1"), Some("ncode-1".to_string()));
    }

    #[test]
    fn test_empty_result_is_none() {
        assert_eq!(key(""), None);
        assert_eq!(key("/leading"), None);
        assert_eq!(key("..__"), None);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            DedupKey::from_identifier("X-1/L0/001"),
            DedupKey::from_identifier("X-1/L0/002")
        );
    }
}
