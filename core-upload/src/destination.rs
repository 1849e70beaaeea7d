//! Upload destination requests
//!
//! Builds the media upload request for one asset:
//!
//! ```text
//! POST https://<storage-host>/v0/b/<bucket>/o?uploadType=media&name=<object path>
//! Authorization: Bearer <token>
//! Content-Type: image/jpeg | video/mp4
//! ```
//!
//! Object paths are `<collection-root>/<user id>/<dedup key>.<jpg|mp4>`.

use crate::key::DedupKey;
use bridge_traits::http::{HttpMethod, HttpRequest};
use bridge_traits::media::MediaKind;
use core_auth::{AuthToken, UserId};
use core_runtime::config::UploadConfig;

/// File extension for an uploaded asset of `kind`
pub fn extension(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "mp4",
        _ => "jpg",
    }
}

pub fn content_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => "video/mp4",
        _ => "image/jpeg",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationBuilder {
    storage_host: String,
    bucket: String,
    collection_root: String,
}

impl DestinationBuilder {
    pub fn new(
        storage_host: impl Into<String>,
        bucket: impl Into<String>,
        collection_root: impl Into<String>,
    ) -> Self {
        Self {
            storage_host: storage_host.into(),
            bucket: bucket.into(),
            collection_root: collection_root.into(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(
            config.storage_host.clone(),
            config.bucket.clone(),
            config.collection_root.clone(),
        )
    }

    pub fn object_path(&self, user: &UserId, key: &DedupKey, kind: MediaKind) -> String {
        format!(
            "{}/{}/{}.{}",
            self.collection_root,
            user.as_str(),
            key.as_str(),
            extension(kind)
        )
    }

    pub fn build(&self, user: &UserId, key: &DedupKey, kind: MediaKind, token: &AuthToken) -> HttpRequest {
        let url = format!(
            "https://{}/v0/b/{}/o?uploadType=media&name={}",
            self.storage_host,
            self.bucket,
            urlencoding::encode(&self.object_path(user, key, kind))
        );

        HttpRequest::new(HttpMethod::Post, url)
            .bearer_token(token.secret())
            .header("Content-Type", content_type(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> DestinationBuilder {
        DestinationBuilder::new("firebasestorage.googleapis.com", "app.appspot.com", "users")
    }

    fn key(id: &str) -> DedupKey {
        DedupKey::from_identifier(id).unwrap()
    }

    #[test]
    fn test_object_path_by_kind() {
        let user = UserId::new("uid_1");
        assert_eq!(
            builder().object_path(&user, &key("ABC-1"), MediaKind::Video),
            "users/uid_1/ABC-1.mp4"
        );
        assert_eq!(
            builder().object_path(&user, &key("ABC-1"), MediaKind::Image),
            "users/uid_1/ABC-1.jpg"
        );
    }

    #[test]
    fn test_image_request() {
        let request = builder().build(
            &UserId::new("uid_1"),
            &key("ABC-1/L0/001"),
            MediaKind::Image,
            &AuthToken::new("tok"),
        );

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url,
            "https://firebasestorage.googleapis.com/v0/b/app.appspot.com/o?uploadType=media&name=users%2Fuid_1%2FABC-1.jpg"
        );
        assert_eq!(request.header_value("authorization"), Some("Bearer tok"));
        assert_eq!(request.header_value("content-type"), Some("image/jpeg"));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_video_content_type() {
        let request = builder().build(
            &UserId::new("u"),
            &key("V-1"),
            MediaKind::Video,
            &AuthToken::new("tok"),
        );
        assert_eq!(request.header_value("Content-Type"), Some("video/mp4"));
        assert!(request.url.ends_with("V-1.mp4"));
    }

    #[test]
    fn test_from_config() {
        let config = UploadConfig::builder()
            .bucket("b")
            .storage_host("localhost:9199")
            .collection_root("members")
            .build()
            .unwrap();

        assert_eq!(
            DestinationBuilder::from_config(&config),
            DestinationBuilder::new("localhost:9199", "b", "members")
        );
    }
}
