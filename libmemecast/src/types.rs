//! Core types for Memecast
//!
//! All records are transient and scoped to a single publish run; nothing here
//! is mutated after construction.

use bsky_sdk::api::types::BlobRef;
use serde::{Deserialize, Serialize};

/// Normalized content produced by a fetch strategy (or the static fallback).
///
/// At most one media source is meaningful per record; the assembler picks the
/// embed by priority (image bytes, then image URL, then external link). A
/// record with none of the media fields set is text-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentRecord {
    pub text: String,
    pub image_bytes: Option<Vec<u8>>,
    pub image_mime_type: Option<String>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub external_url: Option<String>,
    pub external_title: Option<String>,
    pub external_description: Option<String>,
}

impl ContentRecord {
    /// A record with nothing but text.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A record carrying image bytes already in memory.
    pub fn with_image_bytes(
        text: impl Into<String>,
        bytes: Vec<u8>,
        mime_type: impl Into<String>,
        alt: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            image_bytes: Some(bytes),
            image_mime_type: Some(mime_type.into()),
            image_alt: Some(alt.into()),
            ..Default::default()
        }
    }

    /// A record pointing at a remote image to be fetched during assembly.
    pub fn with_image_url(
        text: impl Into<String>,
        url: impl Into<String>,
        alt: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            image_url: Some(url.into()),
            image_alt: Some(alt.into()),
            ..Default::default()
        }
    }

    /// A record carrying an external link for a preview card.
    pub fn with_external_link(
        text: impl Into<String>,
        url: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            text: text.into(),
            external_url: Some(url.into()),
            external_title: title,
            external_description: description,
            ..Default::default()
        }
    }

    pub fn is_text_only(&self) -> bool {
        self.image_bytes.is_none() && self.image_url.is_none() && self.external_url.is_none()
    }
}

/// Outcome of a single fetch strategy attempt.
///
/// Strategies never raise past their boundary; any upstream problem is
/// reported as `Failure` with the reason for the log line.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Success(ContentRecord),
    Failure(String),
}

impl FetchOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        FetchOutcome::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}

/// Platform-facing post shape: text plus detected facets plus at most one
/// embed variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub text: String,
    pub facets: Vec<Facet>,
    pub embed: Option<Embed>,
}

/// A detected span within post text carrying semantic metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    /// Byte offset of the span start (inclusive)
    pub byte_start: usize,
    /// Byte offset of the span end (exclusive)
    pub byte_end: usize,
    pub feature: FacetFeature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FacetFeature {
    Link { uri: String },
    Mention { did: String },
    Tag { tag: String },
}

/// A structured attachment included in the post beyond its plain text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Embed {
    Image { blob: BlobHandle, alt: String },
    External {
        uri: String,
        title: String,
        description: String,
    },
}

/// Opaque reference to an uploaded binary, returned by the platform and used
/// in place of raw bytes when submitting the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobHandle(BlobRef);

impl BlobHandle {
    pub fn new(blob: BlobRef) -> Self {
        Self(blob)
    }

    pub fn as_blob_ref(&self) -> &BlobRef {
        &self.0
    }

    pub fn into_blob_ref(self) -> BlobRef {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only_record() {
        let record = ContentRecord::text_only("hello");
        assert_eq!(record.text, "hello");
        assert!(record.is_text_only());
    }

    #[test]
    fn test_image_bytes_record_is_not_text_only() {
        let record =
            ContentRecord::with_image_bytes("caption", vec![1, 2, 3], "image/png", "a meme");
        assert!(!record.is_text_only());
        assert_eq!(record.image_mime_type.as_deref(), Some("image/png"));
        assert_eq!(record.image_alt.as_deref(), Some("a meme"));
        assert!(record.image_url.is_none());
        assert!(record.external_url.is_none());
    }

    #[test]
    fn test_external_link_record_defaults() {
        let record =
            ContentRecord::with_external_link("look", "https://example.com/m/1", None, None);
        assert!(!record.is_text_only());
        assert_eq!(record.external_title, None);
        assert_eq!(record.external_description, None);
    }

    #[test]
    fn test_fetch_outcome_helpers() {
        let ok = FetchOutcome::Success(ContentRecord::text_only("x"));
        assert!(ok.is_success());

        let failed = FetchOutcome::failure("upstream 503");
        assert!(!failed.is_success());
        match failed {
            FetchOutcome::Failure(reason) => assert_eq!(reason, "upstream 503"),
            _ => panic!("expected failure"),
        }
    }

    #[test]
    fn test_facet_serialization() {
        let facet = Facet {
            byte_start: 0,
            byte_end: 5,
            feature: FacetFeature::Tag {
                tag: "memes".to_string(),
            },
        };

        let json = serde_json::to_string(&facet).unwrap();
        assert!(json.contains(r#""type":"tag""#));

        let back: Facet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, facet);
    }
}
