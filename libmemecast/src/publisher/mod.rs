//! Publishing platform abstraction
//!
//! [`Publisher`] is the seam between the assembly pipeline and the social
//! network: it authenticates once per run, resolves rich-text facets (which
//! needs the network for mention lookups), uploads binary payloads, and
//! submits the finished post.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BlobHandle, Facet, PostRecord};

pub mod bluesky;
// Mock publisher is available beyond tests so integration tests can use it
pub mod mock;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Establish a session. Must be called exactly once before any other
    /// network operation on this publisher.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` on bad or missing credentials.
    async fn authenticate(&mut self) -> Result<()>;

    /// Detect links, mentions, and hashtags in `text`, resolving mentions
    /// against the platform directory. Spans are ordered and non-overlapping.
    async fn detect_facets(&self, text: &str) -> Result<Vec<Facet>>;

    /// Upload raw bytes and return the platform's opaque reference.
    /// No retries happen at this layer; failures surface to the caller.
    async fn upload_blob(&self, bytes: Vec<u8>, mime_type: &str) -> Result<BlobHandle>;

    /// Submit the finished post and return its platform-assigned address
    /// (an AT URI for Bluesky).
    async fn publish(&self, record: &PostRecord) -> Result<String>;

    /// Lowercase platform identifier (e.g. "bluesky")
    fn name(&self) -> &str;
}
