//! Mock publisher for testing
//!
//! A configurable stand-in for the platform client: it can simulate
//! authentication, upload, and publish failures, records every call for
//! verification, and hands out fake blob references without touching the
//! network.

use async_trait::async_trait;
use bsky_sdk::api::types::{BlobRef, UnTypedBlobRef};
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::publisher::Publisher;
use crate::types::{BlobHandle, Facet, PostRecord};

/// Configuration for mock publisher behavior
#[derive(Debug, Clone)]
pub struct MockPublisherConfig {
    pub name: String,
    pub auth_succeeds: bool,
    pub upload_succeeds: bool,
    pub publish_succeeds: bool,
    /// Facets returned by `detect_facets` regardless of input
    pub facets: Vec<Facet>,
    pub auth_error: Option<String>,
    pub upload_error: Option<String>,
    pub publish_error: Option<String>,
    /// (byte length, MIME type) of every upload, for verification
    pub uploads: Arc<Mutex<Vec<(usize, String)>>>,
    /// Every record passed to `publish`
    pub published: Arc<Mutex<Vec<PostRecord>>>,
    pub auth_calls: Arc<Mutex<usize>>,
}

impl Default for MockPublisherConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_succeeds: true,
            upload_succeeds: true,
            publish_succeeds: true,
            facets: Vec::new(),
            auth_error: None,
            upload_error: None,
            publish_error: None,
            uploads: Arc::new(Mutex::new(Vec::new())),
            published: Arc::new(Mutex::new(Vec::new())),
            auth_calls: Arc::new(Mutex::new(0)),
        }
    }
}

pub struct MockPublisher {
    config: MockPublisherConfig,
    authenticated: bool,
}

impl MockPublisher {
    pub fn new(config: MockPublisherConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// A publisher where every operation succeeds, pre-authenticated for
    /// convenience.
    pub fn success() -> Self {
        let mut publisher = Self::new(MockPublisherConfig::default());
        publisher.authenticated = true;
        publisher
    }

    /// A pre-authenticated publisher whose uploads fail.
    pub fn upload_failure(error: &str) -> Self {
        let mut publisher = Self::new(MockPublisherConfig {
            upload_succeeds: false,
            upload_error: Some(error.to_string()),
            ..Default::default()
        });
        publisher.authenticated = true;
        publisher
    }

    /// A pre-authenticated publisher whose submissions fail.
    pub fn publish_failure(error: &str) -> Self {
        let mut publisher = Self::new(MockPublisherConfig {
            publish_succeeds: false,
            publish_error: Some(error.to_string()),
            ..Default::default()
        });
        publisher.authenticated = true;
        publisher
    }

    /// A publisher that rejects authentication.
    pub fn auth_failure(error: &str) -> Self {
        Self::new(MockPublisherConfig {
            auth_succeeds: false,
            auth_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A pre-authenticated publisher returning the given facets.
    pub fn with_facets(facets: Vec<Facet>) -> Self {
        let mut publisher = Self::new(MockPublisherConfig {
            facets,
            ..Default::default()
        });
        publisher.authenticated = true;
        publisher
    }

    pub fn auth_call_count(&self) -> usize {
        *self.config.auth_calls.lock().unwrap()
    }

    pub fn uploads(&self) -> Vec<(usize, String)> {
        self.config.uploads.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<PostRecord> {
        self.config.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn authenticate(&mut self) -> Result<()> {
        *self.config.auth_calls.lock().unwrap() += 1;

        if self.config.auth_succeeds {
            self.authenticated = true;
            Ok(())
        } else {
            Err(PlatformError::Authentication(
                self.config
                    .auth_error
                    .clone()
                    .unwrap_or_else(|| "Mock authentication failed".to_string()),
            )
            .into())
        }
    }

    async fn detect_facets(&self, _text: &str) -> Result<Vec<Facet>> {
        Ok(self.config.facets.clone())
    }

    async fn upload_blob(&self, bytes: Vec<u8>, mime_type: &str) -> Result<BlobHandle> {
        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        if !self.config.upload_succeeds {
            let message = self
                .config
                .upload_error
                .clone()
                .unwrap_or_else(|| "Mock upload failed".to_string());
            return Err(PlatformError::Upload(message).into());
        }

        self.config
            .uploads
            .lock()
            .unwrap()
            .push((bytes.len(), mime_type.to_string()));

        Ok(BlobHandle::new(BlobRef::Untyped(UnTypedBlobRef {
            cid: format!("mock-{}", uuid::Uuid::new_v4()),
            mime_type: mime_type.to_string(),
        })))
    }

    async fn publish(&self, record: &PostRecord) -> Result<String> {
        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        if !self.config.publish_succeeds {
            let message = self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| "Mock publish failed".to_string());
            return Err(PlatformError::Posting(message).into());
        }

        self.config.published.lock().unwrap().push(record.clone());

        Ok(format!(
            "at://did:plc:mock/app.bsky.feed.post/{}",
            uuid::Uuid::new_v4().simple()
        ))
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
