//! Assembly of a content record into a platform post record
//!
//! Facet detection is delegated to the publisher (mention resolution needs
//! the platform directory); embed selection is a strict priority: image bytes
//! beat a remote image URL, and any image beats an external link card.

use async_trait::async_trait;
use tracing::warn;

use crate::config::ImageFailurePolicy;
use crate::content_api::{ContentApiClient, DownloadedImage, DEFAULT_GENERATED_MIME};
use crate::error::{ContentError, MemecastError, Result};
use crate::publisher::Publisher;
use crate::types::{ContentRecord, Embed, PostRecord};

/// Seam for fetching a remote image during assembly.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_image(&self, url: &str) -> std::result::Result<DownloadedImage, ContentError>;
}

#[async_trait]
impl ImageFetcher for ContentApiClient {
    async fn fetch_image(&self, url: &str) -> std::result::Result<DownloadedImage, ContentError> {
        self.download_image(url).await
    }
}

pub struct PostAssembler<'a> {
    publisher: &'a dyn Publisher,
    images: &'a dyn ImageFetcher,
    policy: ImageFailurePolicy,
}

impl<'a> PostAssembler<'a> {
    pub fn new(
        publisher: &'a dyn Publisher,
        images: &'a dyn ImageFetcher,
        policy: ImageFailurePolicy,
    ) -> Self {
        Self {
            publisher,
            images,
            policy,
        }
    }

    /// Build the platform post record for `record`.
    ///
    /// Under [`ImageFailurePolicy::Abort`] (the default) a failed image fetch
    /// or upload is a hard error: silently dropping the image would change
    /// the intended post. [`ImageFailurePolicy::SkipImage`] logs the failure
    /// and posts text-only instead.
    pub async fn assemble(&self, record: &ContentRecord) -> Result<PostRecord> {
        let facets = self.publisher.detect_facets(&record.text).await?;

        let embed = match self.build_embed(record).await {
            Ok(embed) => embed,
            Err(e) => match self.policy {
                ImageFailurePolicy::Abort => return Err(e),
                ImageFailurePolicy::SkipImage => {
                    warn!(error = %e, "Image embed failed, posting without it per policy");
                    None
                }
            },
        };

        Ok(PostRecord {
            text: record.text.clone(),
            facets,
            embed,
        })
    }

    async fn build_embed(&self, record: &ContentRecord) -> Result<Option<Embed>> {
        if let Some(bytes) = &record.image_bytes {
            let mime_type = record
                .image_mime_type
                .as_deref()
                .unwrap_or(DEFAULT_GENERATED_MIME);
            let blob = self.publisher.upload_blob(bytes.clone(), mime_type).await?;
            return Ok(Some(Embed::Image {
                blob,
                alt: record.image_alt.clone().unwrap_or_default(),
            }));
        }

        if let Some(url) = &record.image_url {
            let image = self
                .images
                .fetch_image(url)
                .await
                .map_err(MemecastError::Content)?;
            let blob = self
                .publisher
                .upload_blob(image.bytes, &image.mime_type)
                .await?;
            return Ok(Some(Embed::Image {
                blob,
                alt: record.image_alt.clone().unwrap_or_default(),
            }));
        }

        if let Some(uri) = &record.external_url {
            return Ok(Some(Embed::External {
                uri: uri.clone(),
                title: record.external_title.clone().unwrap_or_default(),
                description: record.external_description.clone().unwrap_or_default(),
            }));
        }

        Ok(None)
    }
}
