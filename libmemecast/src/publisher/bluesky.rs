//! Bluesky publisher built on bsky-sdk

use async_trait::async_trait;
use bsky_sdk::agent::config::Config as AgentConfig;
use bsky_sdk::api::app::bsky::embed::external::{ExternalData, MainData as ExternalMainData};
use bsky_sdk::api::app::bsky::embed::images::{ImageData, MainData as ImagesMainData};
use bsky_sdk::api::app::bsky::feed::post::{RecordData, RecordEmbedRefs};
use bsky_sdk::api::app::bsky::richtext::facet::{
    ByteSliceData, LinkData, Main as WireFacet, MainData as WireFacetData, MainFeaturesItem,
    MentionData, TagData,
};
use bsky_sdk::api::types::string::{Datetime, Did};
use bsky_sdk::api::types::Union;
use bsky_sdk::rich_text::RichText;
use bsky_sdk::BskyAgent;

use crate::config::BlueskyConfig;
use crate::error::{PlatformError, Result};
use crate::publisher::Publisher;
use crate::types::{BlobHandle, Embed, Facet, FacetFeature, PostRecord};

/// Map bsky-sdk / AT Protocol errors into the `PlatformError` taxonomy.
///
/// XRPC errors surface as display strings carrying status codes and AT
/// Protocol error names, so classification is by pattern.
fn map_bluesky_error<E: std::fmt::Display + std::fmt::Debug>(
    error: E,
    context: &str,
) -> PlatformError {
    let message = format!("{}", error);
    let debug = format!("{:?}", error);

    if message.contains("401")
        || message.contains("403")
        || message.contains("AuthenticationRequired")
        || message.contains("InvalidToken")
        || message.contains("ExpiredToken")
        || message.contains("InvalidCredentials")
        || message.contains("AccountNotFound")
        || debug.contains("Unauthorized")
        || debug.contains("Forbidden")
    {
        return PlatformError::Authentication(format!(
            "Bluesky authentication failed during {}: {}",
            context, message
        ));
    }

    if message.contains("429")
        || message.contains("RateLimitExceeded")
        || message.contains("TooManyRequests")
        || debug.contains("RateLimit")
    {
        return PlatformError::RateLimit(format!(
            "Bluesky rate limit hit during {}: {}",
            context, message
        ));
    }

    if message.contains("400")
        || message.contains("InvalidRequest")
        || message.contains("InvalidRecord")
        || debug.contains("BadRequest")
    {
        return PlatformError::Validation(format!(
            "Bluesky rejected the request during {}: {}",
            context, message
        ));
    }

    if message.contains("connection")
        || message.contains("network")
        || message.contains("timeout")
        || message.contains("dns")
        || debug.contains("Connect")
        || debug.contains("Timeout")
    {
        return PlatformError::Network(format!(
            "Network error talking to the PDS during {}: {}",
            context, message
        ));
    }

    if context == "blob upload" {
        PlatformError::Upload(message)
    } else {
        PlatformError::Posting(format!("Bluesky operation failed during {}: {}", context, message))
    }
}

pub struct BlueskyPublisher {
    agent: BskyAgent,
    handle: String,
    app_password: String,
    authenticated: bool,
}

impl BlueskyPublisher {
    /// Create a client against the configured PDS endpoint. No network
    /// traffic happens until [`Publisher::authenticate`].
    pub async fn new(config: &BlueskyConfig) -> Result<Self> {
        let agent = BskyAgent::builder()
            .config(AgentConfig {
                endpoint: config.service.clone(),
                ..Default::default()
            })
            .build()
            .await
            .map_err(|e| PlatformError::Authentication(format!("Failed to create agent: {}", e)))?;

        Ok(Self {
            agent,
            handle: config.handle.clone(),
            app_password: config.app_password.clone(),
            authenticated: false,
        })
    }

    fn ensure_authenticated(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(PlatformError::Authentication("Not authenticated".to_string()).into())
        }
    }
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    async fn authenticate(&mut self) -> Result<()> {
        tracing::debug!(handle = %self.handle, "Creating Bluesky session");

        self.agent
            .login(&self.handle, &self.app_password)
            .await
            .map_err(|e| map_bluesky_error(e, "authentication"))?;

        self.authenticated = true;
        tracing::debug!("Bluesky session created");
        Ok(())
    }

    async fn detect_facets(&self, text: &str) -> Result<Vec<Facet>> {
        let rich_text = RichText::new_with_detect_facets(text)
            .await
            .map_err(|e| map_bluesky_error(e, "facet detection"))?;

        Ok(from_wire_facets(rich_text.facets))
    }

    async fn upload_blob(&self, bytes: Vec<u8>, mime_type: &str) -> Result<BlobHandle> {
        self.ensure_authenticated()?;

        // The PDS determines the stored MIME type itself; ours is for logging
        tracing::debug!(size = bytes.len(), %mime_type, "Uploading blob");

        let output = self
            .agent
            .api
            .com
            .atproto
            .repo
            .upload_blob(bytes)
            .await
            .map_err(|e| map_bluesky_error(e, "blob upload"))?;

        Ok(BlobHandle::new(output.data.blob))
    }

    async fn publish(&self, record: &PostRecord) -> Result<String> {
        self.ensure_authenticated()?;

        tracing::debug!(
            chars = record.text.len(),
            facets = record.facets.len(),
            has_embed = record.embed.is_some(),
            "Posting to Bluesky"
        );

        let post = RecordData {
            created_at: Datetime::now(),
            embed: record.embed.as_ref().map(to_wire_embed),
            entities: None,
            facets: to_wire_facets(&record.facets)?,
            labels: None,
            langs: None,
            reply: None,
            tags: None,
            text: record.text.clone(),
        };

        let output = self
            .agent
            .create_record(post)
            .await
            .map_err(|e| map_bluesky_error(e, "posting"))?;

        let at_uri = output.data.uri.clone();
        tracing::debug!(%at_uri, "Posted to Bluesky");
        Ok(at_uri)
    }

    fn name(&self) -> &str {
        "bluesky"
    }
}

/// Flatten SDK facets into domain facets, one per feature.
fn from_wire_facets(facets: Option<Vec<WireFacet>>) -> Vec<Facet> {
    let mut out = Vec::new();
    for facet in facets.unwrap_or_default() {
        for feature in &facet.features {
            let Union::Refs(item) = feature else {
                continue;
            };
            let feature = match item {
                MainFeaturesItem::Mention(mention) => FacetFeature::Mention {
                    did: mention.did.as_str().to_string(),
                },
                MainFeaturesItem::Link(link) => FacetFeature::Link {
                    uri: link.uri.clone(),
                },
                MainFeaturesItem::Tag(tag) => FacetFeature::Tag {
                    tag: tag.tag.clone(),
                },
            };
            out.push(Facet {
                byte_start: facet.index.byte_start,
                byte_end: facet.index.byte_end,
                feature,
            });
        }
    }
    out
}

fn to_wire_facets(facets: &[Facet]) -> Result<Option<Vec<WireFacet>>> {
    if facets.is_empty() {
        return Ok(None);
    }

    let mut out = Vec::with_capacity(facets.len());
    for facet in facets {
        let feature = match &facet.feature {
            FacetFeature::Mention { did } => {
                let did = Did::new(did.clone()).map_err(|e| {
                    PlatformError::Validation(format!("Invalid DID in mention facet: {}", e))
                })?;
                Union::Refs(MainFeaturesItem::Mention(Box::new(MentionData { did }.into())))
            }
            FacetFeature::Link { uri } => Union::Refs(MainFeaturesItem::Link(Box::new(
                LinkData { uri: uri.clone() }.into(),
            ))),
            FacetFeature::Tag { tag } => Union::Refs(MainFeaturesItem::Tag(Box::new(
                TagData { tag: tag.clone() }.into(),
            ))),
        };

        out.push(
            WireFacetData {
                features: vec![feature],
                index: ByteSliceData {
                    byte_end: facet.byte_end,
                    byte_start: facet.byte_start,
                }
                .into(),
            }
            .into(),
        );
    }

    Ok(Some(out))
}

fn to_wire_embed(embed: &Embed) -> Union<RecordEmbedRefs> {
    match embed {
        Embed::Image { blob, alt } => Union::Refs(RecordEmbedRefs::AppBskyEmbedImagesMain(
            Box::new(
                ImagesMainData {
                    images: vec![ImageData {
                        alt: alt.clone(),
                        aspect_ratio: None,
                        image: blob.clone().into_blob_ref(),
                    }
                    .into()],
                }
                .into(),
            ),
        )),
        Embed::External {
            uri,
            title,
            description,
        } => Union::Refs(RecordEmbedRefs::AppBskyEmbedExternalMain(Box::new(
            ExternalMainData {
                external: ExternalData {
                    description: description.clone(),
                    thumb: None,
                    title: title.clone(),
                    uri: uri.clone(),
                }
                .into(),
            }
            .into(),
        ))),
    }
}
