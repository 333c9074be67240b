//! HTTP client for the upstream meme API
//!
//! Two endpoints are used: `POST /memes/generate/image`, which answers with
//! raw image bytes plus percent-encoded caption headers, and
//! `GET /random?count=N`, which answers with a JSON listing. Responses are
//! validated into explicit structs; a shape mismatch is an error, never a
//! panic.

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;

use crate::config::ContentApiConfig;
use crate::error::ContentError;

/// MIME type assumed for generated output when the header is absent.
pub const DEFAULT_GENERATED_MIME: &str = "image/png";

/// MIME type assumed for downloads without a `Content-Type`.
pub const DEFAULT_DOWNLOAD_MIME: &str = "image/jpeg";

pub struct ContentApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Result of the generate endpoint: the rendered image plus the caption
/// metadata carried in response headers.
#[derive(Debug, Clone)]
pub struct GeneratedMeme {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub top_text: Option<String>,
    pub bottom_text: Option<String>,
    pub template: Option<String>,
}

/// One entry from the random listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomMeme {
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub watermarked_image_url: Option<String>,
    #[serde(default)]
    pub ai_alt_text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RandomMeme {
    /// Alt text preference: AI description, then plain description, then title.
    pub fn alt_text(&self) -> &str {
        self.ai_alt_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.description
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            })
            .unwrap_or(&self.title)
    }

    /// The URL to download: the watermarked rendition when available.
    pub fn best_image_url(&self) -> &str {
        self.watermarked_image_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.image_url)
    }
}

#[derive(Debug, Deserialize)]
struct RandomListing {
    data: RandomListingData,
}

#[derive(Debug, Deserialize)]
struct RandomListingData {
    memes: Vec<RandomMeme>,
}

/// An image fetched from an arbitrary URL.
#[derive(Debug, Clone)]
pub struct DownloadedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ContentApiClient {
    pub fn new(config: &ContentApiConfig) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Request a freshly generated meme image.
    pub async fn generate_image(&self) -> Result<GeneratedMeme, ContentError> {
        let url = format!("{}/memes/generate/image", self.base_url);
        tracing::debug!(%url, "Requesting generated meme");

        let mut request = self.client.post(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ContentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let headers = resp.headers().clone();
        let mime_type = content_type(&headers, DEFAULT_GENERATED_MIME);
        let top_text = decoded_header(&headers, "x-meme-top-text");
        let bottom_text = decoded_header(&headers, "x-meme-bottom-text");
        let template = decoded_header(&headers, "x-meme-template");

        let bytes = resp.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(ContentError::MalformedResponse(
                "generate endpoint returned an empty body".to_string(),
            ));
        }

        tracing::info!(
            size = bytes.len(),
            %mime_type,
            template = template.as_deref().unwrap_or(""),
            "Generated meme received"
        );

        Ok(GeneratedMeme {
            bytes,
            mime_type,
            top_text,
            bottom_text,
            template,
        })
    }

    /// Fetch `count` random memes from the listing endpoint.
    pub async fn random_memes(&self, count: u32) -> Result<Vec<RandomMeme>, ContentError> {
        let url = format!("{}/random?count={}", self.base_url, count);
        tracing::debug!(%url, "Requesting random meme listing");

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }
        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ContentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let listing: RandomListing = resp
            .json()
            .await
            .map_err(|e| ContentError::MalformedResponse(e.to_string()))?;

        tracing::info!(count = listing.data.memes.len(), "Random listing received");
        Ok(listing.data.memes)
    }

    /// Download an image, inferring its MIME type from the response.
    pub async fn download_image(&self, url: &str) -> Result<DownloadedImage, ContentError> {
        tracing::debug!(%url, "Downloading image");

        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ContentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mime_type = content_type(resp.headers(), DEFAULT_DOWNLOAD_MIME);
        let bytes = resp.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(ContentError::MalformedResponse(format!(
                "empty image body from {}",
                url
            )));
        }

        Ok(DownloadedImage { bytes, mime_type })
    }
}

/// `Content-Type` without its parameters, or the given default.
fn content_type(headers: &HeaderMap, default: &str) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a header and percent-decode it (headers are restricted to a
/// transportable character set, so the API encodes caption text). An
/// undecodable value is passed through as-is rather than dropped.
fn decoded_header(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(name)?.to_str().ok()?;
    if raw.is_empty() {
        return None;
    }
    Some(
        urlencoding::decode(raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
    )
}
