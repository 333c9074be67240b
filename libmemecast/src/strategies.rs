//! Content fetch strategies
//!
//! Each strategy is one way of obtaining content from the meme API. A
//! strategy never raises past its boundary: every upstream problem becomes a
//! [`FetchOutcome::Failure`] so the resolver can move on to the next one.

use async_trait::async_trait;
use std::sync::Arc;

use crate::content_api::ContentApiClient;
use crate::error::ContentError;
use crate::types::{ContentRecord, FetchOutcome};

/// Caption used when the generate endpoint returns neither caption header.
pub const DEFAULT_GENERATED_TEXT: &str = "Freshly generated meme";

/// Hashtags rendered from a listing entry are capped at this many.
pub const MAX_HASHTAGS: usize = 3;

/// One named way of obtaining content.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Lowercase identifier used in log lines (e.g. "generate", "random")
    fn name(&self) -> &str;

    /// Attempt to produce a content record. On `Success` the record's text
    /// is guaranteed non-empty.
    async fn fetch(&self) -> FetchOutcome;
}

/// Strategy: ask the API to generate a fresh meme image.
pub struct GenerateStrategy {
    api: Arc<ContentApiClient>,
}

impl GenerateStrategy {
    pub fn new(api: Arc<ContentApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl FetchStrategy for GenerateStrategy {
    fn name(&self) -> &str {
        "generate"
    }

    async fn fetch(&self) -> FetchOutcome {
        let meme = match self.api.generate_image().await {
            Ok(meme) => meme,
            Err(e) => return FetchOutcome::failure(e.to_string()),
        };

        let text = caption_text(meme.top_text.as_deref(), meme.bottom_text.as_deref());
        let alt = generated_alt(
            meme.template.as_deref(),
            meme.top_text.as_deref(),
            meme.bottom_text.as_deref(),
        );

        FetchOutcome::Success(ContentRecord::with_image_bytes(
            text,
            meme.bytes,
            meme.mime_type,
            alt,
        ))
    }
}

/// Strategy: pull one existing meme from the random listing and download its
/// image.
pub struct RandomMemeStrategy {
    api: Arc<ContentApiClient>,
}

impl RandomMemeStrategy {
    pub fn new(api: Arc<ContentApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl FetchStrategy for RandomMemeStrategy {
    fn name(&self) -> &str {
        "random"
    }

    async fn fetch(&self) -> FetchOutcome {
        let memes = match self.api.random_memes(1).await {
            Ok(memes) => memes,
            Err(e) => return FetchOutcome::failure(e.to_string()),
        };

        let Some(meme) = memes.into_iter().next() else {
            return FetchOutcome::failure(ContentError::EmptyListing.to_string());
        };

        if meme.title.trim().is_empty() {
            return FetchOutcome::failure("listing entry had an empty title");
        }

        let image = match self.api.download_image(meme.best_image_url()).await {
            Ok(image) => image,
            Err(e) => return FetchOutcome::failure(e.to_string()),
        };

        let text = listing_text(&meme.title, &meme.tags);

        FetchOutcome::Success(ContentRecord::with_image_bytes(
            text,
            image.bytes,
            image.mime_type,
            meme.alt_text(),
        ))
    }
}

/// Join top and bottom captions as `"{top} / {bottom}"`; a single caption
/// stands alone; neither yields the fixed default.
fn caption_text(top: Option<&str>, bottom: Option<&str>) -> String {
    let top = top.map(str::trim).filter(|s| !s.is_empty());
    let bottom = bottom.map(str::trim).filter(|s| !s.is_empty());

    match (top, bottom) {
        (Some(top), Some(bottom)) => format!("{} / {}", top, bottom),
        (Some(top), None) => top.to_string(),
        (None, Some(bottom)) => bottom.to_string(),
        (None, None) => DEFAULT_GENERATED_TEXT.to_string(),
    }
}

/// Alt text for a generated meme: "Meme", the template in parentheses, and
/// the captions quoted, joined with " - ". Absent pieces are skipped.
fn generated_alt(template: Option<&str>, top: Option<&str>, bottom: Option<&str>) -> String {
    let mut parts = vec!["Meme".to_string()];

    if let Some(template) = template.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(format!("({})", template));
    }
    if let Some(top) = top.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(format!("Top text: \"{}\"", top));
    }
    if let Some(bottom) = bottom.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(format!("Bottom text: \"{}\"", bottom));
    }

    parts.join(" - ")
}

/// Post text for a listing entry: the title, then (when any tags exist) a
/// blank line and up to [`MAX_HASHTAGS`] whitespace-stripped hashtags.
fn listing_text(title: &str, tags: &[String]) -> String {
    let hashtags: Vec<String> = tags
        .iter()
        .take(MAX_HASHTAGS)
        .map(|tag| tag.split_whitespace().collect::<String>())
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("#{}", tag))
        .collect();

    if hashtags.is_empty() {
        title.trim().to_string()
    } else {
        format!("{}\n\n{}", title.trim(), hashtags.join(" "))
    }
}
