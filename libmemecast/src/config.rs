//! Configuration management for Memecast
//!
//! All settings come from `MEMECAST_*` environment variables and are gathered
//! into an explicit [`Config`] that gets passed into the clients, so nothing
//! below this layer reads the process environment.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// Default per-request timeout applied to every content API call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Posted verbatim when every fetch strategy fails.
pub const DEFAULT_FALLBACK_TEXT: &str = "Check out https://memes.example.com for fresh memes!";

const DEFAULT_BLUESKY_SERVICE: &str = "https://bsky.social";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bluesky: BlueskyConfig,
    pub content_api: ContentApiConfig,
    pub posting: PostingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    /// Bluesky handle (e.g. "memebot.bsky.social")
    pub handle: String,
    /// App password for the account
    pub app_password: String,
    /// PDS endpoint to log in against
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentApiConfig {
    /// Base URL of the meme API, without a trailing slash
    pub base_url: String,
    /// Optional `X-API-Key` header value
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingConfig {
    /// Text posted when every fetch strategy fails
    pub fallback_text: String,
    /// What to do when the chosen image cannot be fetched or uploaded
    pub image_failure: ImageFailurePolicy,
}

/// Policy for a failed image fetch/upload during post assembly.
///
/// `Abort` is the default: silently dropping the image would change the
/// intended post, so the run fails instead. `SkipImage` restores the
/// permissive behavior of posting the text without the embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFailurePolicy {
    #[default]
    Abort,
    SkipImage,
}

impl FromStr for ImageFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(ImageFailurePolicy::Abort),
            "skip" => Ok(ImageFailurePolicy::SkipImage),
            _ => Err(format!(
                "Invalid image failure policy: '{}'. Valid options: abort, skip",
                s
            )),
        }
    }
}

impl Config {
    /// Build the configuration from `MEMECAST_*` environment variables
    ///
    /// Required: `MEMECAST_BLUESKY_HANDLE`, `MEMECAST_BLUESKY_APP_PASSWORD`,
    /// `MEMECAST_API_BASE_URL`. Everything else has a default.
    pub fn from_env() -> Result<Self> {
        let handle = require_var("MEMECAST_BLUESKY_HANDLE")?;
        let app_password = require_var("MEMECAST_BLUESKY_APP_PASSWORD")?;
        let service = std::env::var("MEMECAST_BLUESKY_SERVICE")
            .unwrap_or_else(|_| DEFAULT_BLUESKY_SERVICE.to_string());

        let base_url = require_var("MEMECAST_API_BASE_URL")?;
        let api_key = std::env::var("MEMECAST_API_KEY").ok();

        let timeout_secs = match std::env::var("MEMECAST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: "MEMECAST_TIMEOUT_SECS".to_string(),
                message: format!("'{}' is not a number of seconds", raw),
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let fallback_text = std::env::var("MEMECAST_FALLBACK_TEXT")
            .unwrap_or_else(|_| DEFAULT_FALLBACK_TEXT.to_string());

        let image_failure = match std::env::var("MEMECAST_ON_IMAGE_FAILURE") {
            Ok(raw) => raw.parse().map_err(|message| ConfigError::InvalidVar {
                name: "MEMECAST_ON_IMAGE_FAILURE".to_string(),
                message,
            })?,
            Err(_) => ImageFailurePolicy::default(),
        };

        Ok(Self {
            bluesky: BlueskyConfig {
                handle,
                app_password,
                service,
            },
            content_api: ContentApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                api_key,
                timeout_secs,
            },
            posting: PostingConfig {
                fallback_text,
                image_failure,
            },
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name.to_string()).into()),
    }
}
