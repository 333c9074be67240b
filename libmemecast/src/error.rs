//! Error types for Memecast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemecastError>;

#[derive(Error, Debug)]
pub enum MemecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl MemecastError {
    /// Returns the appropriate exit code for this error
    ///
    /// Authentication failures map to 2 so an external scheduler can
    /// distinguish "fix your credentials" from a transient run failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            MemecastError::InvalidInput(_) => 3,
            MemecastError::Platform(PlatformError::Authentication(_)) => 2,
            MemecastError::Platform(_) => 1,
            MemecastError::Config(_) => 1,
            MemecastError::Content(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidVar { name: String, message: String },
}

/// Errors from the content API and image downloads.
///
/// Inside a fetch strategy these are recovered locally (the strategy reports
/// `FetchOutcome::Failure` and the resolver moves on); during post assembly
/// they are hard errors under the default image-failure policy.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Listing returned no memes")]
    EmptyListing,
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Blob upload failed: {0}")]
    Upload(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}
