//! Memecast - a run-once meme bot for Bluesky
//!
//! This library provides the publishing pipeline: content acquisition from a
//! meme API through a prioritized fallback chain, assembly of the platform
//! post record, and submission to Bluesky.

pub mod assembler;
pub mod config;
pub mod content_api;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod publisher;
pub mod resolver;
pub mod strategies;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ImageFailurePolicy};
pub use error::{MemecastError, Result};
pub use types::{ContentRecord, Embed, Facet, FetchOutcome, PostRecord};
