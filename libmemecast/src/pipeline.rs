//! Run-once publishing pipeline
//!
//! One invocation performs exactly one unauthenticated → authenticated →
//! posted sequence: authenticate, resolve content through the fallback chain,
//! assemble the post record, submit it, and return the AT URI. There is no
//! retry here; the external scheduler is the retry mechanism.

use std::sync::Arc;
use tracing::info;

use crate::assembler::{ImageFetcher, PostAssembler};
use crate::config::{Config, ImageFailurePolicy};
use crate::content_api::ContentApiClient;
use crate::error::Result;
use crate::publisher::bluesky::BlueskyPublisher;
use crate::publisher::Publisher;
use crate::resolver::FallbackResolver;
use crate::strategies::{FetchStrategy, GenerateStrategy, RandomMemeStrategy};

/// Build the production strategy list: generation first, existing memes as
/// the backup. Order is the fallback priority.
fn build_strategies(api: Arc<ContentApiClient>) -> Vec<Box<dyn FetchStrategy>> {
    vec![
        Box::new(GenerateStrategy::new(api.clone())),
        Box::new(RandomMemeStrategy::new(api)),
    ]
}

/// Run one full publish and return the published post's AT URI.
pub async fn run_once(config: &Config) -> Result<String> {
    let api = Arc::new(ContentApiClient::new(&config.content_api)?);

    let resolver = FallbackResolver::new(
        build_strategies(api.clone()),
        config.posting.fallback_text.clone(),
    );

    let mut publisher = BlueskyPublisher::new(&config.bluesky).await?;

    run_with(
        &mut publisher,
        &resolver,
        api.as_ref(),
        config.posting.image_failure,
    )
    .await
}

/// Pipeline body, parameterized over its collaborators so tests can drive it
/// with mocks.
pub async fn run_with(
    publisher: &mut dyn Publisher,
    resolver: &FallbackResolver,
    images: &dyn ImageFetcher,
    policy: ImageFailurePolicy,
) -> Result<String> {
    // Authenticate before any content work so credential problems abort the
    // run without spending requests on the content API.
    publisher.authenticate().await?;
    info!(platform = publisher.name(), "Authenticated");

    let content = resolver.resolve().await;
    info!(
        text_only = content.is_text_only(),
        chars = content.text.len(),
        "Content resolved"
    );

    let assembler = PostAssembler::new(&*publisher, images, policy);
    let post = assembler.assemble(&content).await?;

    let at_uri = publisher.publish(&post).await?;
    info!(%at_uri, "Post published");
    Ok(at_uri)
}
