//! End-to-end pipeline tests over a mocked content API and publisher

use std::sync::Arc;

use libmemecast::assembler::ImageFetcher;
use libmemecast::config::{ContentApiConfig, ImageFailurePolicy};
use libmemecast::content_api::ContentApiClient;
use libmemecast::pipeline::run_with;
use libmemecast::publisher::mock::{MockPublisher, MockPublisherConfig};
use libmemecast::resolver::FallbackResolver;
use libmemecast::strategies::{FetchStrategy, GenerateStrategy, RandomMemeStrategy};
use libmemecast::types::{Embed, FetchOutcome};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FALLBACK: &str = "Check out https://memes.example.com for fresh memes!";

fn pipeline_parts(server: &MockServer) -> (Arc<ContentApiClient>, FallbackResolver) {
    let api = Arc::new(
        ContentApiClient::new(&ContentApiConfig {
            base_url: server.uri(),
            api_key: None,
            timeout_secs: 5,
        })
        .unwrap(),
    );

    let strategies: Vec<Box<dyn FetchStrategy>> = vec![
        Box::new(GenerateStrategy::new(api.clone())),
        Box::new(RandomMemeStrategy::new(api.clone())),
    ];
    let resolver = FallbackResolver::new(strategies, FALLBACK);

    (api, resolver)
}

fn images_of(api: &Arc<ContentApiClient>) -> &dyn ImageFetcher {
    api.as_ref()
}

#[tokio::test]
async fn generate_strategy_drives_an_image_post() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memes/generate/image"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .insert_header("x-meme-top-text", "WHEN%20THE%20CODE")
                .insert_header("x-meme-bottom-text", "FINALLY%20COMPILES")
                .set_body_bytes(vec![1, 2, 3, 4, 5]),
        )
        .mount(&server)
        .await;

    let (api, resolver) = pipeline_parts(&server);
    let mut publisher = MockPublisher::new(MockPublisherConfig::default());

    let at_uri = run_with(
        &mut publisher,
        &resolver,
        images_of(&api),
        ImageFailurePolicy::Abort,
    )
    .await
    .unwrap();

    assert!(at_uri.starts_with("at://"));
    assert_eq!(publisher.auth_call_count(), 1);
    assert_eq!(publisher.uploads(), vec![(5, "image/png".to_string())]);

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].text, "WHEN THE CODE / FINALLY COMPILES");
    match &published[0].embed {
        Some(Embed::Image { alt, .. }) => {
            assert!(alt.contains("Top text: \"WHEN THE CODE\""));
            assert!(alt.contains("Bottom text: \"FINALLY COMPILES\""));
        }
        other => panic!("expected image embed, got {:?}", other),
    }
}

#[tokio::test]
async fn random_strategy_takes_over_when_generation_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memes/generate/image"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "memes": [{
                    "title": "Distracted coder",
                    "image_url": format!("{}/img/42.jpg", server.uri()),
                    "description": "A coder ignoring a bug",
                    "tags": ["funny", "meme"]
                }]
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/42.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![9, 9, 9]),
        )
        .mount(&server)
        .await;

    let (api, resolver) = pipeline_parts(&server);
    let mut publisher = MockPublisher::new(MockPublisherConfig::default());

    run_with(
        &mut publisher,
        &resolver,
        images_of(&api),
        ImageFailurePolicy::Abort,
    )
    .await
    .unwrap();

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert!(published[0].text.contains("Distracted coder"));
    assert!(published[0].text.contains("#funny"));
    assert!(published[0].text.contains("#meme"));
    match &published[0].embed {
        Some(Embed::Image { alt, .. }) => assert_eq!(alt, "A coder ignoring a bug"),
        other => panic!("expected image embed, got {:?}", other),
    }
}

#[tokio::test]
async fn exhausted_chain_posts_the_fallback_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memes/generate/image"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let (api, resolver) = pipeline_parts(&server);
    let mut publisher = MockPublisher::new(MockPublisherConfig::default());

    run_with(
        &mut publisher,
        &resolver,
        images_of(&api),
        ImageFailurePolicy::Abort,
    )
    .await
    .unwrap();

    let published = publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].text, FALLBACK);
    assert!(published[0].embed.is_none());
    assert!(publisher.uploads().is_empty());
}

#[tokio::test]
async fn empty_listing_counts_as_a_strategy_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memes/generate/image"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "memes": [] } })),
        )
        .mount(&server)
        .await;

    let (api, resolver) = pipeline_parts(&server);
    let mut publisher = MockPublisher::new(MockPublisherConfig::default());

    run_with(
        &mut publisher,
        &resolver,
        images_of(&api),
        ImageFailurePolicy::Abort,
    )
    .await
    .unwrap();

    assert_eq!(publisher.published()[0].text, FALLBACK);
}

#[tokio::test]
async fn random_strategy_reports_the_empty_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "memes": [] } })),
        )
        .mount(&server)
        .await;

    let (api, _) = pipeline_parts(&server);
    let strategy = RandomMemeStrategy::new(api);

    match strategy.fetch().await {
        FetchOutcome::Failure(reason) => assert_eq!(reason, "Listing returned no memes"),
        FetchOutcome::Success(_) => panic!("expected failure for an empty listing"),
    }
}

#[tokio::test]
async fn blank_title_listing_entry_counts_as_a_strategy_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memes/generate/image"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "memes": [{
                    "title": "  ",
                    "image_url": format!("{}/img/7.jpg", server.uri())
                }]
            }
        })))
        .mount(&server)
        .await;

    let (api, resolver) = pipeline_parts(&server);
    let mut publisher = MockPublisher::new(MockPublisherConfig::default());

    run_with(
        &mut publisher,
        &resolver,
        images_of(&api),
        ImageFailurePolicy::Abort,
    )
    .await
    .unwrap();

    // The malformed entry is rejected before its image is ever requested
    let downloads: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path().starts_with("/img/"))
        .collect();
    assert!(downloads.is_empty());

    assert_eq!(publisher.published()[0].text, FALLBACK);
    assert!(publisher.uploads().is_empty());
}

#[tokio::test]
async fn authentication_failure_aborts_before_content_work() {
    let server = MockServer::start().await;
    // No mocks mounted: any request to the content API would 404 loudly,
    // but none should be made at all.

    let (api, resolver) = pipeline_parts(&server);
    let mut publisher = MockPublisher::auth_failure("bad app password");

    let err = run_with(
        &mut publisher,
        &resolver,
        images_of(&api),
        ImageFailurePolicy::Abort,
    )
    .await
    .unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(publisher.published().is_empty());
}

#[tokio::test]
async fn publish_failure_surfaces() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/memes/generate/image"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/random"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (api, resolver) = pipeline_parts(&server);
    let mut publisher = MockPublisher::new(MockPublisherConfig {
        publish_succeeds: false,
        publish_error: Some("record rejected".to_string()),
        ..Default::default()
    });

    let err = run_with(
        &mut publisher,
        &resolver,
        images_of(&api),
        ImageFailurePolicy::Abort,
    )
    .await
    .unwrap_err();

    assert!(format!("{}", err).contains("record rejected"));
    assert_eq!(err.exit_code(), 1);
}
