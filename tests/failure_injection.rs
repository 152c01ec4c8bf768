//! Failure injection tests: flaky upstreams and outbound rate limiting.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::Value;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::{
    hits, llm_reply, mount_analysis, mount_papers, papers_body, start_server, test_config,
    ANALYSIS_MARKER,
};

#[tokio::test]
async fn test_search_recovers_from_rate_limiting() {
    let scholar = MockServer::start().await;
    let llm = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&scholar)
        .await;
    mount_papers(&scholar, papers_body()).await;
    mount_analysis(&llm).await;

    let server = start_server(test_config(&scholar, &llm)).await;
    let res = server.analyze("graph neural networks").await;

    assert_eq!(res.status(), StatusCode::OK, "Should eventually succeed after retries");
    assert_eq!(hits(&scholar, "/paper/search").await, 3);
}

#[tokio::test]
async fn test_bad_search_request_is_not_retried() {
    let scholar = MockServer::start().await;
    let llm = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid query"))
        .mount(&scholar)
        .await;

    let server = start_server(test_config(&scholar, &llm)).await;
    let res = server.analyze("graph neural networks").await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(hits(&scholar, "/paper/search").await, 1);
}

#[tokio::test]
async fn test_malformed_model_output_is_retried() {
    let scholar = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_papers(&scholar, papers_body()).await;
    Mock::given(method("POST"))
        .and(body_string_contains(ANALYSIS_MARKER))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply("Here are my thoughts...")))
        .up_to_n_times(1)
        .mount(&llm)
        .await;
    mount_analysis(&llm).await;

    let server = start_server(test_config(&scholar, &llm)).await;
    let body: Value = server.analyze("graph neural networks").await.json().await.unwrap();

    assert!(body.get("analysis_error").is_none());
    assert_eq!(body["novelty_assessment"], "Incremental");
    assert_eq!(llm.received_requests().await.unwrap().len(), 2);
    assert_eq!(server.state.reports.size(), 1);
}

#[tokio::test]
async fn test_concurrent_searches_share_the_rate_limit() {
    let scholar = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_papers(&scholar, papers_body()).await;
    mount_analysis(&llm).await;

    let mut config = test_config(&scholar, &llm);
    config.scholar.min_interval_ms = 250;
    let server = start_server(config).await;

    let start = Instant::now();
    let (a, b, c) = tokio::join!(
        server.analyze("graph attention"),
        server.analyze("graph transformers"),
        server.analyze("graph sampling"),
    );
    let elapsed = start.elapsed();

    for res in [a, b, c] {
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert_eq!(hits(&scholar, "/paper/search").await, 3);
    // Three searches through one limiter need at least two full intervals.
    assert!(elapsed >= Duration::from_millis(500), "elapsed {elapsed:?}");
}
