//! Shared utilities for integration tests.

use std::net::SocketAddr;

use research_lens::config::{LensConfig, RetryConfig};
use research_lens::http::{AppState, HttpServer};
use research_lens::resilience::ErrorKind;
use research_lens::Shutdown;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ANALYSIS_MARKER: &str = "research intelligence assistant";
pub const PROPOSAL_MARKER: &str = "research proposal writer";

/// A running server and handles to poke at it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.addr, route)
    }

    pub async fn analyze(&self, topic: &str) -> reqwest::Response {
        self.client
            .post(self.url("/analyze"))
            .json(&json!({ "topic": topic }))
            .send()
            .await
            .expect("server unreachable")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

fn fast_retries(max_retries: u32, retry_on: Vec<ErrorKind>) -> RetryConfig {
    RetryConfig {
        max_retries,
        base_delay_ms: 10,
        backoff_factor: 2.0,
        max_delay_ms: None,
        jitter_ratio: 0.0,
        retry_on,
    }
}

/// Config pointing both upstreams at mock servers, with short delays.
pub fn test_config(scholar: &MockServer, llm: &MockServer) -> LensConfig {
    let mut config = LensConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.scholar.base_url = scholar.uri();
    config.scholar.api_key = Some("scholar-key".into());
    config.scholar.min_interval_ms = 0;
    config.llm.base_url = llm.uri();
    config.llm.api_key = Some("llm-key".into());
    config.retries.scholar = fast_retries(2, vec![ErrorKind::Transient]);
    config.retries.llm = fast_retries(1, vec![ErrorKind::Transient, ErrorKind::ResponseMalformed]);
    config
}

pub async fn start_server(config: LensConfig) -> TestServer {
    let server = HttpServer::new(config).expect("server should build");
    let state = server.state().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        shutdown,
        state,
        client: reqwest::Client::builder().no_proxy().build().unwrap(),
    }
}

pub fn papers_body() -> Value {
    json!({
        "total": 3,
        "data": [
            {
                "paperId": "p1",
                "title": "Graph Attention Networks",
                "abstract": "We present graph attention networks.",
                "year": 2018,
                "citationCount": 9000,
                "authors": [{"name": "Petar Velickovic"}, {"name": "Guillem Cucurull"}, {"name": "Arantxa Casanova"}],
                "externalIds": {"DOI": "10.48550/arXiv.1710.10903"},
                "venue": "ICLR"
            },
            {
                "paperId": "p2",
                "title": "Scaling Graph Transformers",
                "abstract": null,
                "year": 2023,
                "citationCount": 40,
                "authors": [{"name": "Ada Lovelace"}],
                "url": "https://www.semanticscholar.org/paper/p2",
                "journal": {"name": "Journal of Graphs", "volume": "7", "pages": "1-20"}
            },
            {
                "paperId": "p3",
                "title": null,
                "year": 2024
            }
        ]
    })
}

pub fn llm_reply(text: &str) -> Value {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]})
}

pub fn analysis_text() -> String {
    json!({
        "research_gaps": ["Few benchmarks for dynamic graphs (Velickovic et al., 2018)"],
        "research_questions": ["Can attention scale to billion-edge graphs?"],
        "methodology_suggestions": ["Sparse attention with sampling (Lovelace, 2023)"],
        "novelty_assessment": "Incremental"
    })
    .to_string()
}

pub fn proposal_text() -> String {
    json!({
        "title": "Attention for Dynamic Graphs",
        "introduction": "Intro",
        "literature_review": "Review",
        "research_questions": ["RQ1"],
        "methodology": "Method",
        "expected_outcomes": "Outcomes",
        "timeline": "12 months"
    })
    .to_string()
}

pub async fn mount_papers(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/paper/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_analysis(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_string_contains(ANALYSIS_MARKER))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(&analysis_text())))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub async fn mount_proposal(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_string_contains(PROPOSAL_MARKER))
        .respond_with(ResponseTemplate::new(200).set_body_json(llm_reply(&proposal_text())))
        .mount(server)
        .await;
}

/// Requests the mock received on `route`.
pub async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}
