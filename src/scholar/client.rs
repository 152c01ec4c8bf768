//! Paper search API client.
//!
//! Every attempt goes through the shared rate limiter first, and the whole
//! attempt (limiter wait, request, decode) is what the retry policy re-runs.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::{ScholarConfig, TimeoutConfig};
use crate::observability::metrics;
use crate::resilience::{self, RateLimiter, RetryPolicy};
use crate::scholar::process::process_papers;
use crate::scholar::types::{Paper, RawPaper, ScholarError, ScholarResult, SearchResponse};

const UPSTREAM: &str = "scholar";

#[derive(Debug)]
pub struct ScholarClient {
    http: reqwest::Client,
    search_url: Url,
    api_key: Option<String>,
    fields: String,
    papers_per_request: u32,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
}

impl ScholarClient {
    pub fn new(
        config: &ScholarConfig,
        timeouts: &TimeoutConfig,
        policy: RetryPolicy,
        limiter: Arc<RateLimiter>,
    ) -> ScholarResult<Self> {
        let search_url = search_url(&config.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(ScholarError::Client)?;

        Ok(Self {
            http,
            search_url,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            fields: config.fields.clone(),
            papers_per_request: config.papers_per_request,
            limiter,
            policy,
        })
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Search for papers, retrying transient failures.
    pub async fn search_papers(&self, topic: &str, limit: u32) -> ScholarResult<Vec<RawPaper>> {
        tracing::info!(topic = %topic, limit, "Searching papers");
        resilience::run(move || self.search_once(topic, limit), &self.policy).await
    }

    /// Search, then filter and order the results.
    pub async fn fetch_and_process_papers(&self, topic: &str) -> ScholarResult<Vec<Paper>> {
        let raw = self.search_papers(topic, self.papers_per_request).await?;
        let found = raw.len();
        let papers = process_papers(raw);
        tracing::info!(topic = %topic, found, kept = papers.len(), "Processed papers");
        Ok(papers)
    }

    async fn search_once(&self, topic: &str, limit: u32) -> ScholarResult<Vec<RawPaper>> {
        self.limiter.wait().await;

        let limit = limit.to_string();
        let mut request = self.http.get(self.search_url.clone()).query(&[
            ("query", topic),
            ("limit", limit.as_str()),
            ("fields", self.fields.as_str()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let result = self.send(request).await;
        metrics::record_upstream_call(UPSTREAM, if result.is_ok() { "success" } else { "failure" });
        result
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ScholarResult<Vec<RawPaper>> {
        let response = request.send().await.map_err(ScholarError::from_reqwest)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ScholarError::from_status(status.as_u16(), body));
        }

        let bytes = response.bytes().await.map_err(ScholarError::from_reqwest)?;
        let decoded: SearchResponse =
            serde_json::from_slice(&bytes).map_err(|e| ScholarError::Decode(e.to_string()))?;

        match decoded.data {
            Some(data) => {
                tracing::debug!(count = data.len(), total = ?decoded.total, "Search returned");
                Ok(data)
            }
            None => {
                tracing::warn!("Search response has no data field");
                Ok(Vec::new())
            }
        }
    }
}

fn search_url(base_url: &str) -> ScholarResult<Url> {
    let invalid = |reason: String| ScholarError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };
    let joined = format!("{}/paper/search", base_url.trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{Classify, ErrorKind};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with_limiter(
        server: &MockServer,
        api_key: Option<&str>,
        max_retries: u32,
        limiter: Arc<RateLimiter>,
    ) -> ScholarClient {
        let config = ScholarConfig {
            base_url: server.uri(),
            api_key: api_key.map(str::to_string),
            ..ScholarConfig::default()
        };
        let policy = RetryPolicy::new(max_retries, Duration::from_millis(5), 2.0);
        ScholarClient::new(&config, &TimeoutConfig::default(), policy, limiter).unwrap()
    }

    fn client(server: &MockServer, api_key: Option<&str>, max_retries: u32) -> ScholarClient {
        let limiter = Arc::new(RateLimiter::new(Duration::ZERO));
        client_with_limiter(server, api_key, max_retries, limiter)
    }

    fn search_body() -> serde_json::Value {
        serde_json::json!({
            "total": 3,
            "data": [
                {"title": "Older", "year": 2019, "citationCount": 900},
                {"title": null, "year": 2024},
                {"title": "Newer", "year": 2023, "citationCount": 4,
                 "externalIds": {"DOI": "10.1/new"}}
            ]
        })
    }

    #[tokio::test]
    async fn test_search_sends_query_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/search"))
            .and(query_param("query", "graph neural networks"))
            .and(query_param("limit", "50"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(1)
            .mount(&server)
            .await;

        let papers = client(&server, Some("secret"), 0)
            .fetch_and_process_papers("graph neural networks")
            .await
            .unwrap();

        let titles: Vec<&str> = papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
        assert_eq!(papers[0].url.as_deref(), Some("https://doi.org/10.1/new"));
    }

    #[tokio::test]
    async fn test_rate_limited_then_recovers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .mount(&server)
            .await;

        let raw = client(&server, None, 3).search_papers("topic", 10).await.unwrap();

        assert_eq!(raw.len(), 3);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_bad_request_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad query"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, None, 3).search_papers("topic", 10).await.unwrap_err();

        assert!(matches!(err, ScholarError::BadRequest(ref body) if body == "bad query"));
        assert_eq!(err.kind(), ErrorKind::PermanentRequest);
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server, None, 2).search_papers("topic", 10).await.unwrap_err();

        assert!(matches!(err, ScholarError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_missing_data_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"total": 0})))
            .mount(&server)
            .await;

        let raw = client(&server, None, 0).search_papers("topic", 10).await.unwrap();
        assert!(raw.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, None, 3).search_papers("topic", 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseMalformed);
    }

    #[tokio::test]
    async fn test_clients_sharing_a_limiter_are_spaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
            .expect(4)
            .mount(&server)
            .await;

        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(150)));
        let first = client_with_limiter(&server, None, 0, limiter.clone());
        let second = client_with_limiter(&server, None, 0, limiter.clone());
        assert!(Arc::ptr_eq(first.limiter(), second.limiter()));
        assert_eq!(first.limiter().min_interval(), Duration::from_millis(150));

        let start = std::time::Instant::now();
        let (a, b, c, d) = tokio::join!(
            first.search_papers("topic", 10),
            second.search_papers("topic", 10),
            first.search_papers("other", 10),
            second.search_papers("other", 10),
        );
        for result in [a, b, c, d] {
            assert_eq!(result.unwrap().len(), 3);
        }

        // Four calls through one limiter: three full intervals at least.
        assert!(start.elapsed() >= Duration::from_millis(450));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ScholarConfig {
            base_url: "not a url".into(),
            ..ScholarConfig::default()
        };
        let limiter = Arc::new(RateLimiter::new(Duration::ZERO));
        let err = ScholarClient::new(&config, &TimeoutConfig::default(), RetryPolicy::default(), limiter)
            .unwrap_err();
        assert!(matches!(err, ScholarError::InvalidUrl { .. }));
    }
}
