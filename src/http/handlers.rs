//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::llm::{Analysis, Proposal};
use crate::report::AnalysisReport;
use crate::scholar::Paper;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct ProposalRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub research_gaps: Vec<String>,
    #[serde(default)]
    pub research_questions: Vec<String>,
    #[serde(default)]
    pub methodology_suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProposalResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub proposal: Proposal,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache_size: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CacheSweepResponse {
    pub status: &'static str,
    pub removed: usize,
}

/// `POST /analyze`
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let Json(request) = payload?;
    let topic = validate_topic(&state, &request.topic)?;
    tracing::info!(topic = %topic, "Analysis requested");

    if let Some(mut cached) = state.reports.get(topic) {
        tracing::info!(topic = %topic, "Returning cached report");
        cached.from_cache = true;
        return Ok(Json(cached));
    }

    let papers = state
        .scholar
        .fetch_and_process_papers(topic)
        .await
        .map_err(|e| {
            tracing::error!(topic = %topic, error = %e, "Paper search failed");
            ApiError::Upstream(format!("Failed to fetch papers: {e}"))
        })?;

    if papers.is_empty() {
        return Err(ApiError::NotFound {
            message: format!("No papers found for topic: {topic}"),
            suggestion: "Try a broader or different search term".into(),
        });
    }

    state.papers.set(topic, papers.clone());

    let (analysis, analysis_error) = match state.analyzer.analyze_papers(topic, &papers).await {
        Ok(analysis) => (analysis, None),
        Err(e) => {
            tracing::error!(topic = %topic, error = %e, "Analysis failed, returning placeholders");
            (Analysis::fallback(), Some(e.to_string()))
        }
    };

    let report = AnalysisReport::build(topic, &papers, analysis, analysis_error);
    if report.is_complete() {
        state.reports.set(topic, report.clone());
        tracing::info!(topic = %topic, "Report cached");
    }

    Ok(Json(report))
}

/// `POST /generate-proposal`
pub async fn generate_proposal(
    State(state): State<AppState>,
    payload: Result<Json<ProposalRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::BadRequest("Topic is required".into()));
    }
    tracing::info!(topic = %topic, "Proposal requested");

    let papers = papers_for(&state, topic).await;
    let analysis = Analysis {
        research_gaps: request.research_gaps,
        research_questions: request.research_questions,
        methodology_suggestions: request.methodology_suggestions,
        novelty_assessment: String::new(),
    };

    let response = match state.analyzer.generate_proposal(topic, &papers, &analysis).await {
        Ok(proposal) => (
            StatusCode::OK,
            Json(ProposalResponse {
                status: "success",
                error: None,
                proposal,
            }),
        ),
        Err(e) => {
            tracing::error!(topic = %topic, error = %e, "Proposal generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProposalResponse {
                    status: "error",
                    error: Some(e.to_string()),
                    proposal: Proposal::fallback(),
                }),
            )
        }
    };

    Ok(response.into_response())
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        cache_size: state.reports.size(),
    })
}

/// `POST /cache/clear`
pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    state.reports.clear();
    state.papers.clear();
    tracing::info!("Caches cleared");

    Json(CacheClearResponse {
        status: "success",
        message: "Cache cleared",
    })
}

/// `POST /cache/sweep`
pub async fn sweep_cache(State(state): State<AppState>) -> Json<CacheSweepResponse> {
    let removed = state.reports.sweep() + state.papers.sweep();
    tracing::info!(removed, "Caches swept");

    Json(CacheSweepResponse {
        status: "success",
        removed,
    })
}

fn validate_topic<'a>(state: &AppState, raw: &'a str) -> Result<&'a str, ApiError> {
    let topic = raw.trim();
    let len = topic.chars().count();

    if topic.is_empty() {
        return Err(ApiError::BadRequest("Topic is required".into()));
    }
    if len < state.api.min_topic_len {
        return Err(ApiError::BadRequest(format!(
            "Topic must be at least {} characters",
            state.api.min_topic_len
        )));
    }
    if len > state.api.max_topic_len {
        return Err(ApiError::BadRequest(format!(
            "Topic must be at most {} characters",
            state.api.max_topic_len
        )));
    }
    Ok(topic)
}

/// Papers stored by an earlier analysis, or a fresh search. A failed
/// search yields no papers and lets proposal generation report it.
async fn papers_for(state: &AppState, topic: &str) -> Vec<Paper> {
    if let Some(papers) = state.papers.get(topic) {
        return papers;
    }

    match state.scholar.fetch_and_process_papers(topic).await {
        Ok(papers) => {
            if !papers.is_empty() {
                state.papers.set(topic, papers.clone());
            }
            papers
        }
        Err(e) => {
            tracing::warn!(topic = %topic, error = %e, "Paper search for proposal failed");
            Vec::new()
        }
    }
}
