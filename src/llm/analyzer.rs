//! Research analysis and proposal generation.
//!
//! Generation and parsing run inside one retried operation: a reply that
//! cannot be parsed is as good as no reply, and the policy decides whether
//! `ResponseMalformed` earns another attempt.

use crate::config::LlmConfig;
use crate::llm::client::LlmClient;
use crate::llm::parse::{parse_analysis, parse_proposal};
use crate::llm::prompt::{analysis_prompt, proposal_prompt};
use crate::llm::types::{Analysis, LlmError, LlmResult, Proposal};
use crate::resilience::{self, RetryPolicy};
use crate::scholar::Paper;

#[derive(Debug)]
pub struct Analyzer {
    client: LlmClient,
    policy: RetryPolicy,
    analysis_max_tokens: u32,
    proposal_max_tokens: u32,
}

impl Analyzer {
    pub fn new(client: LlmClient, policy: RetryPolicy, config: &LlmConfig) -> Self {
        Self {
            client,
            policy,
            analysis_max_tokens: config.analysis_max_tokens,
            proposal_max_tokens: config.proposal_max_tokens,
        }
    }

    pub async fn analyze_papers(&self, topic: &str, papers: &[Paper]) -> LlmResult<Analysis> {
        if papers.is_empty() {
            return Err(LlmError::MissingInput("No papers provided for analysis".into()));
        }

        let prompt = analysis_prompt(topic, papers);
        tracing::info!(topic = %topic, papers = papers.len(), "Requesting analysis");

        let client = &self.client;
        let prompt = prompt.as_str();
        let max_tokens = self.analysis_max_tokens;
        let analysis = resilience::run(
            move || async move {
                let text = client.generate(prompt, max_tokens).await?;
                parse_analysis(&text)
            },
            &self.policy,
        )
        .await?;

        tracing::info!(
            topic = %topic,
            gaps = analysis.research_gaps.len(),
            questions = analysis.research_questions.len(),
            "Analysis complete"
        );
        Ok(analysis)
    }

    pub async fn generate_proposal(
        &self,
        topic: &str,
        papers: &[Paper],
        analysis: &Analysis,
    ) -> LlmResult<Proposal> {
        if papers.is_empty() {
            return Err(LlmError::MissingInput(
                "Papers and analysis required for proposal generation".into(),
            ));
        }

        let prompt = proposal_prompt(topic, papers, analysis);
        tracing::info!(topic = %topic, papers = papers.len(), "Requesting proposal");

        let client = &self.client;
        let prompt = prompt.as_str();
        let max_tokens = self.proposal_max_tokens;
        resilience::run(
            move || async move {
                let text = client.generate(prompt, max_tokens).await?;
                parse_proposal(&text)
            },
            &self.policy,
        )
        .await
    }
}
