//! Report assembly for the analysis endpoint.
//!
//! # Data Flow
//! ```text
//! papers ──┬→ scholar::summarize   → paper_summary
//!          ├→ trend.rs             → trend_analysis
//!          └→ citation.rs          → references
//! analysis ─────────────────────────→ gaps / questions / methods / novelty
//! ```

pub mod citation;
pub mod trend;

use serde::{Deserialize, Serialize};

use crate::llm::Analysis;
use crate::scholar::{summarize, Paper, PaperSummary};

pub use citation::{citation_hint, format_apa_reference, format_references, Reference};
pub use trend::{calculate_trend, TrendAnalysis, TrendDirection};

/// Everything `/analyze` returns for a topic. Cached as a whole.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisReport {
    pub status: String,
    pub topic: String,
    pub paper_summary: PaperSummary,
    pub trend_analysis: TrendAnalysis,
    pub research_gaps: Vec<String>,
    pub research_questions: Vec<String>,
    pub methodology_suggestions: Vec<String>,
    pub novelty_assessment: String,
    pub references: Vec<Reference>,
    /// Set when the analysis fields are placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
    pub from_cache: bool,
}

impl AnalysisReport {
    pub fn build(
        topic: &str,
        papers: &[Paper],
        analysis: Analysis,
        analysis_error: Option<String>,
    ) -> Self {
        Self {
            status: "success".into(),
            topic: topic.to_string(),
            paper_summary: summarize(papers),
            trend_analysis: calculate_trend(papers),
            research_gaps: analysis.research_gaps,
            research_questions: analysis.research_questions,
            methodology_suggestions: analysis.methodology_suggestions,
            novelty_assessment: analysis.novelty_assessment,
            references: format_references(papers),
            analysis_error,
            from_cache: false,
        }
    }

    /// Whether this report is worth caching.
    pub fn is_complete(&self) -> bool {
        self.analysis_error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str, year: i32, citations: u64) -> Paper {
        Paper {
            title: title.into(),
            abstract_text: Some("abstract".into()),
            year: Some(year),
            citation_count: citations,
            authors: Vec::new(),
            doi: None,
            url: None,
            venue: None,
            volume: None,
            pages: None,
        }
    }

    #[test]
    fn test_build_numbers_references_in_order() {
        let papers = vec![paper("first", 2023, 5), paper("second", 2020, 50)];
        let report = AnalysisReport::build("Topic", &papers, Analysis::default(), None);

        assert_eq!(report.status, "success");
        assert_eq!(report.paper_summary.total_papers, 2);
        assert_eq!(report.references[0].number, 1);
        assert_eq!(report.references[1].title, "second");
        assert!(!report.from_cache);
        assert!(report.is_complete());
    }

    #[test]
    fn test_analysis_error_is_only_serialized_when_present() {
        let papers = vec![paper("only", 2022, 1)];
        let ok = serde_json::to_value(AnalysisReport::build("t", &papers, Analysis::default(), None))
            .unwrap();
        assert!(ok.get("analysis_error").is_none());

        let failed = AnalysisReport::build("t", &papers, Analysis::fallback(), Some("boom".into()));
        assert!(!failed.is_complete());
        assert_eq!(serde_json::to_value(&failed).unwrap()["analysis_error"], "boom");
    }
}
