//! Prompt construction.

use std::fmt::Write;

use crate::llm::types::Analysis;
use crate::report::citation::citation_hint;
use crate::scholar::Paper;

const MAX_ABSTRACT_CHARS: usize = 500;
const MAX_LISTED_AUTHORS: usize = 3;

const CITATION_RULES: &str = "\
CITATION RULES:
1. Cite papers as (Author, Year), (Author & Author, Year), or (Author et al., Year) for 3+ authors.
2. Never refer to papers by their list position (\"Paper 1\", \"Paper 12\").
3. Every factual claim must be backed by at least one paper from the list.";

pub fn analysis_prompt(topic: &str, papers: &[Paper]) -> String {
    format!(
        r#"You are a research intelligence assistant. Analyze the following academic papers on the topic: "{topic}"

Papers analyzed ({count} papers):
{papers}

Based on these papers, respond with a JSON object of this shape:

{{
  "research_gaps": ["Gap with citation (Author et al., Year)", "..."],
  "research_questions": ["Question grounded in the findings (Author, Year)", "..."],
  "methodology_suggestions": ["Approach based on (Author & Author, Year)", "..."],
  "novelty_assessment": "Short assessment with citations (Author, Year)"
}}

{rules}

Focus on clear gaps, actionable questions, methods proven in the papers above, and
whether recent work is genuinely novel or incremental.

Return ONLY the JSON object, with no surrounding text or markdown."#,
        count = papers.len(),
        papers = paper_list(papers),
        rules = CITATION_RULES,
    )
}

pub fn proposal_prompt(topic: &str, papers: &[Paper], analysis: &Analysis) -> String {
    format!(
        r#"You are a research proposal writer. Using the analysis of academic papers on "{topic}" below, write a complete sample research proposal.

ANALYZED PAPERS ({count} papers):
{papers}

PREVIOUS ANALYSIS:
Research Gaps:
{gaps}

Research Questions:
{questions}

Methodology Suggestions:
{methods}

Respond with a JSON object of this shape:

{{
  "title": "Proposed research title based on the identified gaps",
  "introduction": "2-3 paragraphs: background, problem statement, significance, with citations",
  "literature_review": "3-4 paragraphs on the current state of research and its gaps, citing several papers",
  "research_questions": ["Question 1", "Question 2", "Question 3"],
  "methodology": "2-3 paragraphs: approach, data collection, analysis techniques",
  "expected_outcomes": "1-2 paragraphs on anticipated contributions",
  "timeline": "Brief timeline with phases (e.g. 12-18 months)"
}}

{rules}

Keep the proposal between 800 and 1200 words, academically rigorous and feasible.

Return ONLY the JSON object, with no surrounding text or markdown."#,
        count = papers.len(),
        papers = paper_list(papers),
        gaps = bullets(&analysis.research_gaps),
        questions = bullets(&analysis.research_questions),
        methods = bullets(&analysis.methodology_suggestions),
        rules = CITATION_RULES,
    )
}

fn paper_list(papers: &[Paper]) -> String {
    let mut out = String::new();
    for (i, paper) in papers.iter().enumerate() {
        let _ = write!(out, "\n--- Paper [{n}] ---{entry}", n = i + 1, entry = format_paper(paper, i + 1));
    }
    out
}

/// One paper as it appears in a prompt.
pub fn format_paper(paper: &Paper, number: usize) -> String {
    let year = paper
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Unknown".into());
    let abstract_text = paper
        .abstract_text
        .as_deref()
        .map(truncate_abstract)
        .unwrap_or_else(|| "No abstract available".into());

    format!(
        "\n[{number}] Title: {title}\nAuthors: {authors}\nCitation format: {hint}\nYear: {year}\nCitations: {citations}\nAbstract: {abstract_text}\n",
        title = paper.title,
        authors = author_line(paper),
        hint = citation_hint(paper),
        citations = paper.citation_count,
    )
}

fn author_line(paper: &Paper) -> String {
    if paper.authors.is_empty() {
        return "Unknown authors".into();
    }

    let mut names: Vec<String> = paper
        .authors
        .iter()
        .take(MAX_LISTED_AUTHORS)
        .map(|a| a.display_name().to_string())
        .collect();
    if paper.authors.len() > MAX_LISTED_AUTHORS {
        names.push(format!("et al. ({} total)", paper.authors.len()));
    }
    names.join(", ")
}

fn truncate_abstract(text: &str) -> String {
    if text.chars().count() <= MAX_ABSTRACT_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_ABSTRACT_CHARS - 3).collect();
    out.push_str("...");
    out
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
