//! Filtering, ordering and summarizing search results.

use crate::scholar::types::{Paper, PaperSummary, RawPaper, YearRange};

/// Drop untitled papers, normalize the rest, and order them newest first,
/// breaking ties by citation count.
pub fn process_papers(raw: Vec<RawPaper>) -> Vec<Paper> {
    let mut papers: Vec<Paper> = raw.into_iter().filter_map(normalize).collect();
    papers.sort_by_key(|p| std::cmp::Reverse(sort_score(p)));
    papers
}

fn normalize(raw: RawPaper) -> Option<Paper> {
    let title = non_empty(raw.title)?;

    let doi = non_empty(raw.external_ids.and_then(|ids| ids.doi));
    let url = match &doi {
        Some(doi) => Some(format!("https://doi.org/{}", doi)),
        None => non_empty(raw.url),
    };

    let journal = raw.journal.unwrap_or_default();
    let venue = non_empty(raw.venue).or_else(|| non_empty(journal.name));

    Some(Paper {
        title,
        abstract_text: non_empty(raw.abstract_text),
        year: raw.year,
        citation_count: raw.citation_count.unwrap_or(0),
        authors: raw.authors.unwrap_or_default(),
        doi,
        url,
        venue,
        volume: non_empty(journal.volume),
        pages: non_empty(journal.pages),
    })
}

/// Year dominates; citations (capped below 10k) only break ties.
fn sort_score(paper: &Paper) -> i64 {
    let year = i64::from(paper.year.unwrap_or(0));
    let citations = paper.citation_count.min(9_999) as i64;
    year * 10_000 + citations
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn summarize(papers: &[Paper]) -> PaperSummary {
    let years = papers.iter().filter_map(|p| p.year);
    let year_range = years.clone().min().zip(years.max()).map(|(min, max)| YearRange { min, max });

    let total_citations: u64 = papers.iter().map(|p| p.citation_count).sum();
    let avg_citations = if papers.is_empty() {
        0.0
    } else {
        round_tenth(total_citations as f64 / papers.len() as f64)
    };

    PaperSummary {
        total_papers: papers.len(),
        year_range,
        total_citations,
        avg_citations,
    }
}

/// Round to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
