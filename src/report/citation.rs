//! APA 7 references and in-text citation hints.

use serde::{Deserialize, Serialize};

use crate::scholar::{Author, Paper};

/// APA 7 lists at most this many authors before eliding.
const APA_MAX_AUTHORS: usize = 20;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Reference {
    pub number: usize,
    pub reference: String,
    pub url: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub title: String,
    pub year: Option<i32>,
    pub first_author: String,
}

/// `Last, F. M.`; single-word names are kept as they are.
fn apa_name(author: &Author) -> String {
    let parts: Vec<&str> = author.display_name().split_whitespace().collect();
    match parts.split_last() {
        Some((last, given)) if !given.is_empty() => {
            let initials: Vec<String> = given
                .iter()
                .filter_map(|part| part.chars().next())
                .map(|c| format!("{c}."))
                .collect();
            format!("{last}, {}", initials.join(" "))
        }
        _ => author.display_name().to_string(),
    }
}

fn apa_authors(authors: &[Author]) -> String {
    let names: Vec<String> = authors.iter().map(apa_name).collect();
    match names.as_slice() {
        [] => "Unknown".into(),
        [only] => only.clone(),
        [first, second] => format!("{first} & {second}"),
        [.., last] if names.len() > APA_MAX_AUTHORS => {
            format!("{}, ... {last}", names[..APA_MAX_AUTHORS - 1].join(", "))
        }
        [init @ .., last] => format!("{}, & {last}", init.join(", ")),
    }
}

/// Format `paper` as reference number `number`.
pub fn format_apa_reference(paper: &Paper, number: usize) -> Reference {
    let year = paper
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "n.d.".into());

    let mut reference = format!("{} ({year}). {}.", apa_authors(&paper.authors), paper.title);

    if let Some(venue) = &paper.venue {
        reference.push(' ');
        reference.push_str(venue);
        if let Some(volume) = &paper.volume {
            reference.push_str(", ");
            reference.push_str(volume);
        }
        if let Some(pages) = &paper.pages {
            reference.push_str(", ");
            reference.push_str(pages);
        }
        reference.push('.');
    }

    let url = paper.url.clone().unwrap_or_default();
    if !url.is_empty() {
        reference.push(' ');
        reference.push_str(&url);
    }

    Reference {
        number,
        reference,
        url,
        abstract_text: paper
            .abstract_text
            .clone()
            .unwrap_or_else(|| "Abstract not available".into()),
        title: paper.title.clone(),
        year: paper.year,
        first_author: paper
            .authors
            .first()
            .map(|a| a.last_name().to_string())
            .unwrap_or_else(|| "Unknown".into()),
    }
}

/// Number every paper, starting at 1.
pub fn format_references(papers: &[Paper]) -> Vec<Reference> {
    papers
        .iter()
        .enumerate()
        .map(|(i, paper)| format_apa_reference(paper, i + 1))
        .collect()
}

/// In-text citation such as `(Smith et al., 2021)`.
pub fn citation_hint(paper: &Paper) -> String {
    let year = paper
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "Unknown".into());

    match paper.authors.as_slice() {
        [] => format!("(Unknown, {year})"),
        [only] => format!("({}, {year})", only.last_name()),
        [first, second] => format!("({} & {}, {year})", first.last_name(), second.last_name()),
        [first, ..] => format!("({} et al., {year})", first.last_name()),
    }
}
