//! Drill-down filters over an occurrence set

use crate::corpus::CorpusIndex;
use crate::error::RootsError;
use crate::normalize::normalize;
use crate::tokens::{AnnotatedVerse, Era, OccurrenceSet};
use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccurrenceFacet {
    All,
    /// Chapter by name, or by number when the value is numeric
    Chapter(String),
    Era(Era),
    Section(u32),
    Page(u32),
    Form(String),
    CoRoot(String),
}

impl OccurrenceFacet {
    /// Build a facet from a `(kind, value)` pair such as `("era", "meccan")`.
    pub fn parse(kind: Option<&str>, value: Option<&str>) -> Result<Self, RootsError> {
        let kind = kind.map(str::trim).unwrap_or("all");
        if kind.is_empty() || kind.eq_ignore_ascii_case("all") {
            return Ok(OccurrenceFacet::All);
        }

        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RootsError::InvalidArgument(format!("facet '{kind}' needs a value")))?;
        let number = |what: &str| {
            value
                .parse::<u32>()
                .map_err(|_| RootsError::InvalidArgument(format!("invalid {what} '{value}'")))
        };

        match kind.to_ascii_lowercase().as_str() {
            "chapter" | "surah" => Ok(OccurrenceFacet::Chapter(value.to_string())),
            "era" => value.parse().map(OccurrenceFacet::Era).map_err(RootsError::InvalidArgument),
            "section" | "juz" => number("section").map(OccurrenceFacet::Section),
            "page" => number("page").map(OccurrenceFacet::Page),
            "form" => Ok(OccurrenceFacet::Form(value.to_string())),
            "coroot" | "compare" => Ok(OccurrenceFacet::CoRoot(value.to_string())),
            other => Err(RootsError::InvalidArgument(format!("unknown facet '{other}'"))),
        }
    }

    pub fn matches(&self, index: &CorpusIndex, annotated: &AnnotatedVerse) -> bool {
        let verse = &annotated.verse;
        match self {
            OccurrenceFacet::All => true,
            OccurrenceFacet::Chapter(chapter) => match chapter.parse::<u32>() {
                Ok(no) => verse.chapter_no == no,
                Err(_) => normalize(&index.chapter_of(verse).name) == normalize(chapter),
            },
            OccurrenceFacet::Era(era) => index.chapter_of(verse).era == *era,
            OccurrenceFacet::Section(section) => verse.section == *section,
            OccurrenceFacet::Page(page) => verse.page == *page,
            OccurrenceFacet::Form(form) => {
                let wanted = normalize(form);
                annotated.matched_tokens.iter().any(|t| normalize(t.form()) == wanted)
            }
            OccurrenceFacet::CoRoot(root) => {
                let wanted = normalize(root);
                annotated.other_roots.iter().any(|r| r.key == wanted)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersePage {
    pub total: usize,
    pub verses: Vec<AnnotatedVerse>,
}

/// Filter an occurrence set and return one page of it, in corpus order.
pub fn filter_occurrences(
    index: &CorpusIndex,
    set: &OccurrenceSet,
    facet: &OccurrenceFacet,
    limit: Option<usize>,
    offset: Option<usize>,
) -> VersePage {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = offset.unwrap_or(0);

    let matching: Vec<&AnnotatedVerse> = set
        .verses
        .iter()
        .filter(|v| facet.matches(index, v))
        .collect();

    VersePage {
        total: matching.len(),
        verses: matching.into_iter().skip(offset).take(limit).cloned().collect(),
    }
}
