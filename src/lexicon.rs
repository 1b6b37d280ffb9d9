//! Corpus-wide root listings and per-chapter root profiles

use crate::corpus::CorpusIndex;
use crate::error::RootsError;
use crate::normalize::{is_significant_root, normalize, root_len};
use crate::tokens::Era;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootCount {
    pub root: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthSummary {
    pub total_occurrences: u64,
    pub total_roots: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RootLengthListing {
    pub roots: Vec<RootCount>,
    pub summary: LengthSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootFrequency {
    pub root: String,
    pub frequency: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProfile {
    pub chapter_no: u32,
    pub name: String,
    pub era: Era,
    pub revelation_order: u32,
    pub verse_count: usize,
    pub top_roots: Vec<RootFrequency>,
    /// Roots found in this chapter and nowhere else
    pub unique_roots: Vec<String>,
}

struct RootInfo {
    display: String,
    count: u64,
    chapters: HashSet<u32>,
}

pub struct Lexicon {
    index: Arc<CorpusIndex>,
    top_k: usize,
    roots: HashMap<String, RootInfo>,
    by_length: BTreeMap<usize, RootLengthListing>,
    /// chapter -> normalized root -> token count
    chapter_roots: HashMap<u32, HashMap<String, u64>>,
}

impl Lexicon {
    pub fn new(index: Arc<CorpusIndex>, top_k: usize) -> Self {
        let mut roots: HashMap<String, RootInfo> = HashMap::new();
        let mut chapter_roots: HashMap<u32, HashMap<String, u64>> = HashMap::new();

        for verse in index.verses() {
            for raw in verse.tokens.iter().filter_map(|t| t.root.as_deref()) {
                let key = normalize(raw);
                if key.is_empty() {
                    continue;
                }
                let info = roots.entry(key.clone()).or_insert_with(|| RootInfo {
                    display: raw.trim().to_string(),
                    count: 0,
                    chapters: HashSet::new(),
                });
                info.count += 1;
                info.chapters.insert(verse.chapter_no);
                *chapter_roots
                    .entry(verse.chapter_no)
                    .or_default()
                    .entry(key)
                    .or_default() += 1;
            }
        }

        let mut by_length: BTreeMap<usize, RootLengthListing> = BTreeMap::new();
        for (key, info) in &roots {
            let listing = by_length.entry(root_len(key)).or_default();
            listing.roots.push(RootCount { root: info.display.clone(), count: info.count });
            listing.summary.total_occurrences += info.count;
            listing.summary.total_roots += 1;
        }
        for listing in by_length.values_mut() {
            listing
                .roots
                .sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.root.cmp(&b.root)));
        }

        tracing::debug!(roots = roots.len(), lengths = by_length.len(), "lexicon built");

        Self { index, top_k, roots, by_length, chapter_roots }
    }

    /// Every root whose normalized length is `len`, most frequent first.
    pub fn roots_by_length(&self, len: usize) -> Result<RootLengthListing, RootsError> {
        if len == 0 {
            return Err(RootsError::InvalidArgument("root length must be positive".to_string()));
        }
        Ok(self.by_length.get(&len).cloned().unwrap_or_default())
    }

    pub fn chapter_profile(&self, chapter_no: u32) -> Result<ChapterProfile, RootsError> {
        let meta = self
            .index
            .chapter(chapter_no)
            .ok_or_else(|| RootsError::NotFound(format!("chapter {chapter_no}")))?;

        let empty = HashMap::new();
        let counts = self.chapter_roots.get(&chapter_no).unwrap_or(&empty);

        let mut top_roots: Vec<RootFrequency> = counts
            .iter()
            .filter(|(key, _)| is_significant_root(key))
            .map(|(key, &frequency)| RootFrequency { root: self.display(key), frequency })
            .collect();
        top_roots.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.root.cmp(&b.root)));
        top_roots.truncate(self.top_k);

        let mut unique_roots: Vec<String> = counts
            .keys()
            .filter(|key| is_significant_root(key))
            .filter(|key| self.roots.get(*key).is_some_and(|info| info.chapters.len() == 1))
            .map(|key| self.display(key))
            .collect();
        unique_roots.sort();

        Ok(ChapterProfile {
            chapter_no,
            name: meta.name.clone(),
            era: meta.era,
            revelation_order: meta.revelation_order,
            verse_count: self.index.verses_in_chapter(chapter_no).len(),
            top_roots,
            unique_roots,
        })
    }

    fn display(&self, key: &str) -> String {
        self.roots
            .get(key)
            .map_or_else(|| key.to_string(), |info| info.display.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::fixtures::*;
    use crate::corpus::CorpusData;

    fn lexicon() -> Lexicon {
        let index = CorpusIndex::build(CorpusData {
            verses: vec![
                verse(1, 1, vec![token("رحمة", Some("رحم")), token("علم", Some("علم")), token("من", Some("من"))]),
                verse(2, 1, vec![token("رحيم", Some("رحم")), token("حمد", Some("حمد"))]),
                verse(3, 2, vec![token("علم", Some("عَلِمَ")), token("زلزل", Some("زلزل")), token("رحمن", Some("رحم"))]),
            ],
            chapters: vec![
                chapter(1, "الفاتحة", Era::Meccan, 5),
                chapter(2, "البقرة", Era::Medinan, 87),
            ],
        })
        .unwrap();
        Lexicon::new(Arc::new(index), 12)
    }

    #[test]
    fn lists_roots_of_a_given_length() {
        let lexicon = lexicon();
        let three = lexicon.roots_by_length(3).unwrap();
        let roots: Vec<(&str, u64)> = three.roots.iter().map(|r| (r.root.as_str(), r.count)).collect();
        assert_eq!(roots, vec![("رحم", 3), ("علم", 2), ("حمد", 1)]);
        assert_eq!(three.summary, LengthSummary { total_occurrences: 6, total_roots: 3 });

        let four = lexicon.roots_by_length(4).unwrap();
        assert_eq!(four.roots[0].root, "زلزل");
        assert!(lexicon.roots_by_length(7).unwrap().roots.is_empty());
        assert!(matches!(lexicon.roots_by_length(0), Err(RootsError::InvalidArgument(_))));
    }

    #[test]
    fn chapter_profile_ranks_and_finds_unique_roots() {
        let lexicon = lexicon();
        let profile = lexicon.chapter_profile(1).unwrap();
        assert_eq!(profile.name, "الفاتحة");
        assert_eq!(profile.verse_count, 2);
        let top: Vec<&str> = profile.top_roots.iter().map(|r| r.root.as_str()).collect();
        // "من" is below the minimum root length
        assert_eq!(top, vec!["رحم", "حمد", "علم"]);
        assert_eq!(profile.unique_roots, vec!["حمد".to_string()]);

        let second = lexicon.chapter_profile(2).unwrap();
        assert_eq!(second.unique_roots, vec!["زلزل".to_string()]);
    }

    #[test]
    fn unknown_chapter_is_not_found() {
        assert!(matches!(lexicon().chapter_profile(115), Err(RootsError::NotFound(_))));
    }
}
