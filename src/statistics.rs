//! Aggregate statistics over an occurrence set

use crate::corpus::CorpusIndex;
use crate::tokens::{AnnotatedVerse, Era, OccurrenceSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub chapter_no: u32,
    pub chapter_name: String,
    pub revelation_order: u32,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineOrder {
    /// Mushaf order, by chapter number
    #[default]
    Canonical,
    Revelation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraSplit {
    pub meccan: u64,
    pub medinan: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCount {
    pub form: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseRef {
    pub global_id: u32,
    pub chapter_no: u32,
    pub verse_no: u32,
    pub chapter_name: String,
    pub text: String,
    pub occurrences: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsBlock {
    pub max_frequency: u64,
    /// Verses where the root is densest; empty when no verse holds it twice.
    pub focal_verses: Vec<VerseRef>,
    pub longest_verse: Option<VerseRef>,
    pub shortest_verse: Option<VerseRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsBlock {
    pub total_occurrences: u64,
    pub total_verses: u64,
    pub unique_chapters: u64,
    pub average_occurrences_per_verse: u64,
    pub chapter_distribution: BTreeMap<String, u64>,
    pub section_distribution: BTreeMap<u32, u64>,
    pub page_distribution: BTreeMap<u32, u64>,
    pub timeline: Vec<TimelineEntry>,
    pub era: EraSplit,
    pub forms: Vec<FormCount>,
    pub insights: InsightsBlock,
}

impl StatisticsBlock {
    /// Timeline entries in the requested order. Entries are stored in
    /// canonical order; this only re-sorts references.
    pub fn timeline_in(&self, order: TimelineOrder) -> Vec<&TimelineEntry> {
        let mut entries: Vec<&TimelineEntry> = self.timeline.iter().collect();
        if order == TimelineOrder::Revelation {
            entries.sort_by_key(|e| (e.revelation_order, e.chapter_no));
        }
        entries
    }
}

pub struct StatisticsAggregator<'a> {
    index: &'a CorpusIndex,
}

impl<'a> StatisticsAggregator<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self { index }
    }

    pub fn compute(&self, set: &OccurrenceSet) -> StatisticsBlock {
        let total_occurrences: u64 = set.verses.iter().map(AnnotatedVerse::occurrences).sum();
        let total_verses = set.verses.len() as u64;
        let average_occurrences_per_verse = if total_verses == 0 {
            0
        } else {
            (total_occurrences as f64 / total_verses as f64).round() as u64
        };

        let mut per_chapter: BTreeMap<u32, u64> = BTreeMap::new();
        let mut section_distribution = BTreeMap::new();
        let mut page_distribution = BTreeMap::new();
        let mut era = EraSplit::default();

        for annotated in &set.verses {
            let verse = &annotated.verse;
            let n = annotated.occurrences();
            *per_chapter.entry(verse.chapter_no).or_default() += n;
            *section_distribution.entry(verse.section).or_default() += n;
            *page_distribution.entry(verse.page).or_default() += n;
            match self.index.chapter_of(verse).era {
                Era::Meccan => era.meccan += n,
                Era::Medinan => era.medinan += n,
            }
        }

        let mut chapter_distribution = BTreeMap::new();
        let mut timeline = Vec::with_capacity(per_chapter.len());
        for (&chapter_no, &count) in &per_chapter {
            let meta = self
                .index
                .chapter(chapter_no)
                .unwrap_or_else(|| panic!("chapter {chapter_no} missing from metadata"));
            *chapter_distribution.entry(meta.name.clone()).or_default() += count;
            timeline.push(TimelineEntry {
                chapter_no,
                chapter_name: meta.name.clone(),
                revelation_order: meta.revelation_order,
                count,
            });
        }

        debug_assert_eq!(chapter_distribution.values().sum::<u64>(), total_occurrences);
        debug_assert_eq!(era.meccan + era.medinan, total_occurrences);

        StatisticsBlock {
            total_occurrences,
            total_verses,
            unique_chapters: per_chapter.len() as u64,
            average_occurrences_per_verse,
            chapter_distribution,
            section_distribution,
            page_distribution,
            timeline,
            era,
            forms: rank_forms(set),
            insights: self.insights(set),
        }
    }

    fn insights(&self, set: &OccurrenceSet) -> InsightsBlock {
        let max_frequency = set.verses.iter().map(AnnotatedVerse::occurrences).max().unwrap_or(0);
        let focal_verses = if max_frequency > 1 {
            set.verses
                .iter()
                .filter(|v| v.occurrences() == max_frequency)
                .map(|v| self.verse_ref(v))
                .collect()
        } else {
            Vec::new()
        };

        let mut longest: Option<(&AnnotatedVerse, usize)> = None;
        let mut shortest: Option<(&AnnotatedVerse, usize)> = None;
        for annotated in &set.verses {
            let len = annotated.verse.text.chars().count();
            if longest.map_or(true, |(_, best)| len > best) {
                longest = Some((annotated, len));
            }
            if shortest.map_or(true, |(_, best)| len < best) {
                shortest = Some((annotated, len));
            }
        }

        InsightsBlock {
            max_frequency,
            focal_verses,
            longest_verse: longest.map(|(v, _)| self.verse_ref(v)),
            shortest_verse: shortest.map(|(v, _)| self.verse_ref(v)),
        }
    }

    fn verse_ref(&self, annotated: &AnnotatedVerse) -> VerseRef {
        let verse = &annotated.verse;
        VerseRef {
            global_id: verse.global_id,
            chapter_no: verse.chapter_no,
            verse_no: verse.verse_no,
            chapter_name: self.index.chapter_of(verse).name.clone(),
            text: verse.text.clone(),
            occurrences: annotated.occurrences(),
        }
    }
}

/// Count matched tokens per surface form; most frequent first, ties broken by
/// form so the ranking is identical across runs.
pub fn rank_forms(set: &OccurrenceSet) -> Vec<FormCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for token in set.verses.iter().flat_map(|v| v.matched_tokens.iter()) {
        *counts.entry(token.form()).or_default() += 1;
    }

    let mut forms: Vec<FormCount> = counts
        .into_iter()
        .map(|(form, count)| FormCount { form: form.to_string(), count })
        .collect();
    forms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.form.cmp(&b.form)));
    forms
}
