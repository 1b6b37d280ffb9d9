//! Finding every verse that contains a root

use crate::corpus::CorpusIndex;
use crate::error::RootsError;
use crate::normalize::{is_significant_root, normalize};
use crate::tokens::{AnnotatedVerse, OccurrenceSet, RootRef};
use std::collections::HashSet;

pub struct OccurrenceLocator<'a> {
    index: &'a CorpusIndex,
}

impl<'a> OccurrenceLocator<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self { index }
    }

    /// Collect the verses containing `root_query`, in corpus order.
    ///
    /// A token matches when its normalized root equals the normalized query.
    /// Zero matches is a valid, empty result.
    pub fn locate(&self, root_query: &str) -> Result<OccurrenceSet, RootsError> {
        let key = normalize(root_query);
        if key.is_empty() {
            return Err(RootsError::InvalidArgument(format!(
                "root '{root_query}' is empty after normalization"
            )));
        }

        let verses = self
            .index
            .root_postings(&key)
            .iter()
            .map(|&pos| annotate(self.index, pos, &key))
            .collect();

        Ok(OccurrenceSet {
            root: root_query.to_string(),
            normalized_root: key,
            verses,
        })
    }
}

fn annotate(index: &CorpusIndex, pos: usize, key: &str) -> AnnotatedVerse {
    let verse = index.verse_at(pos);
    let mut matched_tokens = Vec::new();
    let mut other_roots = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for token in &verse.tokens {
        let Some(raw) = token.root.as_deref() else {
            continue;
        };
        let root_key = normalize(raw);
        if root_key == key {
            matched_tokens.push(token.clone());
        } else if is_significant_root(&root_key) && seen.insert(root_key.clone()) {
            other_roots.push(RootRef {
                key: root_key,
                display: raw.trim().to_string(),
            });
        }
    }

    // Postings only list verses containing the key, so this holds by construction.
    assert!(
        !matched_tokens.is_empty(),
        "posting for '{key}' points at verse {} without a matching token",
        verse.global_id
    );

    AnnotatedVerse {
        verse: verse.clone(),
        matched_tokens,
        other_roots,
    }
}
