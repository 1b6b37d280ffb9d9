//! Co-occurrence network and relationship matrix

use crate::corpus::CorpusIndex;
use crate::tokens::{AnnotatedVerse, OccurrenceSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TOP_K: usize = 12;

/// Maps a count to a node radius: square root growth, clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusScale {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self { min: 5.0, max: 30.0, step: 2.5 }
    }
}

impl RadiusScale {
    pub fn scale(&self, value: u64) -> f64 {
        (self.min + self.step * (value as f64).sqrt()).min(self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    /// 0 for the queried root, 1 for co-occurring roots
    pub group: u8,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkLink {
    pub source: String,
    pub target: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub x: String,
    pub y: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkBlock {
    pub network: Network,
    pub matrix: Vec<MatrixCell>,
}

/// A co-occurring root with the number of occurrence verses it shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'s> {
    pub key: &'s str,
    pub display: &'s str,
    pub tally: u64,
}

pub struct NetworkBuilder<'a> {
    index: &'a CorpusIndex,
    top_k: usize,
    matrix_includes_query: bool,
    radius: RadiusScale,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self {
            index,
            top_k: DEFAULT_TOP_K,
            matrix_includes_query: false,
            radius: RadiusScale::default(),
        }
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn matrix_includes_query(mut self, include: bool) -> Self {
        self.matrix_includes_query = include;
        self
    }

    pub fn radius(mut self, radius: RadiusScale) -> Self {
        self.radius = radius;
        self
    }

    pub fn build(&self, set: &OccurrenceSet) -> NetworkBlock {
        let total_occurrences: u64 = set.verses.iter().map(AnnotatedVerse::occurrences).sum();
        let candidates = self.rank_candidates(set);

        let mut nodes = Vec::with_capacity(candidates.len() + 1);
        nodes.push(NetworkNode {
            id: set.root.clone(),
            group: 0,
            radius: self.radius.scale(total_occurrences),
        });
        let mut links = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            nodes.push(NetworkNode {
                id: candidate.display.to_string(),
                group: 1,
                radius: self.radius.scale(candidate.tally),
            });
            links.push(NetworkLink {
                source: set.root.clone(),
                target: candidate.display.to_string(),
                value: candidate.tally,
            });
        }

        NetworkBlock {
            network: Network { nodes, links },
            matrix: self.relationship_matrix(set, &candidates),
        }
    }

    /// Tally other roots per occurrence verse and keep the `top_k` most
    /// frequent; ties fall back to display form, then normalized key.
    pub fn rank_candidates<'s>(&self, set: &'s OccurrenceSet) -> Vec<Candidate<'s>> {
        let mut tallies: HashMap<&'s str, Candidate<'s>> = HashMap::new();
        for root in set.verses.iter().flat_map(|v| v.other_roots.iter()) {
            tallies
                .entry(root.key.as_str())
                .or_insert_with(|| Candidate {
                    key: &root.key,
                    display: &root.display,
                    tally: 0,
                })
                .tally += 1;
        }

        let mut ranked: Vec<Candidate<'s>> = tallies.into_values().collect();
        ranked.sort_by(|a, b| {
            b.tally
                .cmp(&a.tally)
                .then_with(|| a.display.cmp(b.display))
                .then_with(|| a.key.cmp(b.key))
        });
        ranked.truncate(self.top_k);
        ranked
    }

    /// Dense, row-major matrix of full-corpus shared-verse counts between the
    /// ranked roots. Each unordered pair is counted once and mirrored.
    fn relationship_matrix(&self, set: &OccurrenceSet, candidates: &[Candidate<'_>]) -> Vec<MatrixCell> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut roots: Vec<(&str, &str)> = Vec::with_capacity(candidates.len() + 1);
        if self.matrix_includes_query {
            roots.push((set.normalized_root.as_str(), set.root.as_str()));
        }
        roots.extend(candidates.iter().map(|c| (c.key, c.display)));

        let n = roots.len();
        let mut values = vec![vec![0u64; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let shared = self.index.shared_verse_count(roots[i].0, roots[j].0);
                values[i][j] = shared;
                values[j][i] = shared;
            }
        }

        let mut cells = Vec::with_capacity(n * n);
        for (i, row) in values.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                assert_eq!(value, values[j][i], "relationship matrix must be symmetric");
                cells.push(MatrixCell {
                    x: roots[i].1.to_string(),
                    y: roots[j].1.to_string(),
                    value,
                });
            }
        }
        cells
    }
}
