//! Root analytics service: the single entry point used by presentation layers

use crate::cache::{CacheStats, SingleFlightCache};
use crate::config::AnalyticsConfig;
use crate::corpus::CorpusIndex;
use crate::error::RootsError;
use crate::facets::{filter_occurrences, OccurrenceFacet, VersePage};
use crate::locator::OccurrenceLocator;
use crate::network::{MatrixCell, Network, NetworkBlock, NetworkBuilder};
use crate::normalize::normalize;
use crate::statistics::{StatisticsAggregator, StatisticsBlock};
use crate::tokens::OccurrenceSet;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinError;

/// Full analytical profile of one root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub root: String,
    #[serde(flatten)]
    pub statistics: StatisticsBlock,
    pub network: Network,
    pub matrix: Vec<MatrixCell>,
}

impl AnalyticsResult {
    /// Same result presented under a different spelling of the same root.
    fn relabeled(&self, root: &str) -> Self {
        let previous = self.root.as_str();
        let mut result = self.clone();
        result.root = root.to_string();
        if let Some(center) = result.network.nodes.first_mut() {
            center.id = root.to_string();
        }
        for link in &mut result.network.links {
            link.source = root.to_string();
        }
        for cell in &mut result.matrix {
            if cell.x == previous {
                cell.x = root.to_string();
            }
            if cell.y == previous {
                cell.y = root.to_string();
            }
        }
        result
    }
}

struct RootEntry {
    occurrences: Arc<OccurrenceSet>,
    analytics: Arc<AnalyticsResult>,
}

pub struct AnalyticsService {
    index: Arc<CorpusIndex>,
    config: AnalyticsConfig,
    cache: SingleFlightCache<RootEntry>,
}

impl AnalyticsService {
    pub fn new(index: Arc<CorpusIndex>, config: AnalyticsConfig) -> Self {
        let cache = SingleFlightCache::new(config.cache_capacity);
        Self { index, config, cache }
    }

    pub fn index(&self) -> &Arc<CorpusIndex> {
        &self.index
    }

    pub async fn get_root_analytics(&self, root: &str) -> Result<Arc<AnalyticsResult>, RootsError> {
        let (_keep_open, cancel) = watch::channel(false);
        self.get_root_analytics_cancellable(root, cancel).await
    }

    /// Like [`Self::get_root_analytics`], but gives up between phases once
    /// `cancel` reads `true`. A cancelled computation leaves the cache untouched.
    pub async fn get_root_analytics_cancellable(
        &self,
        root: &str,
        cancel: watch::Receiver<bool>,
    ) -> Result<Arc<AnalyticsResult>, RootsError> {
        let entry = self.entry(root, &cancel).await?;
        if entry.analytics.root == root {
            Ok(Arc::clone(&entry.analytics))
        } else {
            Ok(Arc::new(entry.analytics.relabeled(root)))
        }
    }

    /// Occurrence verses of a root narrowed by a facet, one page at a time.
    pub async fn get_root_verses(
        &self,
        root: &str,
        facet: &OccurrenceFacet,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<VersePage, RootsError> {
        let (_keep_open, cancel) = watch::channel(false);
        let entry = self.entry(root, &cancel).await?;
        Ok(filter_occurrences(&self.index, &entry.occurrences, facet, limit, offset))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn entry(&self, root: &str, cancel: &watch::Receiver<bool>) -> Result<Arc<RootEntry>, RootsError> {
        let key = normalize(root);
        if key.is_empty() {
            return Err(RootsError::InvalidArgument(format!(
                "root '{root}' is empty after normalization"
            )));
        }
        self.cache
            .get_or_try_compute(&key, || self.compute(root, cancel))
            .await
    }

    async fn compute(&self, root: &str, cancel: &watch::Receiver<bool>) -> Result<RootEntry, RootsError> {
        let started = Instant::now();
        ensure_active(root, cancel)?;

        let occurrences = Arc::new(OccurrenceLocator::new(&self.index).locate(root)?);
        ensure_active(root, cancel)?;

        let statistics = {
            let index = Arc::clone(&self.index);
            let set = Arc::clone(&occurrences);
            tokio::task::spawn_blocking(move || StatisticsAggregator::new(&index).compute(&set))
        };
        let network = {
            let index = Arc::clone(&self.index);
            let set = Arc::clone(&occurrences);
            let config = self.config.clone();
            tokio::task::spawn_blocking(move || {
                NetworkBuilder::new(&index)
                    .top_k(config.top_k)
                    .matrix_includes_query(config.matrix_includes_query)
                    .radius(config.radius)
                    .build(&set)
            })
        };
        let (statistics, network) = tokio::join!(statistics, network);
        let statistics = joined(statistics)?;
        let NetworkBlock { network, matrix } = joined(network)?;
        ensure_active(root, cancel)?;

        tracing::info!(
            root,
            normalized = %occurrences.normalized_root,
            verses = statistics.total_verses,
            occurrences = statistics.total_occurrences,
            neighbours = network.nodes.len() - 1,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "root analytics computed"
        );

        let analytics = AnalyticsResult {
            root: root.to_string(),
            statistics,
            network,
            matrix,
        };
        Ok(RootEntry {
            occurrences,
            analytics: Arc::new(analytics),
        })
    }
}

fn ensure_active(root: &str, cancel: &watch::Receiver<bool>) -> Result<(), RootsError> {
    if *cancel.borrow() {
        tracing::warn!(root, "root analytics cancelled");
        return Err(RootsError::Cancelled);
    }
    Ok(())
}

/// Surface a worker panic on the calling task instead of swallowing it.
fn joined<T>(result: Result<T, JoinError>) -> Result<T, RootsError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(_) => Err(RootsError::Cancelled),
    }
}
