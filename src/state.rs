//! Application state management

use crate::config::{AnalyticsConfig, Config};
use crate::corpus::{CorpusIndex, CorpusSource, SqliteCorpusSource};
use crate::error::RootsError;
use crate::lexicon::Lexicon;
use crate::service::AnalyticsService;
use std::sync::Arc;
use std::time::Instant;

/// Everything a request handler needs, built once before serving.
pub struct AppState {
    pub service: AnalyticsService,
    pub lexicon: Lexicon,
}

impl AppState {
    /// Load the corpus named by `config` and wire up the engine.
    pub fn new(config: &Config) -> Result<Self, RootsError> {
        Self::from_source(&SqliteCorpusSource::new(&config.db_path), config.analytics.clone())
    }

    pub fn from_source(source: &dyn CorpusSource, analytics: AnalyticsConfig) -> Result<Self, RootsError> {
        let started = Instant::now();
        let index = Arc::new(CorpusIndex::load(source)?);
        tracing::info!(
            source = %source.describe(),
            verses = index.verse_count(),
            chapters = index.chapter_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "corpus loaded"
        );
        Ok(Self::from_index(index, analytics))
    }

    pub fn from_index(index: Arc<CorpusIndex>, analytics: AnalyticsConfig) -> Self {
        let lexicon = Lexicon::new(Arc::clone(&index), analytics.top_k);
        let service = AnalyticsService::new(index, analytics);
        Self { service, lexicon }
    }

    pub fn index(&self) -> &CorpusIndex {
        self.service.index()
    }
}
