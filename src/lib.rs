//! Quranic root analytics
//!
//! Locates every occurrence of an Arabic root in an in-memory corpus and
//! derives distributions, a revelation timeline, an era split, word-form
//! rankings and a co-occurrence network from the match set.

// Record types and normalization come first; everything else builds on them
pub mod normalize;
pub mod tokens;
pub mod error;
pub mod corpus;
pub mod locator;
pub mod statistics;
pub mod network;
pub mod facets;
pub mod lexicon;
pub mod cache;
pub mod config;
pub mod service;
pub mod state;
pub mod api;

pub use error::RootsError;
pub use config::{AnalyticsConfig, Config};
pub use corpus::{CorpusData, CorpusIndex, CorpusSource, SqliteCorpusSource};
pub use tokens::{AnnotatedVerse, ChapterMeta, Era, OccurrenceSet, RootRef, Token, Verse};
pub use locator::OccurrenceLocator;
pub use statistics::{StatisticsAggregator, StatisticsBlock, TimelineEntry, TimelineOrder};
pub use network::{NetworkBlock, NetworkBuilder, RadiusScale};
pub use facets::{OccurrenceFacet, VersePage};
pub use lexicon::{ChapterProfile, Lexicon, RootLengthListing};
pub use cache::CacheStats;
pub use service::{AnalyticsResult, AnalyticsService};
pub use state::AppState;
