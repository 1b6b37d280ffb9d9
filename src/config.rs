use std::{env, net::SocketAddr, path::PathBuf};

use crate::network::{RadiusScale, DEFAULT_TOP_K};

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Engine settings handed to [`crate::service::AnalyticsService`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub cache_capacity: usize,
    pub top_k: usize,
    pub matrix_includes_query: bool,
    pub radius: RadiusScale,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            top_k: DEFAULT_TOP_K,
            matrix_includes_query: false,
            radius: RadiusScale::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub analytics: AnalyticsConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("QURAN_ROOTS_BIND_ADDR")
            .map(|raw| raw.trim().trim_matches('"').trim_matches('\'').to_string())
            .and_then(|v| v.parse::<SocketAddr>().ok())
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

        let db_path = PathBuf::from(
            lookup("QURAN_ROOTS_DB_PATH").unwrap_or_else(|| "data/quran_roots.sqlite".to_string()),
        );

        let cache_capacity = lookup("QURAN_ROOTS_CACHE_CAPACITY")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_CACHE_CAPACITY)
            .max(1);

        let top_k = lookup("QURAN_ROOTS_TOP_K")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_K);

        let matrix_includes_query = lookup("QURAN_ROOTS_MATRIX_INCLUDE_QUERY")
            .map(|v| {
                matches!(
                    v.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(false);

        Self {
            bind_addr,
            db_path,
            analytics: AnalyticsConfig {
                cache_capacity,
                top_k,
                matrix_includes_query,
                radius: RadiusScale::default(),
            },
        }
    }
}
