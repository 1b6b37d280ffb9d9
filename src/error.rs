//! Error types for quran-roots

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RootsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Corpus unavailable: {0}")]
    CorpusUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl serde::Serialize for RootsError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
