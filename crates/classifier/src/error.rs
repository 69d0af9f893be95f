//! Games source error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse PGN in {path}: {source}")]
    Pgn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid month {0:?}, expected YYYY-MM")]
    InvalidMonth(String),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}
