//! Opening book error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid opening dataset {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid dataset pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("no dataset files found in {0}")]
    NoFiles(PathBuf),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}
