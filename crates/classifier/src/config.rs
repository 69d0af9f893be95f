//! Classifier configuration from environment variables

use std::env;
use std::path::PathBuf;

use opening_book::DEFAULT_MAX_PLIES;

pub const DEFAULT_BOOK_DIR: &str = "data/openings";

#[derive(Clone, Debug)]
pub struct ClassifierConfig {
    /// Directory of reference opening JSON files
    pub book_dir: PathBuf,

    /// Prebuilt index snapshot, preferred over the dataset when readable
    pub snapshot_path: Option<PathBuf>,

    /// Root of the monthly game archives (`<root>/<user>/<YYYY>/<MM>.json`)
    pub archive_dir: Option<PathBuf>,

    /// Plies of each game used for opening matching
    pub max_plies: usize,

    /// Player whose games are classified
    pub username: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            book_dir: PathBuf::from(DEFAULT_BOOK_DIR),
            snapshot_path: None,
            archive_dir: None,
            max_plies: DEFAULT_MAX_PLIES,
            username: None,
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            book_dir: var("OPENING_BOOK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BOOK_DIR)),
            snapshot_path: var("OPENING_INDEX_SNAPSHOT").map(PathBuf::from),
            archive_dir: var("ARCHIVE_DIR").map(PathBuf::from),
            max_plies: var("RESOLVE_MAX_PLIES")
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(DEFAULT_MAX_PLIES),
            username: var("CHESS_USERNAME"),
        }
    }
}
