//! Game loading for the classification tools: configuration, games sources,
//! the month cache and PGN file reading.

pub mod cache;
pub mod config;
pub mod error;
pub mod pgn_files;
pub mod source;

use chess_core::GameRecord;

pub use cache::MonthCache;
pub use config::ClassifierConfig;
pub use error::SourceError;
pub use pgn_files::{load_pgn_dir, load_pgn_file, read_games};
pub use source::{ArchivedGame, DirectorySource, GameSource, MonthKey};

/// Every archived game of `user`, oldest month first, read through `cache`.
pub fn load_user_games<S: GameSource + ?Sized>(
    source: &S,
    cache: &mut MonthCache,
    user: &str,
) -> Result<Vec<GameRecord>, SourceError> {
    let months = source.archive_months(user)?;
    tracing::info!("Loading {} archive months for {}", months.len(), user);
    cache.games_for_months(source, user, &months)
}
