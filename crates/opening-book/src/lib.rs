//! Opening book index and opening classification.
//!
//! The [`OpeningIndex`] is built once from a reference dataset (or loaded from
//! a snapshot) and shared read-only; an [`OpeningResolver`] borrows it to name
//! the opening of each game.

pub mod catalog;
pub mod classify;
pub mod dataset;
pub mod error;
pub mod index;
pub mod names;
pub mod resolver;
pub mod snapshot;

pub use catalog::{outcome_for, CatalogEntry, EntryKind, GameCatalog, GameFilter, OpponentCount, Outcome};
pub use classify::{classify_batch, classify_game, BatchReport, GameClassification};
pub use dataset::{load_dataset_dir, load_dataset_file, parse_dataset, ReferenceOpening};
pub use error::BookError;
pub use index::{normalize_move_text, Candidate, OpeningEntry, OpeningIndex};
pub use names::{base_name, display_name, merge_similar, strip_suffix, MergedName};
pub use resolver::{MatchSource, OpeningResolver, Resolution, DEFAULT_MAX_PLIES, UNKNOWN_OPENING};
pub use snapshot::{load_index, load_snapshot, save_snapshot, SNAPSHOT_FILE_PATH};
