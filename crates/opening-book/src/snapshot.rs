//! Binary snapshot of a built [`OpeningIndex`].
//!
//! Building from the JSON dataset parses every record; the snapshot is the
//! already-normalized index, written with `bincode` for fast startup.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::{info, warn};

use crate::dataset::load_dataset_dir;
use crate::error::BookError;
use crate::index::OpeningIndex;

/// Default location of the snapshot file.
pub const SNAPSHOT_FILE_PATH: &str = "data/opening_index.bin";

pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<OpeningIndex, BookError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| BookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let index: OpeningIndex = bincode::deserialize_from(BufReader::new(file))?;
    info!(
        "Loaded opening index snapshot: {} names, {} lines",
        index.name_count(),
        index.line_count()
    );
    Ok(index)
}

pub fn save_snapshot<P: AsRef<Path>>(index: &OpeningIndex, path: P) -> Result<(), BookError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| BookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    bincode::serialize_into(BufWriter::new(file), index)?;
    Ok(())
}

/// Load the index from `snapshot` when it is readable, otherwise build it from
/// the dataset directory.
pub fn load_index(book_dir: &Path, snapshot: Option<&Path>) -> Result<OpeningIndex, BookError> {
    if let Some(path) = snapshot {
        match load_snapshot(path) {
            Ok(index) => return Ok(index),
            Err(e) => warn!("Ignoring snapshot {}: {}", path.display(), e),
        }
    }
    let records = load_dataset_dir(book_dir)?;
    Ok(OpeningIndex::build(&records))
}
