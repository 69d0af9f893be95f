//! Reference opening dataset loading.
//!
//! A dataset file is JSON, either an object keyed by position whose values are
//! opening records (the layout of the public ECO dataset files) or a plain array
//! of records. Object order is kept, so "first seen" means first in the file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::BookError;

/// One `(name, eco, moves)` record as published in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOpening {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub eco: Option<String>,
    /// Movetext with move numbers, e.g. `"1. e4 e5 2. Nf3"`.
    #[serde(default)]
    pub moves: String,
}

impl ReferenceOpening {
    pub fn new(name: &str, eco: &str, moves: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            eco: Some(eco.to_string()),
            moves: moves.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Keyed(KeyedRecords),
    List(Vec<ReferenceOpening>),
}

/// Values of a JSON object, in document order.
struct KeyedRecords(Vec<ReferenceOpening>);

impl<'de> Deserialize<'de> for KeyedRecords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordsVisitor;

        impl<'de> Visitor<'de> for RecordsVisitor {
            type Value = KeyedRecords;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of opening records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<KeyedRecords, A::Error> {
                let mut records = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((_key, record)) = map.next_entry::<String, ReferenceOpening>()? {
                    records.push(record);
                }
                Ok(KeyedRecords(records))
            }
        }

        deserializer.deserialize_map(RecordsVisitor)
    }
}

/// Parse dataset records from JSON text.
pub fn parse_dataset(json: &str) -> Result<Vec<ReferenceOpening>, serde_json::Error> {
    Ok(match serde_json::from_str::<DatasetFile>(json)? {
        DatasetFile::Keyed(KeyedRecords(records)) => records,
        DatasetFile::List(records) => records,
    })
}

pub fn load_dataset_file<P: AsRef<Path>>(path: P) -> Result<Vec<ReferenceOpening>, BookError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| BookError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_dataset(&text).map_err(|source| BookError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} opening records from {}", records.len(), path.display());
    Ok(records)
}

/// Load every `*.json` file in `dir`, in file-name order.
pub fn load_dataset_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<ReferenceOpening>, BookError> {
    let dir = dir.as_ref();
    let pattern = format!("{}/*.json", dir.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    files.sort();

    if files.is_empty() {
        return Err(BookError::NoFiles(dir.to_path_buf()));
    }

    let mut records = Vec::new();
    for file in &files {
        records.extend(load_dataset_file(file)?);
    }

    info!(
        "Loaded opening dataset: {} records from {} files",
        records.len(),
        files.len()
    );
    Ok(records)
}
