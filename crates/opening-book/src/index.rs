//! Immutable opening book index.
//!
//! Built once from reference records and then shared read-only. Holds the base
//! name -> move sequences mapping used for prefix matching and the ECO code ->
//! representative name mapping used as a fallback.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use chess_core::canonical_san;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::ReferenceOpening;
use crate::names::{base_name, comparable_words};

static MOVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.+\s*").unwrap());

/// Strip move numbers and split movetext into move tokens, spelled the way
/// parsed games spell them (`0-0` -> `O-O`, `e8Q` -> `e8=Q`). Words that are
/// not SAN are kept as written.
///
/// `"1. e4 e5 2.Nf3"` -> `["e4", "e5", "Nf3"]`.
pub fn normalize_move_text(moves: &str) -> Vec<String> {
    MOVE_NUMBER_RE
        .replace_all(moves, " ")
        .split_whitespace()
        .map(|word| canonical_san(word).unwrap_or_else(|| word.to_string()))
        .collect()
}

/// Compare moves ignoring check and mate marks.
pub fn same_move(a: &str, b: &str) -> bool {
    a.trim_end_matches(['+', '#']) == b.trim_end_matches(['+', '#'])
}

/// A reference record after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningEntry {
    pub name: String,
    pub base_name: String,
    pub eco: Option<String>,
    pub moves: Vec<String>,
}

impl OpeningEntry {
    /// `None` for records without a name or an ECO code.
    pub fn from_reference(record: &ReferenceOpening) -> Option<Self> {
        let name = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty())?;
        let eco = record.eco.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        let base = base_name(name);
        if base.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            base_name: base.to_string(),
            eco: Some(eco.to_ascii_uppercase()),
            moves: normalize_move_text(&record.moves),
        })
    }
}

/// A reference line fully contained in the start of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    pub base_name: &'a str,
    /// Length of the reference sequence, in plies.
    pub matched_len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningIndex {
    lines: BTreeMap<String, Vec<Vec<String>>>,
    eco_names: BTreeMap<String, String>,
    names: BTreeSet<String>,
}

impl OpeningIndex {
    /// Build from dataset records, skipping those without a name or ECO code.
    pub fn build(records: &[ReferenceOpening]) -> Self {
        let entries: Vec<OpeningEntry> = records.iter().filter_map(OpeningEntry::from_reference).collect();
        let skipped = records.len() - entries.len();
        let index = Self::from_entries(entries);
        info!(
            "Built opening index: {} names, {} lines, {} ECO codes ({} records skipped)",
            index.name_count(),
            index.line_count(),
            index.eco_count(),
            skipped
        );
        index
    }

    pub fn from_entries<I: IntoIterator<Item = OpeningEntry>>(entries: I) -> Self {
        let mut index = Self::default();

        for entry in entries {
            if let Some(eco) = entry.eco {
                // first seen wins
                index.eco_names.entry(eco).or_insert_with(|| entry.base_name.clone());
            }
            if !entry.moves.is_empty() {
                let sequences = index.lines.entry(entry.base_name.clone()).or_default();
                if !sequences.contains(&entry.moves) {
                    sequences.push(entry.moves);
                }
            }
            index.names.insert(entry.base_name);
        }

        index
    }

    /// Every `(base name, sequence)` pair whose whole sequence starts `moves`.
    pub fn candidates_for_prefix<S: AsRef<str>>(&self, moves: &[S]) -> Vec<Candidate<'_>> {
        let mut found = Vec::new();
        for (name, sequences) in &self.lines {
            for sequence in sequences {
                let is_prefix = sequence.len() <= moves.len()
                    && sequence
                        .iter()
                        .zip(moves)
                        .all(|(reference, played)| same_move(reference, played.as_ref()));
                if is_prefix {
                    found.push(Candidate {
                        base_name: name,
                        matched_len: sequence.len(),
                    });
                }
            }
        }
        found
    }

    /// Representative base name for an ECO code (case-insensitive).
    pub fn name_for_eco(&self, code: &str) -> Option<&str> {
        self.eco_names
            .get(&code.trim().to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Longest base name whose words open the free-text `hint`.
    ///
    /// Punctuation and case are ignored, so `"Kings Pawn Opening"` matches
    /// "King's Pawn Opening".
    pub fn name_for_hint(&self, hint: &str) -> Option<&str> {
        let hint_words = comparable_words(hint);
        if hint_words.is_empty() {
            return None;
        }

        self.names
            .iter()
            .filter_map(|name| {
                let words = comparable_words(name);
                let matches = !words.is_empty() && hint_words.starts_with(&words);
                matches.then_some((name.as_str(), words.len()))
            })
            // longest wins; the BTreeSet order keeps ties on the first name
            .fold(None, |best: Option<(&str, usize)>, (name, len)| match best {
                Some((_, best_len)) if best_len >= len => best,
                _ => Some((name, len)),
            })
            .map(|(name, _)| name)
    }

    /// Reference sequences stored for a base name.
    pub fn sequences(&self, base_name: &str) -> &[Vec<String>] {
        self.lines.get(base_name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }

    pub fn eco_count(&self) -> usize {
        self.eco_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
