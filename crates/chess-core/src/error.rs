//! Error types for notation parsing and tree building.

use std::fmt;

use thiserror::Error;

/// Failure to turn notation text into move tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// No moves present. Not a real failure: the game simply cannot be classified.
    #[error("notation contains no moves")]
    Empty,

    #[error("malformed notation at byte {offset}: {reason} (near {fragment:?})")]
    Parse {
        offset: usize,
        fragment: String,
        reason: &'static str,
    },
}

impl NotationError {
    pub(crate) fn parse(offset: usize, fragment: &str, reason: &'static str) -> Self {
        NotationError::Parse {
            offset,
            fragment: fragment.chars().take(24).collect(),
            reason,
        }
    }
}

/// Why the position engine refused a move.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    #[error("not a SAN move")]
    InvalidSan,

    #[error("illegal in this position")]
    Illegal,
}

/// Location of a line inside the token tree.
///
/// Each step is `(move index in the enclosing line, variation index on that move)`.
/// The main line is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BranchPath(pub Vec<(usize, usize)>);

impl BranchPath {
    pub fn main_line() -> Self {
        Self(Vec::new())
    }

    pub fn is_main_line(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn enter(&self, move_index: usize, variation: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push((move_index, variation));
        Self(steps)
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("main line");
        }
        let steps: Vec<String> = self
            .0
            .iter()
            .map(|(mv, var)| format!("{mv}.{var}"))
            .collect();
        write!(f, "variation {}", steps.join("/"))
    }
}

/// A move in some branch could not be replayed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("move {move_text:?} rejected in {path} at ply {ply}: {reason}")]
pub struct IllegalMoveError {
    pub move_text: String,
    pub path: BranchPath,
    /// Ply number the move would have had (1 = white's first move).
    pub ply: usize,
    pub reason: MoveRejection,
}
