//! Position engine: replays SAN moves and answers board queries.
//!
//! The move tree only needs a handful of operations from a rules engine, so they
//! sit behind [`PositionEngine`]. [`StandardChess`] implements it with shakmaty.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, san::SanPlus, Chess, Color, EnPassantMode, Piece, Position, Square};

use crate::error::MoveRejection;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Board identity without move counters: placement, side, castling, en passant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn from_fen(fen: &str) -> Self {
        Self(normalize_fen(fen))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips move counters from FEN, keeping only position + side + castling + ep.
pub fn normalize_fen(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

/// Rules engine used to replay recorded games.
pub trait PositionEngine {
    type Position: Clone;

    /// The standard initial position.
    fn new_game(&self) -> Self::Position;

    /// Play `move_text` (SAN) on `position`, returning the new position.
    fn apply_move(
        &self,
        position: &Self::Position,
        move_text: &str,
    ) -> Result<Self::Position, MoveRejection>;

    fn side_to_move(&self, position: &Self::Position) -> Color;

    fn piece_at(&self, position: &Self::Position, square: Square) -> Option<Piece>;

    fn position_key(&self, position: &Self::Position) -> PositionKey;
}

/// Orthodox chess backed by shakmaty.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl PositionEngine for StandardChess {
    type Position = Chess;

    fn new_game(&self) -> Chess {
        Chess::default()
    }

    fn apply_move(&self, position: &Chess, move_text: &str) -> Result<Chess, MoveRejection> {
        let san_plus: SanPlus = move_text.parse().map_err(|_| MoveRejection::InvalidSan)?;
        let mv = san_plus
            .san
            .to_move(position)
            .map_err(|_| MoveRejection::Illegal)?;

        // to_move only yields legal moves
        let mut next = position.clone();
        next.play_unchecked(mv);
        Ok(next)
    }

    fn side_to_move(&self, position: &Chess) -> Color {
        position.turn()
    }

    fn piece_at(&self, position: &Chess, square: Square) -> Option<Piece> {
        position.board().piece_at(square)
    }

    fn position_key(&self, position: &Chess) -> PositionKey {
        let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
        PositionKey::from_fen(&fen)
    }
}
