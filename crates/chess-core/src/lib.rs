//! Game notation parsing and move trees.
//!
//! `notation` turns movetext into nested move tokens, `move_tree` replays them
//! through a [`engine::PositionEngine`] into a navigable tree of positions.

pub mod engine;
pub mod error;
pub mod game_data;
pub mod move_tree;
pub mod notation;
pub mod pgn;

pub use engine::{PositionEngine, PositionKey, StandardChess};
pub use error::{BranchPath, IllegalMoveError, MoveRejection, NotationError};
pub use game_data::{GameHeaders, GameRecord, Perspective, PlayerInfo};
pub use move_tree::{build_tree, BuiltTree, MoveTree, NodeId, PositionNode, TreeCursor, WalkStep};
pub use notation::{canonical_san, main_line_moves, parse_notation, MoveToken, MAX_VARIATION_DEPTH};
