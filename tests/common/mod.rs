use std::path::PathBuf;

use chess_core::GameRecord;
use opening_book::{load_dataset_dir, OpeningIndex};

/// Directory holding the sample reference dataset shipped with the repo.
pub fn sample_book_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/openings")
}

/// Index built from the sample dataset.
pub fn sample_index() -> OpeningIndex {
    let records = load_dataset_dir(sample_book_dir()).expect("sample dataset should load");
    OpeningIndex::build(&records)
}

/// A game between `white` and `black` with the given movetext and result.
#[allow(dead_code)]
pub fn game(white: &str, black: &str, result: &str, movetext: &str) -> GameRecord {
    GameRecord::from_pgn(&format!(
        "[Event \"Live Chess\"]\n[White \"{white}\"]\n[Black \"{black}\"]\n[Result \"{result}\"]\n\n{movetext} {result}"
    ))
}

/// Split movetext into SAN moves, dropping move numbers.
#[allow(dead_code)]
pub fn moves(movetext: &str) -> Vec<String> {
    opening_book::normalize_move_text(movetext)
}
