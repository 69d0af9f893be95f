//! Bulk loading of games from `.pgn` files.
//!
//! Each game is re-emitted as normalized PGN text (tag pairs plus movetext with
//! variations kept, comments and NAGs dropped) and turned into a [`GameRecord`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use chess_core::GameRecord;
use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use tracing::info;

use crate::error::SourceError;

/// Movetext being written for one game.
pub struct MovetextWriter {
    text: String,
    /// Plies played so far on each open line, innermost last.
    plies: Vec<usize>,
    /// Next move needs an explicit number (start of a variation).
    needs_number: bool,
}

impl MovetextWriter {
    fn new() -> Self {
        Self {
            text: String::new(),
            plies: vec![0],
            needs_number: false,
        }
    }

    fn push_word(&mut self, word: &str) {
        if !self.text.is_empty() && !self.text.ends_with('(') {
            self.text.push(' ');
        }
        self.text.push_str(word);
    }

    fn push_move(&mut self, san: &str) {
        let ply = self.plies.last().copied().unwrap_or_default();
        let number = ply / 2 + 1;
        if ply % 2 == 0 {
            self.push_word(&format!("{number}."));
        } else if self.needs_number {
            self.push_word(&format!("{number}..."));
        }
        self.needs_number = false;
        self.push_word(san);
        if let Some(top) = self.plies.last_mut() {
            *top += 1;
        }
    }
}

/// Visitor collecting whole games, variations included.
#[derive(Default)]
pub struct GameCollector;

impl Visitor for GameCollector {
    type Tags = Vec<(String, String)>;
    type Movetext = (Vec<(String, String)>, MovetextWriter);
    type Output = GameRecord;

    fn begin_tags(&mut self) -> ControlFlow<GameRecord, Self::Tags> {
        ControlFlow::Continue(Vec::new())
    }

    fn tag(&mut self, tags: &mut Self::Tags, name: &[u8], value: RawTag<'_>) -> ControlFlow<GameRecord> {
        let name = String::from_utf8_lossy(name).into_owned();
        let value = value.decode_utf8_lossy().replace('"', "'");
        tags.push((name, value));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<GameRecord, Self::Movetext> {
        ControlFlow::Continue((tags, MovetextWriter::new()))
    }

    fn begin_variation(&mut self, (_, writer): &mut Self::Movetext) -> ControlFlow<GameRecord, Skip> {
        // the variation replaces the move just played
        let ply = writer.plies.last().copied().unwrap_or_default().saturating_sub(1);
        writer.plies.push(ply);
        writer.push_word("(");
        writer.needs_number = true;
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, (_, writer): &mut Self::Movetext) -> ControlFlow<GameRecord> {
        writer.plies.pop();
        writer.text.push(')');
        writer.needs_number = true;
        ControlFlow::Continue(())
    }

    fn san(&mut self, (_, writer): &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<GameRecord> {
        writer.push_move(&san_plus.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, (tags, writer): Self::Movetext) -> GameRecord {
        let mut pgn = String::new();
        for (name, value) in &tags {
            pgn.push_str(&format!("[{name} \"{value}\"]\n"));
        }
        if !tags.is_empty() {
            pgn.push('\n');
        }
        pgn.push_str(&writer.text);

        let result = tags
            .iter()
            .find(|(name, _)| name == "Result")
            .map(|(_, value)| value.as_str())
            .unwrap_or("*");
        pgn.push(' ');
        pgn.push_str(result);

        GameRecord::from_pgn(&pgn)
    }
}

/// Read every game from a PGN stream.
pub fn read_games<R: Read>(input: R) -> std::io::Result<Vec<GameRecord>> {
    let mut reader = Reader::new(input);
    let mut collector = GameCollector;
    let mut games = Vec::new();
    while let Some(game) = reader.read_game(&mut collector)? {
        games.push(game);
    }
    Ok(games)
}

pub fn load_pgn_file<P: AsRef<Path>>(path: P) -> Result<Vec<GameRecord>, SourceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_games(BufReader::new(file)).map_err(|source| SourceError::Pgn {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every `*.pgn` file in `dir`, in file-name order.
pub fn load_pgn_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<GameRecord>, SourceError> {
    let pattern = format!("{}/*.pgn", dir.as_ref().display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    files.sort();

    let mut games = Vec::new();
    for file in &files {
        let loaded = load_pgn_file(file)?;
        info!("Read {} games from {}", loaded.len(), file.display());
        games.extend(loaded);
    }
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{main_line_moves, parse_notation};

    const PGN: &str = r#"[Event "Club"]
[White "alice"]
[Black "bob"]
[Result "1-0"]
[ECO "C60"]

1. e4 {best by test} e5 2. Nf3 (2. f4 exf4 (2... d5)) 2... Nc6 $1 3. Bb5 1-0

[White "carol"]
[Black "alice"]
[Result "*"]

1. d4 *
"#;

    #[test]
    fn test_read_games_keeps_headers() {
        let games = read_games(PGN.as_bytes()).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].headers.white, "alice");
        assert_eq!(games[0].eco(), Some("C60"));
        assert_eq!(games[0].headers.event.as_deref(), Some("Club"));
        assert_eq!(games[1].headers.black, "alice");
    }

    #[test]
    fn test_read_games_keeps_variations() {
        let games = read_games(PGN.as_bytes()).unwrap();
        let tokens = parse_notation(&games[0].notation).unwrap();

        assert_eq!(main_line_moves(&tokens), ["e4", "e5", "Nf3", "Nc6", "Bb5"]);
        let alternative = &tokens[2].variations[0];
        assert_eq!(alternative[0].text, "f4");
        assert_eq!(alternative[1].variations[0][0].text, "d5");
        assert!(!games[0].notation.contains("best by test"));
    }

    #[test]
    fn test_movetext_numbering() {
        let games = read_games(PGN.as_bytes()).unwrap();
        assert!(games[0]
            .notation
            .ends_with("1. e4 e5 2. Nf3 (2. f4 exf4 (2... d5)) 2... Nc6 3. Bb5 1-0"));
        assert!(games[1].notation.ends_with("1. d4 *"));
    }

    #[test]
    fn test_load_pgn_dir_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let games = load_pgn_dir(dir.path()).unwrap();
        assert!(games.is_empty());
    }
}
