//! Per-game classification boundary.
//!
//! A game that cannot be parsed is recorded and skipped; it never aborts a batch.

use chess_core::{main_line_moves, parse_notation, GameRecord, NotationError};
use serde::Serialize;
use tracing::{debug, warn};

use crate::resolver::{MatchSource, OpeningResolver, Resolution};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameClassification {
    Classified(Resolution),
    /// The notation holds no moves.
    NoMoves,
    Unparseable(NotationError),
}

impl GameClassification {
    pub fn opening_name(&self) -> Option<&str> {
        match self {
            GameClassification::Classified(res) => Some(&res.name),
            _ => None,
        }
    }
}

/// Parse a game's main line and resolve its opening.
pub fn classify_game(resolver: &OpeningResolver<'_>, game: &GameRecord) -> GameClassification {
    let tokens = match parse_notation(&game.notation) {
        Ok(tokens) => tokens,
        Err(NotationError::Empty) => return GameClassification::NoMoves,
        Err(e) => return GameClassification::Unparseable(e),
    };
    let moves = main_line_moves(&tokens);
    GameClassification::Classified(resolver.resolve_with_hint(&moves, game.eco(), game.eco_url()))
}

/// Counts from one classification run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub by_moves: usize,
    pub by_eco: usize,
    pub by_eco_url: usize,
    pub unknown: usize,
    pub no_moves: usize,
    pub unparseable: usize,
}

impl BatchReport {
    pub fn classified(&self) -> usize {
        self.by_moves + self.by_eco + self.by_eco_url + self.unknown
    }

    fn record(&mut self, outcome: &GameClassification) {
        self.total += 1;
        match outcome {
            GameClassification::Classified(res) => match res.source {
                MatchSource::Moves { .. } => self.by_moves += 1,
                MatchSource::Eco { .. } => self.by_eco += 1,
                MatchSource::EcoUrl => self.by_eco_url += 1,
                MatchSource::Unknown => self.unknown += 1,
            },
            GameClassification::NoMoves => self.no_moves += 1,
            GameClassification::Unparseable(_) => self.unparseable += 1,
        }
    }
}

/// Classify every game in place, setting `opening_name`.
///
/// Games without moves or with malformed notation are left with no opening.
pub fn classify_batch(resolver: &OpeningResolver<'_>, games: &mut [GameRecord]) -> BatchReport {
    let mut report = BatchReport::default();

    for (i, game) in games.iter_mut().enumerate() {
        let outcome = classify_game(resolver, game);
        match &outcome {
            GameClassification::Unparseable(e) => {
                warn!("Skipping game {} ({} vs {}): {}", i, game.headers.white, game.headers.black, e);
            }
            GameClassification::NoMoves => debug!("Game {} has no moves", i),
            GameClassification::Classified(_) => {}
        }
        game.opening_name = outcome.opening_name().map(str::to_string);
        report.record(&outcome);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ReferenceOpening;
    use crate::index::OpeningIndex;
    use crate::resolver::UNKNOWN_OPENING;

    fn index() -> OpeningIndex {
        OpeningIndex::build(&[
            ReferenceOpening::new("Ruy Lopez", "C60", "1. e4 e5 2. Nf3 Nc6 3. Bb5"),
            ReferenceOpening::new("Sicilian Defense", "B20", "1. e4 c5 2. Nc3"),
        ])
    }

    fn game(notation: &str) -> GameRecord {
        GameRecord::from_pgn(notation)
    }

    #[test]
    fn test_classify_game_with_variations() {
        let index = index();
        let resolver = OpeningResolver::new(&index);
        let g = game("1. e4 e5 (1... c5 2. Nc3) 2. Nf3 Nc6 3. Bb5 a6 *");
        let outcome = classify_game(&resolver, &g);
        assert_eq!(outcome.opening_name(), Some("Ruy Lopez"));
    }

    #[test]
    fn test_classify_game_reads_eco_header() {
        let index = index();
        let resolver = OpeningResolver::new(&index);
        let g = game("[ECO \"B20\"]\n\n1. e4 c5 2. Nf3 *");
        let outcome = classify_game(&resolver, &g);
        let GameClassification::Classified(res) = outcome else {
            panic!("expected a classification");
        };
        assert_eq!(res.name, "Sicilian Defense");
        assert_eq!(res.source, MatchSource::Eco { code: "B20".into() });
    }

    #[test]
    fn test_batch_survives_bad_games() {
        let index = index();
        let resolver = OpeningResolver::new(&index);
        let mut games = vec![
            game("1. e4 e5 2. Nf3 Nc6 3. Bb5"),
            game("[White \"a\"]\n[Black \"b\"]\n\n*"),
            game("1. e4 e5 ) 2. Nf3"),
            game("1. a3 a6"),
        ];

        let report = classify_batch(&resolver, &mut games);

        assert_eq!(report.total, 4);
        assert_eq!(report.by_moves, 1);
        assert_eq!(report.no_moves, 1);
        assert_eq!(report.unparseable, 1);
        assert_eq!(report.unknown, 1);
        assert_eq!(report.classified(), 2);

        assert_eq!(games[0].opening_name.as_deref(), Some("Ruy Lopez"));
        assert_eq!(games[1].opening_name, None);
        assert_eq!(games[2].opening_name, None);
        assert_eq!(games[3].opening_name.as_deref(), Some(UNKNOWN_OPENING));
    }
}
