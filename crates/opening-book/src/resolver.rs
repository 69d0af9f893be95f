//! Opening name resolution.
//!
//! Longest reference line fully played wins. Without a move match the declared
//! ECO code, then the opening URL hint, are consulted before giving up.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::index::{Candidate, OpeningIndex};
use crate::names::{has_generic_keyword, hint_from_eco_url, strip_suffix};

pub const UNKNOWN_OPENING: &str = "Unknown Opening";

/// Plies of a game considered for matching.
pub const DEFAULT_MAX_PLIES: usize = 20;

/// How a name was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchSource {
    Moves { matched_plies: usize },
    Eco { code: String },
    EcoUrl,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub name: String,
    pub source: MatchSource,
}

impl Resolution {
    fn unknown() -> Self {
        Self {
            name: UNKNOWN_OPENING.to_string(),
            source: MatchSource::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.source == MatchSource::Unknown
    }
}

/// Resolver over a shared, read-only index.
#[derive(Debug, Clone, Copy)]
pub struct OpeningResolver<'a> {
    index: &'a OpeningIndex,
    max_plies: usize,
}

impl<'a> OpeningResolver<'a> {
    pub fn new(index: &'a OpeningIndex) -> Self {
        Self {
            index,
            max_plies: DEFAULT_MAX_PLIES,
        }
    }

    pub fn with_max_plies(mut self, max_plies: usize) -> Self {
        self.max_plies = max_plies;
        self
    }

    pub fn max_plies(&self) -> usize {
        self.max_plies
    }

    pub fn resolve<S: AsRef<str>>(&self, moves: &[S], eco: Option<&str>) -> Resolution {
        self.resolve_with_hint(moves, eco, None)
    }

    /// Resolve with every fallback, including the opening URL hint.
    pub fn resolve_with_hint<S: AsRef<str>>(
        &self,
        moves: &[S],
        eco: Option<&str>,
        eco_url: Option<&str>,
    ) -> Resolution {
        let played = &moves[..moves.len().min(self.max_plies)];

        if let Some(best) = best_candidate(self.index.candidates_for_prefix(played)) {
            return Resolution {
                name: strip_suffix(best.base_name),
                source: MatchSource::Moves {
                    matched_plies: best.matched_len,
                },
            };
        }

        if let Some(code) = eco.map(str::trim).filter(|c| !c.is_empty()) {
            if let Some(name) = self.index.name_for_eco(code) {
                debug!("No line matched, resolved by ECO {}", code);
                return Resolution {
                    name: strip_suffix(name),
                    source: MatchSource::Eco {
                        code: code.to_ascii_uppercase(),
                    },
                };
            }
        }

        if let Some(hint) = eco_url.and_then(hint_from_eco_url) {
            if let Some(name) = self.index.name_for_hint(&hint) {
                debug!("No line matched, resolved by URL hint {:?}", hint);
                return Resolution {
                    name: strip_suffix(name),
                    source: MatchSource::EcoUrl,
                };
            }
        }

        Resolution::unknown()
    }

    /// Name only, for callers that do not care how it was found.
    pub fn resolve_name<S: AsRef<str>>(&self, moves: &[S], eco: Option<&str>) -> String {
        self.resolve(moves, eco).name
    }
}

fn best_candidate<'a>(candidates: Vec<Candidate<'a>>) -> Option<Candidate<'a>> {
    candidates.into_iter().max_by(|a, b| rank(a, b))
}

/// Greater is better: longer match, then generic keyword, then shorter name,
/// then alphabetically first.
fn rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.matched_len
        .cmp(&b.matched_len)
        .then_with(|| has_generic_keyword(a.base_name).cmp(&has_generic_keyword(b.base_name)))
        .then_with(|| b.base_name.len().cmp(&a.base_name.len()))
        .then_with(|| b.base_name.cmp(a.base_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ReferenceOpening;

    fn book() -> OpeningIndex {
        OpeningIndex::build(&[
            ReferenceOpening::new("King's Pawn Game", "C20", "1. e4 e5"),
            ReferenceOpening::new("Ruy Lopez", "C60", "1. e4 e5 2. Nf3 Nc6 3. Bb5"),
            ReferenceOpening::new("Sicilian Defense", "B20", "1. e4 c5 2. Nc3 Nc6 3. g3"),
            ReferenceOpening::new("Italian Game: Classical Variation", "C53", "1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5"),
            ReferenceOpening::new("Queen's Pawn Game", "D00", "1. d4 d5"),
        ])
    }

    #[test]
    fn test_longest_prefix_wins() {
        let index = book();
        let resolver = OpeningResolver::new(&index);
        let res = resolver.resolve(&["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"], None);
        assert_eq!(res.name, "Ruy Lopez");
        assert_eq!(res.source, MatchSource::Moves { matched_plies: 5 });
    }

    #[test]
    fn test_short_match_gets_suffix_stripped() {
        let index = book();
        let resolver = OpeningResolver::new(&index);
        assert_eq!(resolver.resolve_name(&["e4", "e5", "Qh5"], None), "King's Pawn");
    }

    #[test]
    fn test_eco_fallback_keeps_two_word_name() {
        let index = book();
        let resolver = OpeningResolver::new(&index);
        let res = resolver.resolve(&["e4", "c5"], Some("b20"));
        assert_eq!(res.name, "Sicilian Defense");
        assert_eq!(res.source, MatchSource::Eco { code: "B20".into() });
    }

    #[test]
    fn test_url_hint_after_eco() {
        let index = book();
        let resolver = OpeningResolver::new(&index);
        let url = Some("https://www.chess.com/openings/Italian-Game-Two-Knights-Defense");

        let res = resolver.resolve_with_hint(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Nf6"], None, url);
        // still matches King's Pawn Game by moves
        assert_eq!(res.name, "King's Pawn");

        let res = resolver.resolve_with_hint(&["Nf3", "Nf6"], Some("Z99"), url);
        assert_eq!(res.name, "Italian Game");
        assert_eq!(res.source, MatchSource::EcoUrl);
    }

    #[test]
    fn test_unknown_opening() {
        let index = book();
        let resolver = OpeningResolver::new(&index);
        let res = resolver.resolve(&["a3", "a6"], None);
        assert!(res.is_unknown());
        assert_eq!(res.name, UNKNOWN_OPENING);
        assert!(resolver.resolve::<&str>(&[], None).is_unknown());
    }

    #[test]
    fn test_truncation_limits_matching() {
        let index = book();
        let resolver = OpeningResolver::new(&index).with_max_plies(3);
        let res = resolver.resolve(&["e4", "e5", "Nf3", "Nc6", "Bb5"], None);
        assert_eq!(res.source, MatchSource::Moves { matched_plies: 2 });
    }

    #[test]
    fn test_ties_prefer_generic_keyword_then_shorter() {
        let index = OpeningIndex::build(&[
            ReferenceOpening::new("Zukertort", "A04", "1. Nf3"),
            ReferenceOpening::new("Reti Opening", "A04", "1. Nf3"),
            ReferenceOpening::new("Nimzo-Larsen Attack", "A01", "1. b3"),
            ReferenceOpening::new("Larsen", "A01", "1. b3"),
            ReferenceOpening::new("Nimzowitsch-Larsen", "A01", "1. b3"),
        ]);
        let resolver = OpeningResolver::new(&index);
        assert_eq!(resolver.resolve_name(&["Nf3"], None), "Reti Opening");
        assert_eq!(resolver.resolve_name(&["b3"], None), "Larsen");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let index = book();
        let resolver = OpeningResolver::new(&index);
        let moves = ["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "c3"];
        let first = resolver.resolve(&moves, Some("C50"));
        for _ in 0..10 {
            assert_eq!(resolver.resolve(&moves, Some("C50")), first);
        }
        assert_eq!(first.name, "Italian Game");
    }
}
