//! Opponent and opening statistics over a player's classified games, plus the
//! filters they drive.

use std::collections::{BTreeMap, HashMap};

use chess_core::GameRecord;
use serde::Serialize;
use shakmaty::Color;

use crate::names::{merge_similar, MergedName};
use crate::resolver::UNKNOWN_OPENING;

/// Result of a game for the player it is viewed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Outcome for `username`, `None` for unfinished games or games they did not play.
pub fn outcome_for(game: &GameRecord, username: &str) -> Option<Outcome> {
    let color = game.perspective(username)?.user_color;
    match (game.headers.result.as_str(), color) {
        ("1-0", Color::White) | ("0-1", Color::Black) => Some(Outcome::Win),
        ("1-0", Color::Black) | ("0-1", Color::White) => Some(Outcome::Loss),
        ("1/2-1/2", _) => Some(Outcome::Draw),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpponentCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Opponent,
    Opening,
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry<'a> {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub value: &'a str,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GameCatalog {
    pub opponents: Vec<OpponentCount>,
    pub openings: Vec<MergedName>,
    /// Lowercased opening name -> merged representative.
    #[serde(skip)]
    aliases: HashMap<String, String>,
}

impl GameCatalog {
    /// Count opponents and merged openings across `games` as seen by `username`.
    pub fn build(games: &[GameRecord], username: &str) -> Self {
        let mut opponents: BTreeMap<&str, usize> = BTreeMap::new();
        let mut openings: BTreeMap<&str, usize> = BTreeMap::new();

        for game in games {
            if let Some(opponent) = game.opponent_of(username) {
                *opponents.entry(opponent).or_default() += 1;
            }
            if let Some(name) = game.opening_name.as_deref() {
                if name != UNKNOWN_OPENING {
                    *openings.entry(name).or_default() += 1;
                }
            }
        }

        let mut opponents: Vec<OpponentCount> = opponents
            .into_iter()
            .map(|(name, count)| OpponentCount {
                name: name.to_string(),
                count,
            })
            .collect();
        opponents.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        let openings = merge_similar(openings);
        let aliases = openings
            .iter()
            .flat_map(|merged| {
                merged
                    .members
                    .iter()
                    .map(move |member| (member.to_lowercase(), merged.name.clone()))
            })
            .collect();

        Self {
            opponents,
            openings,
            aliases,
        }
    }

    /// The merged name an opening is counted under.
    pub fn representative(&self, opening: &str) -> Option<&str> {
        self.aliases.get(&opening.to_lowercase()).map(String::as_str)
    }

    /// Opponents then openings whose name contains `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<CatalogEntry<'_>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let opponents = self.opponents.iter().map(|o| CatalogEntry {
            kind: EntryKind::Opponent,
            value: &o.name,
            count: o.count,
        });
        let openings = self.openings.iter().map(|o| CatalogEntry {
            kind: EntryKind::Opening,
            value: &o.name,
            count: o.count,
        });
        opponents
            .chain(openings)
            .filter(|entry| entry.value.to_lowercase().contains(&query))
            .collect()
    }

    /// Games matching every criterion set in `filter`.
    pub fn filter<'g>(
        &self,
        games: &'g [GameRecord],
        filter: &GameFilter,
        username: &str,
    ) -> Vec<&'g GameRecord> {
        let wanted_opening = filter.opening.as_deref().map(|name| {
            self.representative(name)
                .unwrap_or(name)
                .to_lowercase()
        });

        games
            .iter()
            .filter(|game| {
                if let Some(opponent) = filter.opponent.as_deref() {
                    let matches = game
                        .opponent_of(username)
                        .is_some_and(|o| o.eq_ignore_ascii_case(opponent));
                    if !matches {
                        return false;
                    }
                }
                if let Some(wanted) = wanted_opening.as_deref() {
                    let matches = game.opening_name.as_deref().is_some_and(|name| {
                        self.representative(name).unwrap_or(name).to_lowercase() == wanted
                    });
                    if !matches {
                        return false;
                    }
                }
                if let Some(outcome) = filter.outcome {
                    if outcome_for(game, username) != Some(outcome) {
                        return false;
                    }
                }
                if let Some(color) = filter.color {
                    if game.perspective(username).map(|p| p.user_color) != Some(color) {
                        return false;
                    }
                }
                true
            })
            .collect()
    }
}

/// Selection applied to a game list. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    pub opponent: Option<String>,
    pub opening: Option<String>,
    pub outcome: Option<Outcome>,
    pub color: Option<Color>,
}

impl GameFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
