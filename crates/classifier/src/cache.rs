//! In-memory read-through cache of monthly games.

use std::collections::HashMap;

use chess_core::GameRecord;
use tracing::debug;

use crate::error::SourceError;
use crate::source::{GameSource, MonthKey};

/// Monthly game lists for one player, keyed by `YYYY-MM`.
///
/// Switching to another player drops everything cached for the previous one.
#[derive(Debug, Default)]
pub struct MonthCache {
    user: Option<String>,
    months: HashMap<MonthKey, Vec<GameRecord>>,
}

impl MonthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, month: MonthKey) -> Option<&[GameRecord]> {
        self.months.get(&month).map(Vec::as_slice)
    }

    pub fn insert(&mut self, month: MonthKey, games: Vec<GameRecord>) {
        self.months.insert(month, games);
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn clear(&mut self) {
        self.months.clear();
        self.user = None;
    }

    /// Cached games for `month`, fetching from `source` on a miss.
    pub fn get_or_fetch<S: GameSource + ?Sized>(
        &mut self,
        source: &S,
        user: &str,
        month: MonthKey,
    ) -> Result<&[GameRecord], SourceError> {
        if !self.user.as_deref().is_some_and(|u| u.eq_ignore_ascii_case(user)) {
            self.clear();
            self.user = Some(user.to_string());
        }

        if !self.months.contains_key(&month) {
            debug!("Cache miss for {} {}", user, month);
            let games = source.monthly_games(user, month)?;
            self.months.insert(month, games);
        }
        Ok(self.get(month).unwrap_or_default())
    }

    /// Every game of `user` across `months`, in month order.
    pub fn games_for_months<S: GameSource + ?Sized>(
        &mut self,
        source: &S,
        user: &str,
        months: &[MonthKey],
    ) -> Result<Vec<GameRecord>, SourceError> {
        let mut games = Vec::new();
        for &month in months {
            games.extend_from_slice(self.get_or_fetch(source, user, month)?);
        }
        Ok(games)
    }
}
