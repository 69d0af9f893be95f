//! Games sources: where monthly game archives come from.
//!
//! The remote games service is not wrapped here; [`DirectorySource`] reads
//! archives already saved on disk in the service's monthly JSON shape.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chess_core::GameRecord;
use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::SourceError;

/// A calendar month, displayed and parsed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, SourceError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(SourceError::InvalidMonth(format!("{year}-{month}")))
        }
    }

    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(&Utc::now())
    }

    /// Month of a Unix timestamp, e.g. an account's join time.
    pub fn from_timestamp(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(|dt| Self::from_date(&dt))
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Every month from `from` to `to`, both included. Empty when `from > to`.
    pub fn range_inclusive(from: Self, to: Self) -> Vec<Self> {
        let mut months = Vec::new();
        let mut month = from;
        while month <= to {
            months.push(month);
            month = month.next();
        }
        months
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SourceError::InvalidMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

/// Supplier of a player's games, one month at a time.
pub trait GameSource {
    /// Months for which the player has an archive, oldest first.
    fn archive_months(&self, user: &str) -> Result<Vec<MonthKey>, SourceError>;

    /// Games played in `month`. A month without an archive has no games.
    fn monthly_games(&self, user: &str, month: MonthKey) -> Result<Vec<GameRecord>, SourceError>;
}

/// One game in a monthly archive file.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchivedGame {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pgn: String,
    pub white: ArchivedPlayer,
    pub black: ArchivedPlayer,
    /// Opening page URL, used as a naming hint.
    #[serde(default)]
    pub eco: Option<String>,
    #[serde(default)]
    pub time_control: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchivedPlayer {
    pub username: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MonthlyArchive {
    #[serde(default)]
    games: Vec<ArchivedGame>,
}

impl ArchivedGame {
    /// Headers come from the PGN; archive fields fill what it lacks.
    pub fn into_record(self) -> GameRecord {
        let mut record = GameRecord::from_pgn(&self.pgn);
        let headers = &mut record.headers;

        if !self.pgn.contains("[White ") {
            headers.white = self.white.username;
        }
        if !self.pgn.contains("[Black ") {
            headers.black = self.black.username;
        }
        headers.white_elo = headers.white_elo.or(self.white.rating);
        headers.black_elo = headers.black_elo.or(self.black.rating);
        headers.eco_url = headers.eco_url.take().or(self.eco);
        headers.link = headers.link.take().or(self.url);
        headers.time_control = headers.time_control.take().or(self.time_control);
        record
    }
}

/// Parse one monthly archive file's JSON.
pub fn parse_monthly_archive(json: &str) -> Result<Vec<ArchivedGame>, serde_json::Error> {
    Ok(serde_json::from_str::<MonthlyArchive>(json)?.games)
}

/// Archives saved as `<root>/<user>/<YYYY>/<MM>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn user_dir(&self, user: &str) -> PathBuf {
        self.root.join(user.to_lowercase())
    }

    pub fn month_path(&self, user: &str, month: MonthKey) -> PathBuf {
        self.user_dir(user)
            .join(format!("{:04}", month.year))
            .join(format!("{:02}.json", month.month))
    }
}

fn month_from_path(path: &Path) -> Option<MonthKey> {
    let month = path.file_stem()?.to_str()?.parse().ok()?;
    let year = path.parent()?.file_name()?.to_str()?.parse().ok()?;
    MonthKey::new(year, month).ok()
}

impl GameSource for DirectorySource {
    fn archive_months(&self, user: &str) -> Result<Vec<MonthKey>, SourceError> {
        let pattern = format!("{}/*/*.json", self.user_dir(user).display());
        let mut months: Vec<MonthKey> = glob::glob(&pattern)?
            .filter_map(|p| p.ok())
            .filter_map(|p| month_from_path(&p))
            .collect();
        months.sort();
        months.dedup();
        Ok(months)
    }

    fn monthly_games(&self, user: &str, month: MonthKey) -> Result<Vec<GameRecord>, SourceError> {
        let path = self.month_path(user, month);
        if !path.exists() {
            debug!("No archive for {} in {}", user, month);
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        let games = parse_monthly_archive(&text).map_err(|source| SourceError::Json { path, source })?;
        Ok(games.into_iter().map(ArchivedGame::into_record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCHIVE: &str = r#"{"games": [
        {
            "url": "https://www.chess.com/game/live/1",
            "pgn": "[White \"alice\"]\n[Black \"bob\"]\n[Result \"1-0\"]\n[ECO \"C60\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0",
            "time_control": "600",
            "eco": "https://www.chess.com/openings/Ruy-Lopez-Opening",
            "white": {"username": "alice", "rating": 1500, "result": "win"},
            "black": {"username": "bob", "rating": 1480, "result": "resigned"}
        },
        {
            "pgn": "1. d4 d5 *",
            "white": {"username": "carol"},
            "black": {"username": "alice", "rating": 1510}
        }
    ]}"#;

    #[test]
    fn test_month_key_format_and_parse() {
        let key: MonthKey = "2024-03".parse().unwrap();
        assert_eq!(key, MonthKey { year: 2024, month: 3 });
        assert_eq!(key.to_string(), "2024-03");
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("March".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_range_crosses_years() {
        let from = MonthKey::new(2023, 11).unwrap();
        let to = MonthKey::new(2024, 2).unwrap();
        let months: Vec<String> = MonthKey::range_inclusive(from, to).iter().map(|m| m.to_string()).collect();
        assert_eq!(months, ["2023-11", "2023-12", "2024-01", "2024-02"]);
        assert!(MonthKey::range_inclusive(to, from).is_empty());
    }

    #[test]
    fn test_month_from_timestamp() {
        // 2021-07-15T00:00:00Z
        assert_eq!(MonthKey::from_timestamp(1_626_307_200), Some(MonthKey { year: 2021, month: 7 }));
    }

    #[test]
    fn test_archived_games_become_records() {
        let records: Vec<GameRecord> = parse_monthly_archive(ARCHIVE)
            .unwrap()
            .into_iter()
            .map(ArchivedGame::into_record)
            .collect();

        assert_eq!(records[0].headers.white, "alice");
        assert_eq!(records[0].headers.white_elo, Some(1500));
        assert_eq!(records[0].eco(), Some("C60"));
        assert_eq!(records[0].eco_url(), Some("https://www.chess.com/openings/Ruy-Lopez-Opening"));
        assert_eq!(records[0].headers.link.as_deref(), Some("https://www.chess.com/game/live/1"));

        // bare movetext: names and ratings come from the archive
        assert_eq!(records[1].headers.white, "carol");
        assert_eq!(records[1].headers.black, "alice");
        assert_eq!(records[1].headers.black_elo, Some(1510));
    }

    #[test]
    fn test_directory_source() {
        let root = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(root.path());
        let march = MonthKey::new(2024, 3).unwrap();
        let path = source.month_path("Alice", march);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, ARCHIVE).unwrap();
        fs::write(path.with_file_name("notes.json"), "{}").unwrap();

        let months = source.archive_months("alice").unwrap();
        let games = source.monthly_games("ALICE", march).unwrap();
        let empty = source.monthly_games("alice", march.next()).unwrap();

        assert_eq!(months, [march]);
        assert_eq!(games.len(), 2);
        assert!(empty.is_empty());
    }
}
