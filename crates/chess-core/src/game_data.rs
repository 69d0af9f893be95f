use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::pgn;

/// Header fields read once from a game's tag pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameHeaders {
    pub white: String,
    pub black: String,
    pub white_elo: Option<i32>,
    pub black_elo: Option<i32>,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    pub date: Option<String>,
    pub time_control: Option<String>,
    pub eco: Option<String>,
    pub eco_url: Option<String>,
    pub termination: Option<String>,
    pub event: Option<String>,
    pub link: Option<String>,
}

impl Default for GameHeaders {
    fn default() -> Self {
        Self {
            white: "Unknown".to_string(),
            black: "Unknown".to_string(),
            white_elo: None,
            black_elo: None,
            result: "*".to_string(),
            date: None,
            time_control: None,
            eco: None,
            eco_url: None,
            termination: None,
            event: None,
            link: None,
        }
    }
}

/// A game as supplied by the games source. Classification fills `opening_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub headers: GameHeaders,
    /// Full notation text (tag pairs may be included).
    pub notation: String,
    pub opening_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerInfo {
    pub name: String,
    pub rating: Option<i32>,
}

/// A game seen from one player's side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Perspective {
    pub user_color: Color,
    pub user: PlayerInfo,
    pub opponent: PlayerInfo,
}

impl GameRecord {
    pub fn from_pgn(pgn: &str) -> Self {
        Self {
            headers: pgn::parse_headers(pgn),
            notation: pgn.to_string(),
            opening_name: None,
        }
    }

    pub fn eco(&self) -> Option<&str> {
        self.headers.eco.as_deref()
    }

    pub fn eco_url(&self) -> Option<&str> {
        self.headers.eco_url.as_deref()
    }

    /// Which side `username` played (case-insensitive), or `None` if neither.
    pub fn perspective(&self, username: &str) -> Option<Perspective> {
        let white = PlayerInfo {
            name: self.headers.white.clone(),
            rating: self.headers.white_elo,
        };
        let black = PlayerInfo {
            name: self.headers.black.clone(),
            rating: self.headers.black_elo,
        };

        if self.headers.white.eq_ignore_ascii_case(username) {
            Some(Perspective {
                user_color: Color::White,
                user: white,
                opponent: black,
            })
        } else if self.headers.black.eq_ignore_ascii_case(username) {
            Some(Perspective {
                user_color: Color::Black,
                user: black,
                opponent: white,
            })
        } else {
            None
        }
    }

    pub fn opponent_of(&self, username: &str) -> Option<&str> {
        if self.headers.white.eq_ignore_ascii_case(username) {
            Some(&self.headers.black)
        } else if self.headers.black.eq_ignore_ascii_case(username) {
            Some(&self.headers.white)
        } else {
            None
        }
    }
}
