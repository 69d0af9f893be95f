//! PGN tag-pair utilities: a lightweight regex-based reader.

use std::sync::LazyLock;

use regex::Regex;

use crate::game_data::GameHeaders;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#).unwrap());

/// Read the known tag pairs of a PGN into a structured header record.
/// Empty values are treated as absent; unknown tags are ignored.
pub fn parse_headers(pgn: &str) -> GameHeaders {
    let mut headers = GameHeaders::default();

    for cap in HEADER_RE.captures_iter(pgn) {
        let key = &cap[1];
        let value = cap[2].trim();
        if value.is_empty() {
            continue;
        }
        let owned = Some(value.to_string());
        match key {
            "White" => headers.white = value.to_string(),
            "Black" => headers.black = value.to_string(),
            "Result" => headers.result = value.to_string(),
            "WhiteElo" => headers.white_elo = value.parse().ok(),
            "BlackElo" => headers.black_elo = value.parse().ok(),
            "Date" => headers.date = owned,
            "TimeControl" => headers.time_control = owned,
            "ECO" => headers.eco = owned,
            "ECOUrl" => headers.eco_url = owned,
            "Termination" => headers.termination = owned,
            "Event" => headers.event = owned,
            "Link" => headers.link = owned,
            _ => {}
        }
    }

    headers
}
