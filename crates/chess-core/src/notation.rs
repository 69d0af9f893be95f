//! Movetext parser: notation text -> recursive list of move tokens.
//!
//! Accepts a full PGN game or bare movetext. Tag pairs, comments, NAGs,
//! annotation glyphs, move numbers and result markers are dropped. A
//! parenthesised variation attaches to the move it follows and is an
//! alternative to that move.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use shakmaty::san::SanPlus;

use crate::error::NotationError;

/// One move of a line, with the alternatives recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveToken {
    pub text: String,
    pub variations: Vec<Vec<MoveToken>>,
}

impl MoveToken {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            variations: Vec::new(),
        }
    }
}

/// Deepest variation nesting accepted in one game.
pub const MAX_VARIATION_DEPTH: usize = 256;

static LEXEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
          (?P<tag>\[(?:[^\]"\\]|\\.|"(?:[^"\\]|\\.)*")*\])
        | (?P<comment>\{[^}]*\})
        | (?P<line_comment>;[^\n]*)
        | (?P<open>\()
        | (?P<close>\))
        | (?P<nag>\$\d+)
        | (?P<result>1-0|0-1|1/2-1/2|\*)
        | (?P<number>\d+\.+)
        | (?P<word>[^\s(){};\[\]$]+)
        "#,
    )
    .unwrap()
});

#[derive(Debug)]
enum Lexeme {
    Move { text: String },
    Open { offset: usize },
    Close { offset: usize },
}

/// Parse notation into the main line. Fails with [`NotationError::Empty`]
/// when no move is present.
pub fn parse_notation(text: &str) -> Result<Vec<MoveToken>, NotationError> {
    let main_line = parse_lines(lex(text)?)?;

    if main_line.is_empty() {
        return Err(NotationError::Empty);
    }
    Ok(main_line)
}

/// Move texts of the main line, in order.
pub fn main_line_moves(tokens: &[MoveToken]) -> Vec<String> {
    tokens.iter().map(|t| t.text.clone()).collect()
}

/// Total plies across the main line and every nested variation.
pub fn count_plies(tokens: &[MoveToken]) -> usize {
    tokens
        .iter()
        .map(|t| 1 + t.variations.iter().map(|v| count_plies(v)).sum::<usize>())
        .sum()
}

fn lex(text: &str) -> Result<Vec<Lexeme>, NotationError> {
    let mut lexemes = Vec::new();
    let mut last_end = 0;

    for caps in LEXEME_RE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        check_gap(text, last_end, whole.start())?;
        last_end = whole.end();

        if let Some(word) = caps.name("word") {
            let text = canonical_san(word.as_str())
                .ok_or_else(|| NotationError::parse(word.start(), word.as_str(), "not a move"))?;
            lexemes.push(Lexeme::Move { text });
        } else if caps.name("open").is_some() {
            lexemes.push(Lexeme::Open { offset: whole.start() });
        } else if caps.name("close").is_some() {
            lexemes.push(Lexeme::Close { offset: whole.start() });
        }
        // tags, comments, nags, numbers and results carry no moves
    }
    check_gap(text, last_end, text.len())?;

    Ok(lexemes)
}

/// Anything the lexer skipped over must be whitespace.
fn check_gap(text: &str, start: usize, end: usize) -> Result<(), NotationError> {
    let gap = &text[start..end];
    match gap.char_indices().find(|(_, c)| !c.is_whitespace()) {
        None => Ok(()),
        Some((i, c)) => {
            let reason = match c {
                '{' => "unterminated comment",
                '[' => "unterminated tag pair",
                _ => "unexpected character",
            };
            Err(NotationError::parse(start + i, &gap[i..], reason))
        }
    }
}

/// Canonical SAN for a movetext word, or `None` when it is not a move.
///
/// Glyphs are dropped, zero castling becomes `O-O` and promotions take `=`.
pub fn canonical_san(word: &str) -> Option<String> {
    let stripped = word.trim_end_matches(['!', '?']);
    let castles = match stripped.trim_end_matches(['+', '#']) {
        "0-0" => Some("O-O"),
        "0-0-0" => Some("O-O-O"),
        _ => None,
    };
    let candidate = match castles {
        Some(castle) => format!("{castle}{}", &stripped[stripped.trim_end_matches(['+', '#']).len()..]),
        None => stripped.to_string(),
    };

    let san: SanPlus = candidate.parse().ok()?;
    Some(san.to_string())
}

fn parse_lines(lexemes: Vec<Lexeme>) -> Result<Vec<MoveToken>, NotationError> {
    let mut line: Vec<MoveToken> = Vec::new();
    // Enclosing lines of the open variations, innermost last.
    let mut open: Vec<(usize, Vec<MoveToken>)> = Vec::new();

    for lexeme in lexemes {
        match lexeme {
            Lexeme::Move { text } => line.push(MoveToken::new(text)),
            Lexeme::Open { offset } => {
                if line.is_empty() {
                    return Err(NotationError::parse(
                        offset,
                        "(",
                        "variation without a preceding move",
                    ));
                }
                if open.len() == MAX_VARIATION_DEPTH {
                    return Err(NotationError::parse(offset, "(", "variation nesting too deep"));
                }
                open.push((offset, std::mem::take(&mut line)));
            }
            Lexeme::Close { offset } => {
                let Some((opened_at, outer)) = open.pop() else {
                    return Err(NotationError::parse(offset, ")", "unbalanced ')'"));
                };
                let variation = std::mem::replace(&mut line, outer);
                if variation.is_empty() {
                    return Err(NotationError::parse(opened_at, "()", "empty variation"));
                }
                if let Some(anchor) = line.last_mut() {
                    anchor.variations.push(variation);
                }
            }
        }
    }

    match open.last() {
        Some(&(offset, _)) => Err(NotationError::parse(offset, "(", "unclosed '('")),
        None => Ok(line),
    }
}
