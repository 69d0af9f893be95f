//! Opening-name normalization and merging.
//!
//! Pure string rules shared by index construction and resolver output.

use std::collections::BTreeMap;

use serde::Serialize;

/// Trailing words dropped by [`strip_suffix`].
pub const SUFFIX_WORDS: &[&str] = &["Opening", "Game", "Gambit", "Defense", "Attack", "Variation"];

/// Words marking a name as the generic family name.
pub const GENERIC_KEYWORDS: &[&str] = &["game", "opening", "defense", "defence"];

/// Name up to the first `:`, `,` or `|`, trimmed.
///
/// `"Italian Game: Classical Variation"` -> `"Italian Game"`.
pub fn base_name(name: &str) -> &str {
    name.split([':', ',', '|']).next().unwrap_or_default().trim()
}

/// Drop trailing family words while the name has more than two words.
///
/// Two-word names such as "Sicilian Defense" are kept as they are; longer
/// ones lose the suffix ("King's Pawn Game" -> "King's Pawn"). Runs of
/// whitespace collapse to one space.
pub fn strip_suffix(name: &str) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    while words.len() > 2
        && words
            .last()
            .is_some_and(|last| SUFFIX_WORDS.iter().any(|w| w.eq_ignore_ascii_case(last)))
    {
        words.pop();
    }
    words.join(" ")
}

/// Normalized form returned to callers: base name with the suffix rule applied.
pub fn display_name(name: &str) -> String {
    strip_suffix(base_name(name))
}

/// True if any word of the name is one of [`GENERIC_KEYWORDS`].
pub fn has_generic_keyword(name: &str) -> bool {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|word| GENERIC_KEYWORDS.contains(&word))
}

/// Readable opening hint from an opening URL: last path segment with `-` and
/// `.` turned into spaces.
pub fn hint_from_eco_url(url: &str) -> Option<String> {
    let segment = url.trim().trim_end_matches('/').rsplit('/').next()?;
    let segment = segment.split(['?', '#']).next().unwrap_or_default();
    let hint = segment
        .replace(['-', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if hint.is_empty() { None } else { Some(hint) }
}

/// Lowercased words with punctuation removed, for loose comparisons
/// (`"King's Pawn"` and `"Kings-Pawn"` compare equal).
pub fn comparable_words(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == '-')
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// One group of near-duplicate names collapsed into a representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedName {
    pub name: String,
    pub count: usize,
    /// Every input name folded into this entry, representative included.
    pub members: Vec<String>,
}

/// Fold names sharing their first word (case-insensitive) into one entry.
///
/// The representative is a member containing a generic keyword if there is
/// one, otherwise the most frequent member; remaining ties go to the shorter,
/// then alphabetically first name. Counts are summed. Output is ordered by
/// count, highest first, then by name.
pub fn merge_similar<I, S>(counts: I) -> Vec<MergedName>
where
    I: IntoIterator<Item = (S, usize)>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for (name, count) in counts {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        let key = name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        *groups.entry(key).or_default().entry(name.to_string()).or_default() += count;
    }

    let mut merged: Vec<MergedName> = groups
        .into_values()
        .filter_map(|members| {
            let representative = members
                .iter()
                .max_by(|(a, ca), (b, cb)| {
                    has_generic_keyword(a)
                        .cmp(&has_generic_keyword(b))
                        .then(ca.cmp(cb))
                        .then(b.len().cmp(&a.len()))
                        .then(b.cmp(a))
                })
                .map(|(name, _)| name.clone())?;

            Some(MergedName {
                name: representative,
                count: members.values().sum(),
                members: members.into_keys().collect(),
            })
        })
        .collect();

    merged.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    merged
}
