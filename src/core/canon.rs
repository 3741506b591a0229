/// Token normalisation: reply stripping and canonical forms.

use regex::Regex;
use std::sync::LazyLock;

/// Characters that never survive canonicalisation, besides whitespace.
const STRIPPED: &[char] = &[
    '"', '\'', '[', ']', '(', ')', '.', ',', ';', ':', '{', '}', '|', '\\', '+', '=', '_',
    '-', '?', '<', '>', '!', '@', '#', '$', '%', '^', '&', '*',
];

/// A leading run of `@handle` mentions, optionally opened by a single `.`
/// ("public" replies such as `.@someone`).
static LEADING_MENTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\s*\.)?(?:\s*@[A-Za-z0-9_]+\s*)+").expect("mention pattern is valid")
});

/// Remove the reply mentions that open `text`.
///
/// `"@a @b hello"` and `".@a hello"` both become `"hello"`. Mentions after
/// the first ordinary word are left alone.
pub fn strip_reply(text: &str) -> &str {
    match LEADING_MENTIONS.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Canonical form of a single token: lowercased, with every punctuation
/// and whitespace character removed wherever it appears.
///
/// `"...really...?"` → `"really"`, `"then?ever)"` → `"thenever"`.
pub fn canonicalize(token: &str) -> String {
    token
        .chars()
        .filter(|c| !is_stripped(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_stripped(c: char) -> bool {
    c.is_whitespace() || STRIPPED.contains(&c)
}
