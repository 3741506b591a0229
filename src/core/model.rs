/// Frequency tables: key → counted list of what was observed under that key.
///
/// The suffix table and the representation table share one implementation
/// but store distinct key newtypes, so inserting a canonical token into the
/// prefix table (or the other way round) does not type-check. Lookups take a
/// plain `&str` through `Borrow<str>`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use crate::core::weighted::CountedStringList;

/// A chain state: `prefix_len` tokens joined by single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixKey(pub String);

/// A token in canonical (lowercase, punctuation-free) form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalToken(pub String);

impl PrefixKey {
    /// Join tokens into a key.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let parts: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        Self(parts.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the key back into its tokens.
    pub fn tokens(&self) -> std::str::Split<'_, char> {
        self.0.split(' ')
    }

    /// Drop the first token and append `next`, keeping the window length.
    pub fn shift(&self, next: &str) -> Self {
        let mut parts: Vec<&str> = self.tokens().skip(1).collect();
        parts.push(next);
        Self(parts.join(" "))
    }
}

impl CanonicalToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PrefixKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrefixKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CanonicalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrefixKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for CanonicalToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Map from a key to the counted values observed under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize + Eq + Hash",
    deserialize = "K: Deserialize<'de> + Eq + Hash"
))]
pub struct FrequencyTable<K> {
    lists: FxHashMap<K, CountedStringList>,
}

/// Prefix → continuation token.
pub type PrefixModel = FrequencyTable<PrefixKey>;

/// Canonical token → observed surface spelling.
pub type RepresentationModel = FrequencyTable<CanonicalToken>;

impl<K: Eq + Hash> PartialEq for FrequencyTable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.lists == other.lists
    }
}

impl<K: Eq + Hash> Eq for FrequencyTable<K> {}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            lists: FxHashMap::default(),
        }
    }
}

impl<K> FrequencyTable<K>
where
    K: Eq + Hash + Borrow<str>,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of `value` under `key`.
    pub fn record(&mut self, key: K, value: &str) {
        self.lists.entry(key).or_default().record(value);
    }

    pub fn get(&self, key: &str) -> Option<&CountedStringList> {
        self.lists.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lists.contains_key(key)
    }

    /// Hits recorded for `value` under `key`.
    pub fn hits(&self, key: &str, value: &str) -> Option<u32> {
        self.get(key)?.hits(value)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Number of distinct (key, value) pairs.
    pub fn pair_count(&self) -> usize {
        self.lists.values().map(CountedStringList::len).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.lists.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &CountedStringList)> {
        self.lists.iter()
    }
}
