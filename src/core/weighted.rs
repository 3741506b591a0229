/// Counted successor lists and the weighted draw over them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("cannot draw from a list whose total hit count is zero")]
    EmptyList,
}

/// One observed value together with how often it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedString {
    pub value: String,
    pub hits: u32,
}

/// Every value observed under one key, in first-seen order.
///
/// `total` always equals the sum of the entries' hits and values are
/// unique within the list. Both are maintained by [`CountedStringList::record`];
/// there is no way to insert or remove entries directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedStringList {
    entries: Vec<CountedString>,
    total: u32,
}

impl CountedStringList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more observation of `value`.
    pub fn record(&mut self, value: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.value == value) {
            entry.hits += 1;
        } else {
            self.entries.push(CountedString {
                value: value.to_string(),
                hits: 1,
            });
        }
        self.total += 1;
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn entries(&self) -> &[CountedString] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hit count recorded for `value`, if it was ever observed.
    pub fn hits(&self, value: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.hits)
    }

    /// The entry with the most hits. Ties go to the earliest entry.
    pub fn heaviest(&self) -> Option<&CountedString> {
        self.entries
            .iter()
            .rev()
            .max_by_key(|e| e.hits)
    }

    /// Weighted draw: each value is returned with probability `hits / total`.
    ///
    /// A number in `[1, total]` is drawn and walked down the entries, so the
    /// entries partition the range into contiguous slices sized by their hits.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str, SampleError> {
        if self.total == 0 {
            return Err(SampleError::EmptyList);
        }

        let mut index = rng.gen_range(1..=self.total);
        for entry in &self.entries {
            if index <= entry.hits {
                return Ok(&entry.value);
            }
            index -= entry.hits;
        }

        // Unreachable while total == sum of hits.
        Err(SampleError::EmptyList)
    }
}
