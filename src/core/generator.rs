/// The generator: configuration, frequency models, and corpus ingestion.
///
/// Text generation over these models lives in [`crate::core::engine`].

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::canon::{canonicalize, strip_reply};
use crate::core::model::{CanonicalToken, PrefixKey, PrefixModel, RepresentationModel};
use crate::core::weighted::SampleError;
use crate::schema::config::{ConfigError, GeneratorConfig, UnseenPrefixPolicy};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no seeds have been ingested yet")]
    EmptyModel,
    #[error("sampling error: {0}")]
    Sampling(#[from] SampleError),
}

/// A weighted Markov chain over whitespace-separated tokens.
///
/// Writes (`add_seeds`, `canonicalize_sources`) take `&mut self` and reads
/// take `&self`; share one across threads behind a lock or clone a snapshot.
///
/// Deserialized snapshots go through the same validation as
/// [`Generator::from_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GeneratorSnapshot")]
pub struct Generator {
    prefix_len: usize,
    char_limit: usize,
    /// Prefix → continuation token.
    data: PrefixModel,
    /// Canonical token → surface spelling. Only filled in canonical mode.
    reps: RepresentationModel,
    /// Opening prefix of every ingested line, duplicates kept.
    beginnings: Vec<PrefixKey>,
    canon: bool,
    unseen_prefix: UnseenPrefixPolicy,
}

/// Wire form of a [`Generator`], checked before it becomes one.
#[derive(Deserialize)]
struct GeneratorSnapshot {
    prefix_len: usize,
    char_limit: usize,
    data: PrefixModel,
    reps: RepresentationModel,
    beginnings: Vec<PrefixKey>,
    canon: bool,
    unseen_prefix: UnseenPrefixPolicy,
}

impl TryFrom<GeneratorSnapshot> for Generator {
    type Error = ConfigError;

    fn try_from(snapshot: GeneratorSnapshot) -> Result<Self, Self::Error> {
        GeneratorConfig {
            prefix_len: snapshot.prefix_len,
            char_limit: snapshot.char_limit,
            canonical: snapshot.canon,
            unseen_prefix: snapshot.unseen_prefix,
        }
        .validate()?;

        Ok(Self {
            prefix_len: snapshot.prefix_len,
            char_limit: snapshot.char_limit,
            data: snapshot.data,
            reps: snapshot.reps,
            beginnings: snapshot.beginnings,
            canon: snapshot.canon,
            unseen_prefix: snapshot.unseen_prefix,
        })
    }
}

impl Generator {
    /// A generator with the given prefix length and character budget.
    pub fn new(prefix_len: usize, char_limit: usize) -> Result<Self, GeneratorError> {
        Self::from_config(&GeneratorConfig::new(prefix_len, char_limit))
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        config.validate()?;
        Ok(Self {
            prefix_len: config.prefix_len,
            char_limit: config.char_limit,
            data: PrefixModel::new(),
            reps: RepresentationModel::new(),
            beginnings: Vec::new(),
            canon: config.canonical,
            unseen_prefix: config.unseen_prefix,
        })
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    pub fn char_limit(&self) -> usize {
        self.char_limit
    }

    pub fn data(&self) -> &PrefixModel {
        &self.data
    }

    pub fn reps(&self) -> &RepresentationModel {
        &self.reps
    }

    pub fn beginnings(&self) -> &[PrefixKey] {
        &self.beginnings
    }

    pub fn is_canonical(&self) -> bool {
        self.canon
    }

    pub fn unseen_prefix_policy(&self) -> UnseenPrefixPolicy {
        self.unseen_prefix
    }

    /// Switch to canonical mode: later seeds are keyed by their canonical
    /// tokens and every surface spelling is kept in the representation model.
    ///
    /// Calling this after seeds were already added leaves those seeds keyed
    /// by their literal tokens, so the model mixes both forms. Callers that
    /// want a purely canonical model must call this before the first seed.
    pub fn canonicalize_sources(&mut self) {
        self.canon = true;
    }

    /// Add one line of text to the model.
    ///
    /// Leading reply mentions are stripped, the rest is split on single
    /// spaces, and every `prefix_len`-token window followed by another
    /// token is counted once.
    pub fn add_seeds(&mut self, input: &str) {
        let mut tokens = tokenize(strip_reply(input));

        if self.canon {
            for token in tokens.iter_mut() {
                let canon = canonicalize(token);
                self.reps.record(CanonicalToken(canon.clone()), token);
                *token = canon;
            }
        }

        if tokens.len() >= self.prefix_len {
            self.beginnings
                .push(PrefixKey::from_tokens(&tokens[..self.prefix_len]));
        }

        let mut rest = &tokens[..];
        while rest.len() > self.prefix_len {
            let prefix = PrefixKey::from_tokens(&rest[..self.prefix_len]);
            self.data.record(prefix, &rest[self.prefix_len]);
            rest = &rest[1..];
        }

        trace!(
            "ingested {} tokens; {} prefixes, {} beginnings",
            tokens.len(),
            self.data.len(),
            self.beginnings.len()
        );
    }

    /// Add every non-blank line of `corpus` as its own seed. Returns the
    /// number of lines ingested.
    pub fn add_corpus(&mut self, corpus: &str) -> usize {
        let mut count = 0;
        for line in corpus.lines().filter(|l| !l.trim().is_empty()) {
            self.add_seeds(line);
            count += 1;
        }
        count
    }
}

/// Split on single spaces. The empty string has no tokens.
fn tokenize(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    input.split(' ').map(str::to_string).collect()
}
