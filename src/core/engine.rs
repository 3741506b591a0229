/// Character-budgeted text generation over a [`Generator`]'s models.
///
/// Generation walks the chain one token at a time. It ends when the current
/// prefix has no recorded continuation, or when the next drawn word would
/// not fit in the remaining character budget. Every emitted word costs at
/// least one character, so a run takes at most `char_limit` steps.

use log::debug;
use rand::Rng;

use crate::core::generator::{Generator, GeneratorError};
use crate::core::model::PrefixKey;
use crate::core::weighted::CountedStringList;
use crate::schema::config::UnseenPrefixPolicy;

/// Why a generation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The prefix was never followed by anything in the corpus.
    UnseenPrefix,
    /// The drawn word does not fit in the remaining budget.
    BudgetExhausted,
}

/// Outcome of a single chain step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Emit {
        /// The word to append, as it should appear in the output.
        word: String,
        /// The chain state after this word.
        prefix: String,
        /// Characters left after paying for the word and its space.
        remaining: usize,
    },
    Terminate(Termination),
}

impl Generator {
    /// Generate one text starting from a random opening prefix.
    pub fn generate_text<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, GeneratorError> {
        let prefix = self.random_prefix(rng)?;
        self.generate_from_prefix(prefix.as_str(), rng)
    }

    /// Generate `count` independent texts.
    pub fn generate_batch<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, GeneratorError> {
        (0..count).map(|_| self.generate_text(rng)).collect()
    }

    /// Generate one text starting from `prefix`.
    ///
    /// The prefix is emitted first and its length is charged against the
    /// budget. In canonical mode each of its tokens is rendered through a
    /// drawn representation, falling back to the token itself. A prefix
    /// longer than the whole budget is still returned, with nothing after it.
    pub fn generate_from_prefix<R: Rng + ?Sized>(
        &self,
        prefix: &str,
        rng: &mut R,
    ) -> Result<String, GeneratorError> {
        if self.data().is_empty() && self.beginnings().is_empty() {
            return Err(GeneratorError::EmptyModel);
        }

        debug!("generating text from prefix \"{}\"", prefix);

        let mut result: Vec<String> = if self.is_canonical() {
            prefix
                .split(' ')
                .map(|token| self.represent(token, rng))
                .collect::<Result<_, _>>()?
        } else {
            vec![prefix.to_string()]
        };

        let seed_len = result.iter().map(|w| char_len(w)).sum::<usize>() + result.len() - 1;
        let mut remaining = self.char_limit().saturating_sub(seed_len);
        let mut current = prefix.to_string();

        loop {
            match self.pop_next_word(&current, remaining, rng)? {
                Step::Emit {
                    word,
                    prefix,
                    remaining: left,
                } => {
                    debug!("new prefix is \"{}\", {} characters remain", prefix, left);
                    result.push(word);
                    current = prefix;
                    remaining = left;
                }
                Step::Terminate(reason) => {
                    debug!("terminating run: {:?}", reason);
                    break;
                }
            }
        }

        Ok(result.join(" "))
    }

    /// Advance the chain by one word from `prefix` with `limit` characters
    /// left.
    ///
    /// A word costs its length plus one for the joining space. The returned
    /// prefix advances by the drawn canonical token, not by its surface
    /// spelling, so in canonical mode the chain keeps matching model keys.
    pub fn pop_next_word<R: Rng + ?Sized>(
        &self,
        prefix: &str,
        limit: usize,
        rng: &mut R,
    ) -> Result<Step, GeneratorError> {
        let (state, candidates) = match self.data().get(prefix) {
            Some(list) => (PrefixKey::from(prefix), list),
            None => match self.reroll(rng)? {
                Some(restart) => restart,
                None => {
                    debug!("prefix \"{}\" has no continuation", prefix);
                    return Ok(Step::Terminate(Termination::UnseenPrefix));
                }
            },
        };

        let successor = candidates.draw(rng)?;
        debug!("drew \"{}\" as successor to \"{}\"", successor, state);

        let word = if self.is_canonical() {
            let rep = self.represent(successor, rng)?;
            debug!("\"{}\" is represented by \"{}\"", successor, rep);
            rep
        } else {
            successor.to_string()
        };

        let cost = char_len(&word) + 1;
        if cost > limit {
            debug!("\"{}\" exceeds the {} characters left", word, limit);
            return Ok(Step::Terminate(Termination::BudgetExhausted));
        }

        Ok(Step::Emit {
            prefix: state.shift(successor).0,
            word,
            remaining: limit - cost,
        })
    }

    /// A uniformly chosen opening prefix. Openings seen more often are
    /// proportionally more likely since duplicates are kept.
    pub fn random_prefix<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&PrefixKey, GeneratorError> {
        if self.beginnings().is_empty() {
            return Err(GeneratorError::EmptyModel);
        }
        let index = rng.gen_range(0..self.beginnings().len());
        Ok(&self.beginnings()[index])
    }

    /// Under the re-roll policy, maybe restart from a random opening that
    /// has continuations.
    fn reroll<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Option<(PrefixKey, &CountedStringList)>, GeneratorError> {
        let UnseenPrefixPolicy::Reroll { probability } = self.unseen_prefix_policy() else {
            return Ok(None);
        };
        if self.beginnings().is_empty() || !rng.gen_bool(probability) {
            return Ok(None);
        }

        let restart = self.random_prefix(rng)?;
        debug!("re-rolling from opening \"{}\"", restart);
        Ok(self
            .data()
            .get(restart.as_str())
            .map(|list| (restart.clone(), list)))
    }

    /// Draw a surface spelling for a canonical token, or the token itself
    /// when none was recorded.
    fn represent<R: Rng + ?Sized>(&self, token: &str, rng: &mut R) -> Result<String, GeneratorError> {
        match self.reps().get(token) {
            Some(list) => Ok(list.draw(rng)?.to_string()),
            None => Ok(token.to_string()),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::config::GeneratorConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator(prefix_len: usize, char_limit: usize) -> Generator {
        Generator::new(prefix_len, char_limit).unwrap()
    }

    #[test]
    fn single_seed_reproduces_itself() {
        let mut gen = generator(2, 140);
        gen.add_seeds("today is a great day to be alive");
        let mut rng = StdRng::seed_from_u64(42);

        let text = gen.generate_from_prefix("today is", &mut rng).unwrap();
        assert_eq!(text, "today is a great day to be alive");
    }

    #[test]
    fn generate_text_on_empty_generator_fails() {
        let gen = generator(1, 140);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            gen.generate_text(&mut rng),
            Err(GeneratorError::EmptyModel)
        ));
        assert!(matches!(
            gen.generate_from_prefix("anything", &mut rng),
            Err(GeneratorError::EmptyModel)
        ));
    }

    #[test]
    fn pop_next_word_on_unseen_prefix_terminates() {
        let mut gen = generator(2, 140);
        gen.add_seeds("today is a great day");
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            gen.pop_next_word("never seen", 100, &mut rng).unwrap(),
            Step::Terminate(Termination::UnseenPrefix)
        );
    }

    #[test]
    fn pop_next_word_respects_budget() {
        let mut gen = generator(1, 140);
        gen.add_seeds("a longword");
        let mut rng = StdRng::seed_from_u64(3);

        // "longword" plus its space is nine characters.
        assert_eq!(
            gen.pop_next_word("a", 8, &mut rng).unwrap(),
            Step::Terminate(Termination::BudgetExhausted)
        );
        assert_eq!(
            gen.pop_next_word("a", 9, &mut rng).unwrap(),
            Step::Emit {
                word: "longword".to_string(),
                prefix: "longword".to_string(),
                remaining: 0,
            }
        );
    }

    #[test]
    fn pop_next_word_shifts_prefix() {
        let mut gen = generator(2, 140);
        gen.add_seeds("one two three");
        let mut rng = StdRng::seed_from_u64(5);
        match gen.pop_next_word("one two", 50, &mut rng).unwrap() {
            Step::Emit {
                word,
                prefix,
                remaining,
            } => {
                assert_eq!(word, "three");
                assert_eq!(prefix, "two three");
                assert_eq!(remaining, 44);
            }
            other => panic!("expected a word, got {:?}", other),
        }
    }

    #[test]
    fn seed_is_charged_against_budget() {
        let mut gen = generator(1, 12);
        gen.add_seeds("hello big world");
        let mut rng = StdRng::seed_from_u64(9);

        // "hello" (5) + " big" (4) leaves 3, too few for " world".
        let text = gen.generate_from_prefix("hello", &mut rng).unwrap();
        assert_eq!(text, "hello big");
    }

    #[test]
    fn oversized_seed_is_returned_alone() {
        let mut gen = generator(2, 5);
        gen.add_seeds("lengthy opening words follow");
        let mut rng = StdRng::seed_from_u64(9);
        let text = gen.generate_from_prefix("lengthy opening", &mut rng).unwrap();
        assert_eq!(text, "lengthy opening");
    }

    #[test]
    fn output_never_exceeds_limit() {
        let mut gen = generator(1, 40);
        gen.add_corpus(
            "the cat sat on the mat\n\
             the dog ate the cat food\n\
             a cat and a dog sat together on the mat again",
        );
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let text = gen.generate_text(&mut rng).unwrap();
            assert!(text.chars().count() <= 40, "too long: {}", text);
        }
    }

    #[test]
    fn canonical_generation_uses_representations() {
        let mut gen = generator(1, 140);
        gen.canonicalize_sources();
        gen.add_seeds("HELLO World");
        let mut rng = StdRng::seed_from_u64(2);

        let text = gen.generate_from_prefix("hello", &mut rng).unwrap();
        assert_eq!(text, "HELLO World");
    }

    #[test]
    fn canonical_generation_follows_canonical_chain() {
        let mut gen = generator(1, 140);
        gen.canonicalize_sources();
        gen.add_seeds("Stop. Right. THERE!");
        let mut rng = StdRng::seed_from_u64(2);

        let text = gen.generate_text(&mut rng).unwrap();
        assert_eq!(text, "Stop. Right. THERE!");
    }

    #[test]
    fn canonical_seed_falls_back_to_raw_token() {
        let mut gen = generator(1, 140);
        gen.canonicalize_sources();
        gen.add_seeds("Hello there");
        let mut rng = StdRng::seed_from_u64(2);

        let text = gen.generate_from_prefix("unknown", &mut rng).unwrap();
        assert_eq!(text, "unknown");
    }

    #[test]
    fn reroll_never_restarts_at_zero_probability() {
        let config = GeneratorConfig {
            prefix_len: 1,
            unseen_prefix: UnseenPrefixPolicy::Reroll { probability: 0.0 },
            ..GeneratorConfig::default()
        };
        let mut gen = Generator::from_config(&config).unwrap();
        gen.add_seeds("start middle end");
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(
            gen.pop_next_word("nowhere", 100, &mut rng).unwrap(),
            Step::Terminate(Termination::UnseenPrefix)
        );
    }

    #[test]
    fn reroll_always_restarts_at_full_probability() {
        let config = GeneratorConfig {
            prefix_len: 1,
            unseen_prefix: UnseenPrefixPolicy::Reroll { probability: 1.0 },
            ..GeneratorConfig::default()
        };
        let mut gen = Generator::from_config(&config).unwrap();
        gen.add_seeds("start middle end");
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(
            gen.pop_next_word("nowhere", 100, &mut rng).unwrap(),
            Step::Emit {
                word: "middle".to_string(),
                prefix: "middle".to_string(),
                remaining: 93,
            }
        );
    }

    #[test]
    fn reroll_runs_stay_within_budget() {
        let config = GeneratorConfig {
            prefix_len: 1,
            char_limit: 60,
            unseen_prefix: UnseenPrefixPolicy::Reroll { probability: 1.0 },
            ..GeneratorConfig::default()
        };
        let mut gen = Generator::from_config(&config).unwrap();
        gen.add_seeds("start middle end");
        let mut rng = StdRng::seed_from_u64(8);

        let text = gen.generate_text(&mut rng).unwrap();
        assert!(text.chars().count() <= 60);
        assert!(text.starts_with("start middle end"));
    }

    #[test]
    fn generate_batch_produces_count_texts() {
        let mut gen = generator(1, 140);
        gen.add_seeds("just one line");
        let mut rng = StdRng::seed_from_u64(6);
        let texts = gen.generate_batch(4, &mut rng).unwrap();
        assert_eq!(texts.len(), 4);
        assert!(texts.iter().all(|t| t == "just one line"));
    }

    #[test]
    fn same_seed_same_text() {
        let mut gen = generator(1, 140);
        gen.add_corpus("a b c a c b a\nb a c c a b\nc c a b a");
        let mut rng1 = StdRng::seed_from_u64(99);
        let mut rng2 = StdRng::seed_from_u64(99);
        assert_eq!(
            gen.generate_text(&mut rng1).unwrap(),
            gen.generate_text(&mut rng2).unwrap()
        );
    }
}
