//! Next-letter prediction over a word list

use rand::Rng;

use crate::{
    agent::Agent,
    approximator::ValueApproximator,
    encoding::{ALPHABET_SIZE, ScalarIndexEncoder, StateEncoder, StateVector, letter_at, letter_index},
    error::{Error, Result},
    ports::{Environment, Step},
};

/// Walks every adjacent letter pair of every word.
///
/// The state is the current letter, the action is the guessed next letter.
/// A right guess pays `hit_reward`, a wrong one `miss_reward`. Either way the
/// chain moves on to the true next letter; one episode is one pass over all
/// words.
#[derive(Debug, Clone)]
pub struct LetterChain {
    words: Vec<Vec<usize>>,
    word: usize,
    position: usize,
    hit_reward: f64,
    miss_reward: f64,
}

impl LetterChain {
    /// Build a chain from `words`, keeping only ASCII letters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCorpus`] when no word has two letters.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<Vec<usize>> = words
            .into_iter()
            .map(|word| word.as_ref().chars().filter_map(letter_index).collect::<Vec<_>>())
            .filter(|letters| letters.len() >= 2)
            .collect();
        if words.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        Ok(Self {
            words,
            word: 0,
            position: 0,
            hit_reward: 10.0,
            miss_reward: -1.0,
        })
    }

    /// Number of guesses in one episode.
    pub fn pair_count(&self) -> usize {
        self.words.iter().map(|word| word.len() - 1).sum()
    }

    fn current(&self) -> usize {
        self.words[self.word][self.position]
    }

    /// Greedily extend `start` by `length` letters.
    pub fn generate<A, R>(agent: &Agent<A, R>, start: char, length: usize) -> Result<String>
    where
        A: ValueApproximator,
        R: Rng,
    {
        let mut letter = letter_index(start).unwrap_or(0);
        let mut text = String::with_capacity(length + 1);
        text.push(letter_at(letter));
        for _ in 0..length {
            letter = agent.greedy_action(&ScalarIndexEncoder.encode(&letter))?;
            text.push(letter_at(letter));
        }
        Ok(text)
    }
}

impl Environment for LetterChain {
    fn action_count(&self) -> usize {
        ALPHABET_SIZE
    }

    fn state_size(&self) -> usize {
        ScalarIndexEncoder.state_size()
    }

    fn reset(&mut self) -> StateVector {
        self.word = 0;
        self.position = 0;
        self.state()
    }

    fn state(&self) -> StateVector {
        ScalarIndexEncoder.encode(&self.current())
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        if action >= ALPHABET_SIZE {
            return Err(Error::UnknownActionIndex {
                index: action,
                count: ALPHABET_SIZE,
            });
        }
        let next = self.words[self.word][self.position + 1];
        let hit = action == next;

        self.position += 1;
        let mut done = false;
        if self.position + 1 == self.words[self.word].len() {
            self.position = 0;
            self.word += 1;
            if self.word == self.words.len() {
                self.word = 0;
                done = true;
            }
        }

        Ok(Step {
            next_state: ScalarIndexEncoder.encode(&next),
            reward: if hit { self.hit_reward } else { self.miss_reward },
            terminal: false,
            done,
            success: hit,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;

    use super::*;
    use crate::{
        app::AgentConfig,
        approximator::{Mlp, NetworkConfig},
    };

    #[test]
    fn test_walks_pairs_within_words() {
        let mut chain = LetterChain::new(["ab", "cde"]).unwrap();
        assert_eq!(chain.pair_count(), 3);
        assert_eq!(chain.reset(), vec![0.0]);

        let step = chain.step(1).unwrap();
        assert_eq!(step.reward, 10.0);
        assert_eq!(step.next_state, vec![1.0]);
        assert!(!step.done);
        // word boundary: next guess starts from 'c', not 'b'
        assert_eq!(chain.state(), vec![2.0]);

        let step = chain.step(0).unwrap();
        assert_eq!(step.reward, -1.0);
        assert_eq!(step.next_state, vec![3.0]);

        let step = chain.step(4).unwrap();
        assert!(step.done && step.success && !step.terminal);
        assert_eq!(chain.state(), vec![0.0]);
    }

    #[test]
    fn test_rejects_words_without_pairs() {
        assert!(matches!(LetterChain::new(["a", "1", ""]), Err(Error::EmptyCorpus)));
        assert!(LetterChain::new(["a", "ok"]).is_ok());
    }

    #[test]
    fn test_generate_length() {
        let approximator = Mlp::new(1, 26, NetworkConfig::new(vec![8], 0.01).with_seed(1)).unwrap();
        let agent: Agent<Mlp, StdRng> =
            Agent::new(approximator, &AgentConfig::new().with_seed(1)).unwrap();
        let text = LetterChain::generate(&agent, 'h', 5).unwrap();
        assert_eq!(text.len(), 6);
        assert!(text.starts_with('h'));
        assert!(text.chars().all(|c| c.is_ascii_lowercase()));
    }
}
