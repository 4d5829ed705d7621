//! Probability mass functions over the `2^n` population words.
//!
//! - [`empirical_distribution`]: observed word frequencies
//! - [`independent_distribution`]: exact factorized model from marginals
//!
//! Both are indexed by word value, as is the Ising model's distribution.

mod empirical;
mod independent;

pub use empirical::empirical_distribution;
pub use independent::{independent_distribution, independent_from_codes};

use serde::{Deserialize, Serialize};

use crate::codes::state_space::{check_bits, state_count, Word, MAX_WORD_BITS};
use crate::error::{NetstateError, Result};

/// A PMF over all `2^n` words; entry `w` is the probability of word `w`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    nbits: usize,
    p: Vec<f64>,
}

impl Distribution {
    /// Wrap probabilities for `nbits`-bit words.
    ///
    /// The length must be exactly `2^nbits`. Normalization is the caller's
    /// responsibility; see [`Distribution::total`].
    pub fn new(nbits: usize, p: Vec<f64>) -> Result<Self> {
        check_bits(nbits, MAX_WORD_BITS)?;
        if p.len() != state_count(nbits) {
            return Err(NetstateError::MismatchedInput(format!(
                "{} probabilities for {nbits} bits, expected {}",
                p.len(),
                state_count(nbits)
            )));
        }
        Ok(Self { nbits, p })
    }

    /// Uniform distribution over all words.
    ///
    /// `max_bits` caps the allocation.
    pub fn uniform(nbits: usize, max_bits: usize) -> Result<Self> {
        check_bits(nbits, max_bits)?;
        let len = state_count(nbits);
        Ok(Self {
            nbits,
            p: vec![1.0 / len as f64; len],
        })
    }

    /// Word length.
    pub fn nbits(&self) -> usize {
        self.nbits
    }

    /// Number of words (`2^n`).
    pub fn len(&self) -> usize {
        self.p.len()
    }

    /// Never true: zero bits still has one word.
    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }

    /// Probabilities in word order.
    pub fn probabilities(&self) -> &[f64] {
        &self.p
    }

    /// Probability of word `w`.
    pub fn get(&self, w: Word) -> f64 {
        self.p[w]
    }

    /// Sum of all entries.
    pub fn total(&self) -> f64 {
        self.p.iter().sum()
    }

    /// Word with the highest probability (lowest word on ties).
    pub fn mode(&self) -> Word {
        self.p
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(best, best_p), (w, &p)| {
                if p > best_p {
                    (w, p)
                } else {
                    (best, best_p)
                }
            })
            .0
    }

    /// Consume into the raw probability vector.
    pub fn into_vec(self) -> Vec<f64> {
        self.p
    }
}
