//! Observed word distribution.

use crate::codes::state_space::{check_bits, state_count};
use crate::codes::CodeMatrix;
use crate::error::{NetstateError, Result};

use super::Distribution;

/// Histogram the code matrix's words over `[0, 2^n)` and normalize.
///
/// The result always has `2^n` entries, including words that never occur.
/// `max_bits` caps the allocation.
pub fn empirical_distribution(codes: &CodeMatrix, max_bits: usize) -> Result<Distribution> {
    let nbits = codes.nneurons();
    check_bits(nbits, max_bits)?;
    if codes.nbins() == 0 {
        return Err(NetstateError::MismatchedInput(
            "cannot estimate a word distribution from zero bins".into(),
        ));
    }

    let mut counts = vec![0u64; state_count(nbits)];
    for word in codes.words()? {
        counts[word] += 1;
    }

    let total = codes.nbins() as f64;
    Distribution::new(nbits, counts.into_iter().map(|c| c as f64 / total).collect())
}
