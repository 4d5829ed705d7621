//! Integer/bit-vector conversions over the `2^n` population state space.
//!
//! Bit `i` of a word is neuron `i` of the code matrix (row 0 is the least
//! significant bit). Every `2^n`-length array in the crate is indexed by the
//! word value under this convention, and `TruthTable` row `w` is word `w`.

use crate::error::{NetstateError, Result};

/// A population word: one code-matrix column read as an integer.
pub type Word = usize;

/// Largest word length representable as a [`Word`].
pub const MAX_WORD_BITS: usize = usize::BITS as usize - 1;

/// Encode a bit vector as `sum(bit_i * 2^i)`.
///
/// Any non-zero entry counts as a set bit. Bits past the width of a
/// [`Word`] are dropped.
pub fn int_from_bits(bits: &[u8]) -> Word {
    bits.iter()
        .enumerate()
        .filter(|(_, &bit)| bit != 0)
        .fold(0, |word, (i, _)| word | shifted_one(i))
}

/// Decode `word` into `n` bits, zero-padded, least significant first.
///
/// Positions past the width of a [`Word`] are always 0.
pub fn bits_from_int(word: Word, n: usize) -> Vec<u8> {
    (0..n)
        .map(|i| {
            u32::try_from(i)
                .ok()
                .and_then(|shift| word.checked_shr(shift))
                .map_or(0, |w| (w & 1) as u8)
        })
        .collect()
}

/// `1 << i`, or 0 when `i` is past the word width.
#[inline]
fn shifted_one(i: usize) -> Word {
    u32::try_from(i)
        .ok()
        .and_then(|shift| (1 as Word).checked_shl(shift))
        .unwrap_or(0)
}

/// Number of states for `n` bits.
///
/// Saturates at `usize::MAX` past [`MAX_WORD_BITS`]; bound `n` with
/// [`check_bits`] before allocating.
#[inline]
pub fn state_count(n: usize) -> usize {
    if n > MAX_WORD_BITS {
        usize::MAX
    } else {
        1 << n
    }
}

/// Reject word lengths above `max`.
pub fn check_bits(n: usize, max: usize) -> Result<()> {
    let max = max.min(MAX_WORD_BITS);
    if n > max {
        return Err(NetstateError::TooManyBits { bits: n, max });
    }
    Ok(())
}

/// All `2^n` bit vectors, row `w` holding the bits of word `w`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    nbits: usize,
    bits: Vec<u8>,
}

impl TruthTable {
    /// Number of bits per row.
    pub fn nbits(&self) -> usize {
        self.nbits
    }

    /// Number of rows (`2^n`).
    pub fn len(&self) -> usize {
        state_count(self.nbits)
    }

    /// Never true: the zero-bit table still holds the empty word.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bits of word `w`.
    pub fn row(&self, w: Word) -> &[u8] {
        &self.bits[w * self.nbits..(w + 1) * self.nbits]
    }

    /// Rows in word order.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.len()).map(move |w| self.row(w))
    }
}

/// Build the full truth table for `n` bits.
///
/// Callers must have bounded `n` (see [`check_bits`]); the table holds
/// `n * 2^n` bytes.
pub fn full_truth_table(n: usize) -> TruthTable {
    assert!(n <= MAX_WORD_BITS, "word length {n} is not representable");
    let rows = state_count(n);
    let mut bits = Vec::with_capacity(rows * n);
    for word in 0..rows {
        for i in 0..n {
            bits.push(((word >> i) & 1) as u8);
        }
    }
    TruthTable { nbits: n, bits }
}
