//! Factorized (independent-neuron) word distribution.

use crate::codes::state_space::{check_bits, full_truth_table};
use crate::codes::CodeMatrix;
use crate::error::{NetstateError, Result};

use super::Distribution;

/// Exact independent-model PMF from per-neuron firing probabilities.
///
/// `P(w) = prod_i (p_i if bit i of w is set else 1 - p_i)`. This is analytic,
/// so the result sums to 1 up to rounding whenever every `p_i` is in [0, 1].
pub fn independent_distribution(p_on: &[f64], max_bits: usize) -> Result<Distribution> {
    let nbits = p_on.len();
    check_bits(nbits, max_bits)?;
    if let Some(&bad) = p_on.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(NetstateError::MismatchedInput(format!(
            "firing probability {bad} outside [0, 1]"
        )));
    }

    // Per-bit factor tables: on[i] when bit i is set, off[i] otherwise.
    let on = p_on;
    let off: Vec<f64> = p_on.iter().map(|p| 1.0 - p).collect();

    let table = full_truth_table(nbits);
    let p = table
        .rows()
        .map(|bits| {
            bits.iter()
                .enumerate()
                .map(|(i, &bit)| if bit == 1 { on[i] } else { off[i] })
                .product::<f64>()
        })
        .collect::<Vec<f64>>();

    Distribution::new(nbits, p)
}

/// Independent-model PMF using each code-matrix row's mean as its marginal.
pub fn independent_from_codes(codes: &CodeMatrix, max_bits: usize) -> Result<Distribution> {
    check_bits(codes.nneurons(), max_bits)?;
    independent_distribution(&codes.firing_probabilities(), max_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_fair_neurons_uniform() {
        let p = independent_distribution(&[0.5, 0.5], 14).unwrap();
        assert_eq!(p.probabilities(), &[0.25, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_bit_significance() {
        // Neuron 0 always on, neuron 1 never: only word 0b01 survives.
        let p = independent_distribution(&[1.0, 0.0], 14).unwrap();
        assert_eq!(p.probabilities(), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sums_to_one_for_small_n() {
        let marginals = [0.1, 0.35, 0.5, 0.72, 0.03, 0.9];
        for n in 1..=6 {
            let p = independent_distribution(&marginals[..n], 14).unwrap();
            assert_eq!(p.len(), 1 << n);
            assert!((p.total() - 1.0).abs() < 1e-9, "n={n}");
        }
    }

    #[test]
    fn test_from_codes_uses_row_means() {
        let rows = vec![vec![1, 1, 0, 0], vec![1, 0, 0, 0]];
        let codes = CodeMatrix::from_rows(vec![0, 1], (0..4).collect(), rows).unwrap();
        let p = independent_from_codes(&codes, 14).unwrap();
        // p0 = 0.5, p1 = 0.25
        assert!((p.get(0) - 0.5 * 0.75).abs() < 1e-12);
        assert!((p.get(3) - 0.5 * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        assert!(independent_distribution(&[1.5], 14).is_err());
    }
}
