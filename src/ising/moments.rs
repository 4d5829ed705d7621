//! First- and second-order spin moments that an Ising fit must reproduce.

use serde::{Deserialize, Serialize};

use crate::codes::CodeMatrix;
use crate::error::{NetstateError, Result};

/// A neuron pair `i < j` with a free coupling and its target `E[s_i s_j]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairTarget {
    /// Lower row index.
    pub i: usize,
    /// Upper row index.
    pub j: usize,
    /// Target pairwise spin mean.
    pub mean: f64,
}

/// Moment-matching targets in spin (±1) coding.
///
/// Pairs absent from `pairs` have their coupling fixed at zero and are not
/// part of the fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsingTargets {
    means: Vec<f64>,
    pairs: Vec<PairTarget>,
}

/// Every pair `(i, j)` with `i < j < n`, in row-major upper-triangle order.
pub fn all_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

impl IsingTargets {
    /// Build targets from explicit moments.
    ///
    /// # Arguments
    ///
    /// * `means` - `E[s_i]` per neuron, each in [-1, 1]
    /// * `pairs` - `(i, j, E[s_i s_j])` for every freely coupled pair, `i < j`
    pub fn new(means: Vec<f64>, pairs: Vec<(usize, usize, f64)>) -> Result<Self> {
        let n = means.len();
        if let Some(&bad) = means.iter().find(|m| !(-1.0..=1.0).contains(*m)) {
            return Err(NetstateError::MismatchedInput(format!(
                "spin mean {bad} outside [-1, 1]"
            )));
        }
        let mut targets = Vec::with_capacity(pairs.len());
        for (i, j, mean) in pairs {
            if !(i < j && j < n) {
                return Err(NetstateError::MismatchedInput(format!(
                    "pair ({i}, {j}) is not an upper-triangle pair of {n} neurons"
                )));
            }
            if !(-1.0..=1.0).contains(&mean) {
                return Err(NetstateError::MismatchedInput(format!(
                    "pair mean {mean} outside [-1, 1]"
                )));
            }
            targets.push(PairTarget { i, j, mean });
        }
        Ok(Self {
            means,
            pairs: targets,
        })
    }

    /// Targets from firing probabilities and pairwise spin means.
    pub fn from_probabilities(p_on: &[f64], pairs: Vec<(usize, usize, f64)>) -> Result<Self> {
        Self::new(p_on.iter().map(|p| 2.0 * p - 1.0).collect(), pairs)
    }

    /// Empirical moments of a code matrix.
    ///
    /// `coupled` lists the pairs that get a free coupling; `None` couples
    /// every pair.
    pub fn from_codes(codes: &CodeMatrix, coupled: Option<&[(usize, usize)]>) -> Result<Self> {
        let n = codes.nneurons();
        let nbins = codes.nbins();
        if nbins == 0 {
            return Err(NetstateError::MismatchedInput(
                "cannot estimate moments from zero bins".into(),
            ));
        }

        let spins: Vec<Vec<f64>> = codes
            .rows()
            .map(|row| row.iter().map(|&b| 2.0 * b as f64 - 1.0).collect())
            .collect();
        let means = spins
            .iter()
            .map(|s| s.iter().sum::<f64>() / nbins as f64)
            .collect();

        let pair_list = match coupled {
            Some(pairs) => pairs.to_vec(),
            None => all_pairs(n),
        };
        let pairs = pair_list
            .into_iter()
            .map(|(i, j)| {
                let mean = if i < n && j < n {
                    spins[i].iter().zip(&spins[j]).map(|(a, b)| a * b).sum::<f64>() / nbins as f64
                } else {
                    f64::NAN
                };
                (i, j, mean)
            })
            .collect();

        Self::new(means, pairs)
    }

    /// Number of neurons.
    pub fn nbits(&self) -> usize {
        self.means.len()
    }

    /// Target `E[s_i]`.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Freely coupled pairs and their target `E[s_i s_j]`.
    pub fn pairs(&self) -> &[PairTarget] {
        &self.pairs
    }

    /// Number of fitted parameters (biases plus free couplings).
    pub fn dim(&self) -> usize {
        self.means.len() + self.pairs.len()
    }

    /// Targets flattened as `[means..., pair means...]`.
    pub fn as_vector(&self) -> Vec<f64> {
        self.means
            .iter()
            .copied()
            .chain(self.pairs.iter().map(|p| p.mean))
            .collect()
    }

    /// Neurons whose marginal is exactly 0 or 1.
    pub fn degenerate_neurons(&self) -> Vec<usize> {
        self.means
            .iter()
            .enumerate()
            .filter(|(_, m)| m.abs() >= 1.0)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_pairs_order() {
        assert_eq!(all_pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert!(all_pairs(1).is_empty());
    }

    #[test]
    fn test_from_codes_spin_moments() {
        let rows = vec![vec![1, 1, 0, 0], vec![1, 0, 1, 0]];
        let codes = CodeMatrix::from_rows(vec![0, 1], (0..4).collect(), rows).unwrap();
        let targets = IsingTargets::from_codes(&codes, None).unwrap();

        assert_eq!(targets.means(), &[0.0, 0.0]);
        // spins (+,+), (+,-), (-,+), (-,-) -> products +1, -1, -1, +1
        assert_eq!(targets.pairs().len(), 1);
        assert_eq!(targets.pairs()[0].mean, 0.0);
    }

    #[test]
    fn test_restricted_pairs() {
        let rows = vec![vec![1, 0], vec![1, 0], vec![0, 1]];
        let codes = CodeMatrix::from_rows(vec![0, 1, 2], vec![0, 1], rows).unwrap();
        let targets = IsingTargets::from_codes(&codes, Some(&[(0, 1)])).unwrap();
        assert_eq!(targets.pairs().len(), 1);
        assert_eq!(targets.pairs()[0].mean, 1.0);
        assert_eq!(targets.dim(), 4);
    }

    #[test]
    fn test_invalid_pairs_rejected() {
        assert!(IsingTargets::new(vec![0.0, 0.0], vec![(1, 0, 0.0)]).is_err());
        assert!(IsingTargets::new(vec![0.0, 0.0], vec![(0, 2, 0.0)]).is_err());
        assert!(IsingTargets::new(vec![1.5], vec![]).is_err());
    }

    #[test]
    fn test_degenerate_neurons() {
        let targets = IsingTargets::from_probabilities(&[0.0, 0.4, 1.0], vec![]).unwrap();
        assert_eq!(targets.degenerate_neurons(), vec![0, 2]);
    }
}
