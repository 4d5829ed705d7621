//! Exponential-family likelihood over the full `2^n` spin state space.

use crate::codes::full_truth_table;
use crate::optimize::{Objective, Vector};

use super::moments::IsingTargets;

/// Negative log-likelihood `log Z(θ) - θ·⟨f⟩_data` of a pairwise model.
///
/// The parameter vector is `[h_0..h_{n-1}, J_p for each free pair p]`. Its
/// gradient is the model moments minus the target moments, so a stationary
/// point matches the data.
pub(crate) struct IsingObjective<'a> {
    targets: &'a IsingTargets,
    target_vector: Vector,
    /// Spins of every state, row-major `2^n x n`, indexed by word.
    spins: Vec<f64>,
    nbits: usize,
}

/// Model evaluated at a parameter vector.
pub(crate) struct ModelState {
    /// Normalized state probabilities.
    pub p: Vec<f64>,
    /// Natural log of the partition function.
    pub log_z: f64,
}

impl<'a> IsingObjective<'a> {
    pub(crate) fn new(targets: &'a IsingTargets) -> Self {
        let nbits = targets.nbits();
        let table = full_truth_table(nbits);
        let spins = table
            .rows()
            .flat_map(|row| row.iter().map(|&b| 2.0 * b as f64 - 1.0))
            .collect();
        Self {
            targets,
            target_vector: Vector::from_vec(targets.as_vector()),
            spins,
            nbits,
        }
    }

    fn state(&self, w: usize) -> &[f64] {
        &self.spins[w * self.nbits..(w + 1) * self.nbits]
    }

    fn nstates(&self) -> usize {
        1 << self.nbits
    }

    /// `h·s + Σ J_ij s_i s_j` for one state.
    fn log_weight(&self, theta: &Vector, s: &[f64]) -> f64 {
        let n = self.nbits;
        let field: f64 = (0..n).map(|i| theta[i] * s[i]).sum();
        let coupling: f64 = self
            .targets
            .pairs()
            .iter()
            .enumerate()
            .map(|(k, pair)| theta[n + k] * s[pair.i] * s[pair.j])
            .sum();
        field + coupling
    }

    /// Normalized distribution and `log Z` at `theta`, via log-sum-exp.
    pub(crate) fn model(&self, theta: &Vector) -> ModelState {
        let log_weights: Vec<f64> = (0..self.nstates())
            .map(|w| self.log_weight(theta, self.state(w)))
            .collect();
        let max = log_weights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let mut p: Vec<f64> = log_weights.iter().map(|lw| (lw - max).exp()).collect();
        let sum: f64 = p.iter().sum();
        p.iter_mut().for_each(|x| *x /= sum);
        ModelState {
            p,
            log_z: max + sum.ln(),
        }
    }

    /// Expected features `[E[s_i]..., E[s_i s_j]...]` under `p`.
    pub(crate) fn moments(&self, p: &[f64]) -> Vector {
        let n = self.nbits;
        let pairs = self.targets.pairs();
        let mut out = Vector::zeros(n + pairs.len());
        for (w, &pw) in p.iter().enumerate() {
            if pw == 0.0 {
                continue;
            }
            let s = self.state(w);
            for i in 0..n {
                out[i] += pw * s[i];
            }
            for (k, pair) in pairs.iter().enumerate() {
                out[n + k] += pw * s[pair.i] * s[pair.j];
            }
        }
        out
    }

    pub(crate) fn target_vector(&self) -> &Vector {
        &self.target_vector
    }
}

impl Objective for IsingObjective<'_> {
    fn dim(&self) -> usize {
        self.target_vector.len()
    }

    fn value(&self, x: &Vector) -> f64 {
        self.model(x).log_z - x.dot(&self.target_vector)
    }

    fn value_and_gradient(&self, x: &Vector) -> (f64, Vector) {
        let state = self.model(x);
        let gradient = self.moments(&state.p) - &self.target_vector;
        (state.log_z - x.dot(&self.target_vector), gradient)
    }
}
