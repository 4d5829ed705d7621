//! Pairwise maximum-entropy (Ising) model fitting.
//!
//! The model assigns each spin state `s ∈ {-1, +1}^n` the weight
//! `exp(h·s + Σ_{i<j} J_ij s_i s_j)`. Fitting chooses `h` and the free
//! couplings so the model's means and pairwise spin means match the
//! [`IsingTargets`]; pairs without a free coupling keep `J_ij = 0`.
//!
//! The fit minimizes the exponential-family negative log-likelihood with a
//! pluggable [`Algorithm`](crate::Algorithm). Every objective evaluation walks
//! the full `2^n` state space, so the word length is capped by
//! [`IsingConfig::max_bits`].
//!
//! Degenerate marginals (a neuron that is always or never on) push the
//! corresponding bias to infinity. The fit still returns, with
//! `converged == false` or a large residual, and logs a warning.

mod moments;
mod objective;

pub use moments::{all_pairs, IsingTargets, PairTarget};

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codes::{check_bits, CodeMatrix};
use crate::config::IsingConfig;
use crate::distribution::Distribution;
use crate::error::Result;
use crate::optimize::{inf_norm, precision_floor, Algorithm, MinimizeOptions, Vector};

use objective::IsingObjective;

/// Clamp for the starting bias of near-degenerate neurons.
const MAX_INITIAL_BIAS: f64 = 10.0;

/// A fitted coupling between rows `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coupling {
    /// Lower row index.
    pub i: usize,
    /// Upper row index.
    pub j: usize,
    /// Coupling strength `J_ij`.
    pub value: f64,
}

/// Result of an Ising fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsingFit {
    /// Bias per neuron.
    pub h: Vec<f64>,
    /// Free couplings, in the order of the targets' pairs.
    pub couplings: Vec<Coupling>,
    /// Model distribution over all `2^n` words.
    pub distribution: Distribution,
    /// Natural log of the partition function.
    pub log_z: f64,
    /// Method used.
    pub algorithm: Algorithm,
    /// Minimizer iterations.
    pub iterations: usize,
    /// Whether the minimizer met its stopping criterion and the moments
    /// match to within `sqrt(gradient_tolerance)`.
    pub converged: bool,
    /// Largest absolute difference between model and target moments.
    pub max_residual: f64,
    /// Model `E[s_i]`.
    pub model_means: Vec<f64>,
    /// Model `E[s_i s_j]` for each free pair.
    pub model_pair_means: Vec<f64>,
}

impl IsingFit {
    /// Number of neurons.
    pub fn nbits(&self) -> usize {
        self.h.len()
    }

    /// Partition function `Z`. Overflows to infinity for extreme parameters;
    /// use [`log_z`](Self::log_z) when that matters.
    pub fn partition(&self) -> f64 {
        self.log_z.exp()
    }

    /// `J_ij` for any pair, zero when the pair was not free.
    pub fn coupling(&self, i: usize, j: usize) -> f64 {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.couplings
            .iter()
            .find(|c| c.i == i && c.j == j)
            .map_or(0.0, |c| c.value)
    }

    /// Symmetric coupling matrix with a zero diagonal.
    pub fn coupling_matrix(&self) -> DMatrix<f64> {
        let n = self.nbits();
        let mut j = DMatrix::zeros(n, n);
        for c in &self.couplings {
            j[(c.i, c.j)] = c.value;
            j[(c.j, c.i)] = c.value;
        }
        j
    }
}

fn initial_point(targets: &IsingTargets) -> Vector {
    let mut x = Vector::zeros(targets.dim());
    for (i, &m) in targets.means().iter().enumerate() {
        if m.abs() < 1.0 {
            x[i] = m.atanh().clamp(-MAX_INITIAL_BIAS, MAX_INITIAL_BIAS);
        }
    }
    x
}

/// Fit an Ising model to explicit moment targets.
pub fn fit_ising(targets: &IsingTargets, config: &IsingConfig) -> Result<IsingFit> {
    let n = targets.nbits();
    check_bits(n, config.max_bits)?;

    let degenerate = targets.degenerate_neurons();
    if !degenerate.is_empty() {
        warn!(
            neurons = ?degenerate,
            "degenerate marginals; the maximum-likelihood bias is infinite"
        );
    }

    let objective = IsingObjective::new(targets);
    let options = MinimizeOptions {
        max_iterations: config.max_iterations,
        tolerance: config.gradient_tolerance,
    };
    let minimum = config
        .algorithm
        .minimize(&objective, initial_point(targets), &options);

    let state = objective.model(&minimum.x);
    let moments = objective.moments(&state.p);
    let max_residual = inf_norm(&(&moments - objective.target_vector()));
    // Derivative-free methods stop on value spread, which can happen with
    // the moments still far apart.
    let residual_limit = config
        .gradient_tolerance
        .sqrt()
        .max(precision_floor(minimum.value));
    let converged = minimum.converged && max_residual <= residual_limit;

    if converged {
        debug!(
            nbits = n,
            algorithm = %config.algorithm,
            iterations = minimum.iterations,
            max_residual,
            stalled = minimum.stalled,
            "ising fit converged"
        );
    } else {
        warn!(
            nbits = n,
            algorithm = %config.algorithm,
            iterations = minimum.iterations,
            max_residual,
            "ising fit did not converge; returning best parameters found"
        );
    }

    let couplings = targets
        .pairs()
        .iter()
        .enumerate()
        .map(|(k, pair)| Coupling {
            i: pair.i,
            j: pair.j,
            value: minimum.x[n + k],
        })
        .collect();

    Ok(IsingFit {
        h: minimum.x.rows(0, n).iter().copied().collect(),
        couplings,
        distribution: Distribution::new(n, state.p)?,
        log_z: state.log_z,
        algorithm: config.algorithm,
        iterations: minimum.iterations,
        converged,
        max_residual,
        model_means: moments.rows(0, n).iter().copied().collect(),
        model_pair_means: moments.rows(n, targets.pairs().len()).iter().copied().collect(),
    })
}

/// Fit an Ising model to the empirical moments of `codes`.
///
/// `coupled` restricts which pairs get a free coupling; `None` couples all.
pub fn fit_ising_codes(
    codes: &CodeMatrix,
    coupled: Option<&[(usize, usize)]>,
    config: &IsingConfig,
) -> Result<IsingFit> {
    check_bits(codes.nneurons(), config.max_bits)?;
    let targets = IsingTargets::from_codes(codes, coupled)?;
    fit_ising(&targets, config)
}
