//! Information-theoretic metrics over word distributions.
//!
//! All logarithms are base 2, so entropies and divergences are in bits.
//! Zero-probability entries are skipped when summing `p log p`; for a
//! distribution whose true support is wider than its estimate this
//! underestimates the entropy.

mod activity;

pub use activity::{conditional_activity, spike_count_pmf, ConditionalActivity};

use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::{NetstateError, Result};
use crate::types::Timestamp;

/// Shannon entropy `-Σ p log2 p` over strictly positive entries.
pub fn entropy(p: &[f64]) -> f64 {
    -p.iter()
        .filter(|&&x| x > 0.0)
        .map(|&x| x * x.log2())
        .sum::<f64>()
}

fn check_support(p: &[f64], q: &[f64]) -> Result<()> {
    if p.len() != q.len() {
        return Err(NetstateError::MismatchedInput(format!(
            "distributions over {} and {} words",
            p.len(),
            q.len()
        )));
    }
    Ok(())
}

/// Kullback-Leibler divergence `Σ p log2(p / q)` over entries with `p > 0`.
///
/// Infinite when `q` is zero somewhere `p` is not.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> Result<f64> {
    check_support(p, q)?;
    Ok(p.iter()
        .zip(q)
        .filter(|(&pi, _)| pi > 0.0)
        .map(|(&pi, &qi)| pi * (pi / qi).log2())
        .sum())
}

/// Jensen-Shannon divergence `0.5 KL(P, M) + 0.5 KL(Q, M)`, `M = (P + Q) / 2`.
///
/// Symmetric, non-negative, and at most 1 bit for normalized inputs.
pub fn djs(p: &[f64], q: &[f64]) -> Result<f64> {
    check_support(p, q)?;
    let m: Vec<f64> = p.iter().zip(q).map(|(a, b)| 0.5 * (a + b)).collect();
    let value = 0.5 * kl_divergence(p, &m)? + 0.5 * kl_divergence(q, &m)?;
    // Rounding can leave a tiny negative for identical inputs.
    Ok(value.max(0.0))
}

/// [`djs`] between two [`Distribution`]s, which must share a word length.
pub fn djs_between(p: &Distribution, q: &Distribution) -> Result<f64> {
    if p.nbits() != q.nbits() {
        return Err(NetstateError::MismatchedInput(format!(
            "{}-bit and {}-bit distributions",
            p.nbits(),
            q.nbits()
        )));
    }
    djs(p.probabilities(), q.probabilities())
}

/// Entropies of one neuron group under the three descriptions of its words.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InformationSummary {
    /// Entropy of the independent model.
    pub s1: f64,
    /// Entropy of the pairwise (Ising) model.
    pub s2: f64,
    /// Entropy of the observed words.
    pub sn: f64,
}

impl InformationSummary {
    /// Compute all three entropies.
    pub fn new(independent: &Distribution, ising: &Distribution, observed: &Distribution) -> Self {
        Self {
            s1: entropy(independent.probabilities()),
            s2: entropy(ising.probabilities()),
            sn: entropy(observed.probabilities()),
        }
    }

    /// Multi-information `IN = S1 - SN`.
    pub fn multi_information(&self) -> f64 {
        self.s1 - self.sn
    }

    /// Pairwise information `I2 = S1 - S2`.
    pub fn pairwise_information(&self) -> f64 {
        self.s1 - self.s2
    }

    /// `I2 / IN`, the share of correlated entropy captured by pairwise
    /// structure. NaN or infinite when `IN` is zero.
    pub fn pairwise_fraction(&self) -> f64 {
        self.pairwise_information() / self.multi_information()
    }
}

/// Multi-information `IN = S1 - SN` of a group.
pub fn multi_information(independent: &Distribution, observed: &Distribution) -> f64 {
    entropy(independent.probabilities()) - entropy(observed.probabilities())
}

/// Pairwise information `I2 = S1 - S2` of a group.
pub fn pairwise_information(independent: &Distribution, ising: &Distribution) -> f64 {
    entropy(independent.probabilities()) - entropy(ising.probabilities())
}

/// Mean, standard deviation and standard error of a set of samples.
///
/// The standard deviation is the population form (divides by `n`). All
/// three are NaN for an empty sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    /// Sample mean.
    pub mean: f64,
    /// Standard deviation.
    pub std: f64,
    /// Standard error of the mean, `std / sqrt(n)`.
    pub sem: f64,
}

impl SampleStats {
    /// Summarize `values`.
    pub fn from_values(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        Self {
            mean,
            std,
            sem: std / n.sqrt(),
        }
    }
}

/// Convert bits per bin to bits per second for bins of `tres` microseconds.
pub fn bits_per_second(bits: f64, tres: Timestamp) -> f64 {
    bits / tres as f64 * 1e6
}
