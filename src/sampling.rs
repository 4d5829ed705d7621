//! Random neuron-subgroup sampling.
//!
//! A batch of groups is drawn without repetition: every group in one call is
//! a distinct unordered combination. Requests for more groups than there are
//! combinations are capped at `C(n, r)` and return every combination.

use std::collections::BTreeSet;

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::debug;

use crate::error::{NetstateError, Result};
use crate::types::NeuronId;

/// Enumerate all combinations when there are at most this many.
const ENUMERATE_LIMIT: u128 = 100_000;

/// Counter-based RNG seed generation using SplitMix64.
///
/// Deterministic, well-distributed seeds from a base seed and a counter, so
/// that each survey group gets its own stream regardless of which thread
/// runs it.
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // SplitMix64, see https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generator for a configured seed, or from OS entropy when there is none.
pub fn seeded_rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_os_rng(),
    }
}

/// Binomial coefficient `C(n, r)`, saturating at `u128::MAX`.
pub fn n_choose_r(n: usize, r: usize) -> u128 {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut result: u128 = 1;
    for k in 0..r {
        // Exact at every step: result * (n - k) is divisible by (k + 1).
        result = match result.checked_mul((n - k) as u128) {
            Some(v) => v / (k as u128 + 1),
            None => return u128::MAX,
        };
    }
    result
}

/// All `r`-combinations of `0..n` in lexicographic order.
fn all_combinations(n: usize, r: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut combo: Vec<usize> = (0..r).collect();
    if r > n {
        return out;
    }
    loop {
        out.push(combo.clone());
        let Some(i) = (0..r).rev().find(|&i| combo[i] != i + n - r) else {
            return out;
        };
        combo[i] += 1;
        for k in i + 1..r {
            combo[k] = combo[k - 1] + 1;
        }
    }
}

/// Draws distinct size-`r` subgroups of a neuron population.
#[derive(Debug, Clone)]
pub struct SubgroupSampler {
    population: Vec<NeuronId>,
}

impl SubgroupSampler {
    /// Sample from `population`, which must not contain duplicates.
    pub fn new(population: Vec<NeuronId>) -> Result<Self> {
        let unique: BTreeSet<_> = population.iter().collect();
        if unique.len() != population.len() {
            return Err(NetstateError::MismatchedInput(
                "population contains duplicate neuron ids".into(),
            ));
        }
        Ok(Self { population })
    }

    /// Population size.
    pub fn len(&self) -> usize {
        self.population.len()
    }

    /// True when the population is empty.
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Number of distinct groups of size `r`.
    pub fn combinations(&self, r: usize) -> u128 {
        n_choose_r(self.population.len(), r)
    }

    /// Draw up to `nsamples` distinct groups of size `r`.
    ///
    /// Each group lists ids in population order. Returns every combination
    /// when `nsamples >= C(n, r)`, and fails when `r` exceeds the population.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        r: usize,
        nsamples: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<NeuronId>>> {
        let n = self.population.len();
        if r > n {
            return Err(NetstateError::MismatchedInput(format!(
                "cannot draw groups of {r} from {n} neurons"
            )));
        }

        let total = n_choose_r(n, r);
        let wanted = nsamples as u128;
        if wanted >= total {
            if wanted > total {
                debug!(nsamples, total = %total, "capping sample count at C(n, r)");
            }
            return Ok(self.to_ids(all_combinations(n, r)));
        }

        let picks = if total <= ENUMERATE_LIMIT {
            let all = all_combinations(n, r);
            index::sample(rng, all.len(), nsamples)
                .into_iter()
                .map(|i| all[i].clone())
                .collect()
        } else {
            // Sparse request against a huge combination space.
            let mut seen = BTreeSet::new();
            let mut picks = Vec::with_capacity(nsamples);
            while picks.len() < nsamples {
                let mut combo = index::sample(rng, n, r).into_vec();
                combo.sort_unstable();
                if seen.insert(combo.clone()) {
                    picks.push(combo);
                }
            }
            picks
        };
        Ok(self.to_ids(picks))
    }

    fn to_ids(&self, combos: Vec<Vec<usize>>) -> Vec<Vec<NeuronId>> {
        combos
            .into_iter()
            .map(|c| c.into_iter().map(|i| self.population[i]).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(42)
    }

    #[test]
    fn test_n_choose_r() {
        assert_eq!(n_choose_r(5, 2), 10);
        assert_eq!(n_choose_r(10, 0), 1);
        assert_eq!(n_choose_r(10, 10), 1);
        assert_eq!(n_choose_r(3, 4), 0);
        assert_eq!(n_choose_r(60, 30), 118_264_581_564_861_424);
    }

    #[test]
    fn test_full_group_is_single_sample() {
        let sampler = SubgroupSampler::new(vec![4, 8, 15, 16]).unwrap();
        let groups = sampler.sample(4, 10, &mut rng()).unwrap();
        assert_eq!(groups, vec![vec![4, 8, 15, 16]]);
    }

    #[test]
    fn test_oversampling_caps_at_combinations() {
        let sampler = SubgroupSampler::new((0..5).collect()).unwrap();
        let groups = sampler.sample(2, 1_000, &mut rng()).unwrap();
        assert_eq!(groups.len(), 10);
        let unique: BTreeSet<_> = groups.iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_samples_are_distinct_and_sorted() {
        let sampler = SubgroupSampler::new((0..12).collect()).unwrap();
        let groups = sampler.sample(5, 50, &mut rng()).unwrap();
        assert_eq!(groups.len(), 50);
        let unique: BTreeSet<_> = groups.iter().collect();
        assert_eq!(unique.len(), 50);
        for g in &groups {
            assert!(g.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_sparse_path_in_large_space() {
        let sampler = SubgroupSampler::new((0..200).collect()).unwrap();
        let groups = sampler.sample(10, 20, &mut rng()).unwrap();
        let unique: BTreeSet<_> = groups.iter().collect();
        assert_eq!(unique.len(), 20);
        assert!(groups.iter().all(|g| g.len() == 10));
    }

    #[test]
    fn test_same_seed_same_groups() {
        let sampler = SubgroupSampler::new((0..20).collect()).unwrap();
        let a = sampler.sample(3, 7, &mut rng()).unwrap();
        let b = sampler.sample(3, 7, &mut rng()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_group_larger_than_population_rejected() {
        let sampler = SubgroupSampler::new(vec![1, 2]).unwrap();
        assert!(sampler.sample(3, 1, &mut rng()).is_err());
        assert!(SubgroupSampler::new(vec![1, 1]).is_err());
    }

    #[test]
    fn test_counter_seeds_differ() {
        assert_ne!(counter_rng_seed(7, 0), counter_rng_seed(7, 1));
        assert_eq!(counter_rng_seed(7, 3), counter_rng_seed(7, 3));
    }
}
