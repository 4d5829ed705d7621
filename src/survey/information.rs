//! Entropy-based surveys: pairwise versus total correlation, and scaling
//! with group size.

use serde::{Deserialize, Serialize};

use crate::error::{NetstateError, Result};
use crate::metrics::{bits_per_second, entropy, InformationSummary, SampleStats};
use crate::types::{NeuronId, Timestamp};

use super::GroupOutcome;

/// `I2` versus `IN` over random groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationSurvey {
    /// Neurons per group.
    pub nbits: usize,
    /// Bin width the entropies were computed at.
    pub tres: Timestamp,
    /// Neuron ids of every group, in submission order.
    pub groups: Vec<Vec<NeuronId>>,
    /// Entropies per group, in bits per bin.
    pub summaries: Vec<InformationSummary>,
}

fn missing(what: &str, group: usize) -> NetstateError {
    NetstateError::MismatchedInput(format!("{what} model was not evaluated")).in_group(group)
}

impl InformationSurvey {
    pub(crate) fn collect(nbits: usize, tres: Timestamp, outcomes: &[GroupOutcome]) -> Result<Self> {
        let summaries = outcomes
            .iter()
            .map(|o| -> Result<InformationSummary> {
                let independent = o.independent.as_ref().ok_or_else(|| missing("indep", o.group))?;
                let ising = o.ising.as_ref().ok_or_else(|| missing("ising", o.group))?;
                Ok(InformationSummary::new(independent, &ising.distribution, &o.observed))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            nbits,
            tres,
            groups: outcomes.iter().map(|o| o.ids.clone()).collect(),
            summaries,
        })
    }

    /// `IN` per group in bits per second.
    pub fn multi_information_rates(&self) -> Vec<f64> {
        self.summaries
            .iter()
            .map(|s| bits_per_second(s.multi_information(), self.tres))
            .collect()
    }

    /// `I2` per group in bits per second.
    pub fn pairwise_information_rates(&self) -> Vec<f64> {
        self.summaries
            .iter()
            .map(|s| bits_per_second(s.pairwise_information(), self.tres))
            .collect()
    }

    /// `I2 / IN` per group.
    pub fn pairwise_fractions(&self) -> Vec<f64> {
        self.summaries.iter().map(|s| s.pairwise_fraction()).collect()
    }
}

/// `S1` and `IN` statistics for one group size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingPoint {
    /// Group size.
    pub n: usize,
    /// Number of groups sampled at this size.
    pub nsamples: usize,
    /// Independent-model entropy, bits per second.
    pub s1: SampleStats,
    /// Multi-information, bits per second.
    pub multi_information: SampleStats,
}

impl ScalingPoint {
    pub(crate) fn collect(n: usize, tres: Timestamp, outcomes: &[GroupOutcome]) -> Result<Self> {
        let mut s1 = Vec::with_capacity(outcomes.len());
        let mut multi = Vec::with_capacity(outcomes.len());
        for o in outcomes {
            let independent = o.independent.as_ref().ok_or_else(|| missing("indep", o.group))?;
            let h1 = entropy(independent.probabilities());
            let hn = entropy(o.observed.probabilities());
            s1.push(bits_per_second(h1, tres));
            multi.push(bits_per_second(h1 - hn, tres));
        }
        Ok(Self {
            n,
            nsamples: outcomes.len(),
            s1: SampleStats::from_values(&s1),
            multi_information: SampleStats::from_values(&multi),
        })
    }
}

/// How `S1` and `IN` grow with group size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyScaling {
    /// Bin width the entropies were computed at.
    pub tres: Timestamp,
    /// One point per group size, ascending.
    pub points: Vec<ScalingPoint>,
}

impl EntropyScaling {
    /// Group sizes.
    pub fn sizes(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.n).collect()
    }

    /// Mean multi-information per group size, bits per second.
    pub fn mean_multi_information(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.multi_information.mean).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;

    #[test]
    fn test_scaling_point_rates() {
        let outcome = GroupOutcome {
            group: 0,
            ids: vec![0, 1],
            observed: Distribution::new(2, vec![0.5, 0.0, 0.0, 0.5]).unwrap(),
            independent: Some(Distribution::uniform(2, 14).unwrap()),
            ising: None,
        };
        let point = ScalingPoint::collect(2, 1_000_000, &[outcome.clone(), outcome]).unwrap();

        assert_eq!(point.nsamples, 2);
        // 1 s bins: bits per bin equal bits per second
        assert!((point.s1.mean - 2.0).abs() < 1e-12);
        assert!((point.multi_information.mean - 1.0).abs() < 1e-12);
        assert_eq!(point.multi_information.std, 0.0);
    }

    #[test]
    fn test_information_requires_ising() {
        let outcome = GroupOutcome {
            group: 2,
            ids: vec![0],
            observed: Distribution::uniform(1, 14).unwrap(),
            independent: Some(Distribution::uniform(1, 14).unwrap()),
            ising: None,
        };
        assert!(InformationSurvey::collect(1, 20_000, &[outcome]).is_err());
    }
}
