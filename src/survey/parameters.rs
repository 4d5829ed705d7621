//! Distribution of fitted Ising parameters over random groups.

use serde::{Deserialize, Serialize};

use crate::error::{NetstateError, Result};
use crate::types::NeuronId;

use super::GroupOutcome;

/// Biases and free couplings of one Ising fit per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsingParameterSurvey {
    /// Neurons per group.
    pub nbits: usize,
    /// Neuron ids of every group, in submission order.
    pub groups: Vec<Vec<NeuronId>>,
    /// `h[g]`: biases of group `g`.
    pub h: Vec<Vec<f64>>,
    /// `j[g]`: free couplings of group `g`, upper-triangle order.
    pub j: Vec<Vec<f64>>,
    /// Whether each group's fit converged.
    pub converged: Vec<bool>,
}

impl IsingParameterSurvey {
    pub(crate) fn collect(nbits: usize, outcomes: &[GroupOutcome]) -> Result<Self> {
        let mut survey = Self {
            nbits,
            groups: Vec::with_capacity(outcomes.len()),
            h: Vec::with_capacity(outcomes.len()),
            j: Vec::with_capacity(outcomes.len()),
            converged: Vec::with_capacity(outcomes.len()),
        };
        for outcome in outcomes {
            let fit = outcome.ising.as_ref().ok_or_else(|| {
                NetstateError::MismatchedInput("ising model was not evaluated".into())
                    .in_group(outcome.group)
            })?;
            survey.groups.push(outcome.ids.clone());
            survey.h.push(fit.h.clone());
            survey.j.push(fit.couplings.iter().map(|c| c.value).collect());
            survey.converged.push(fit.converged);
        }
        Ok(survey)
    }

    /// Every bias from every group.
    pub fn all_h(&self) -> Vec<f64> {
        self.h.iter().flatten().copied().collect()
    }

    /// Every free coupling from every group.
    pub fn all_j(&self) -> Vec<f64> {
        self.j.iter().flatten().copied().collect()
    }

    /// Fraction of fits that converged.
    pub fn convergence_rate(&self) -> f64 {
        self.converged.iter().filter(|&&c| c).count() as f64 / self.converged.len() as f64
    }
}
