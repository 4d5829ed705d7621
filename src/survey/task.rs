//! Self-contained per-group work items and the worker that runs them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codes::CodeMatrix;
use crate::config::IsingConfig;
use crate::distribution::{empirical_distribution, independent_from_codes, Distribution};
use crate::error::Result;
use crate::ising::{fit_ising_codes, IsingFit};
use crate::types::{ModelKind, NeuronId};

/// Everything one survey group needs, with no reference to the population
/// it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTask {
    /// Submission index; results are reported in this order.
    pub group: usize,
    /// Neuron ids of the group, in row order of `codes`.
    pub ids: Vec<NeuronId>,
    /// The group's code matrix.
    pub codes: CodeMatrix,
    /// Models to evaluate.
    pub models: Vec<ModelKind>,
    /// Row pairs with a free Ising coupling; `None` couples every pair.
    pub coupled: Option<Vec<(usize, usize)>>,
    /// Ising fit settings.
    pub ising: IsingConfig,
}

/// Distributions produced by one [`GroupTask`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOutcome {
    /// Submission index.
    pub group: usize,
    /// Neuron ids of the group.
    pub ids: Vec<NeuronId>,
    /// Observed word distribution.
    pub observed: Distribution,
    /// Independent model, when requested.
    pub independent: Option<Distribution>,
    /// Ising fit, when requested.
    pub ising: Option<IsingFit>,
}

impl GroupOutcome {
    /// Expected distribution for `model`, if it was evaluated.
    pub fn expected(&self, model: ModelKind) -> Option<&Distribution> {
        match model {
            ModelKind::Independent => self.independent.as_ref(),
            ModelKind::Ising => self.ising.as_ref().map(|fit| &fit.distribution),
        }
    }
}

/// Evaluate a task. Pure: the outcome depends only on the task.
pub fn run_group_task(task: &GroupTask) -> Result<GroupOutcome> {
    let max_bits = task.ising.max_bits;
    let observed = empirical_distribution(&task.codes, max_bits)?;

    let mut independent = None;
    let mut ising = None;
    for model in &task.models {
        match model {
            ModelKind::Independent if independent.is_none() => {
                independent = Some(independent_from_codes(&task.codes, max_bits)?);
            }
            ModelKind::Ising if ising.is_none() => {
                ising = Some(fit_ising_codes(
                    &task.codes,
                    task.coupled.as_deref(),
                    &task.ising,
                )?);
            }
            _ => {}
        }
    }

    debug!(group = task.group, nbits = task.ids.len(), "group finished");
    Ok(GroupOutcome {
        group: task.group,
        ids: task.ids.clone(),
        observed,
        independent,
        ising,
    })
}
