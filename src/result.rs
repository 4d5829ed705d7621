//! Result types returned by single-group [`Netstate`](crate::Netstate) analyses.

use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::metrics::{ConditionalActivity, SampleStats};
use crate::types::{ModelKind, NeuronId};

/// Observed and model-expected probabilities of every word of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scatter {
    /// Neuron ids, bit 0 first.
    pub ids: Vec<NeuronId>,
    /// Observed word distribution.
    pub observed: Distribution,
    /// Models in the order requested.
    pub models: Vec<ModelKind>,
    /// Expected distribution per model, same order as `models`.
    pub expected: Vec<Distribution>,
    /// DJS of each model against `observed`.
    pub djs: Vec<f64>,
}

impl Scatter {
    /// `(observed, expected)` probability pairs for `model`, one per word.
    pub fn points(&self, model: ModelKind) -> Option<Vec<(f64, f64)>> {
        let i = self.models.iter().position(|&m| m == model)?;
        Some(
            self.observed
                .probabilities()
                .iter()
                .copied()
                .zip(self.expected[i].probabilities().iter().copied())
                .collect(),
        )
    }
}

/// Distribution of the number of co-active neurons, with a shuffled control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeCountPmf {
    /// Neuron ids the counts were taken over.
    pub ids: Vec<NeuronId>,
    /// `observed[k]`: probability that exactly `k` neurons are active.
    pub observed: Vec<f64>,
    /// Same, after shuffling each neuron's code independently.
    pub shuffled: Vec<f64>,
}

/// Conditional activity of one cell averaged over subsets of other cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellCheck {
    /// The cell whose activity is tabulated.
    pub cell: NeuronId,
    /// Subsets of other cells the table was averaged over.
    pub subsets: Vec<Vec<NeuronId>>,
    /// Mean table.
    pub mean: ConditionalActivity,
    /// Standard deviation per entry.
    pub std: ConditionalActivity,
    /// Standard error per entry.
    pub sem: ConditionalActivity,
}

impl CellCheck {
    pub(crate) fn from_tables(
        cell: NeuronId,
        subsets: Vec<Vec<NeuronId>>,
        tables: &[ConditionalActivity],
    ) -> Self {
        let width = tables.first().map_or(0, ConditionalActivity::len);
        let column = |pick: fn(&ConditionalActivity) -> &[f64], m: usize| {
            let values: Vec<f64> = tables.iter().map(|t| pick(t)[m]).collect();
            SampleStats::from_values(&values)
        };
        let off: Vec<SampleStats> = (0..width).map(|m| column(|t| t.off.as_slice(), m)).collect();
        let on: Vec<SampleStats> = (0..width).map(|m| column(|t| t.on.as_slice(), m)).collect();
        let table = |f: fn(&SampleStats) -> f64| ConditionalActivity {
            off: off.iter().map(f).collect(),
            on: on.iter().map(f).collect(),
        };

        Self {
            cell,
            subsets,
            mean: table(|s| s.mean),
            std: table(|s| s.std),
            sem: table(|s| s.sem),
        }
    }
}
