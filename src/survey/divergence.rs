//! How well each model predicts the observed words of random groups.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NetstateError, Result};
use crate::metrics::djs_between;
use crate::types::{ModelKind, NeuronId, SpatialRange, TimeWindow};

use super::archive::{self, float_seq, float_table};
use super::GroupOutcome;

/// Jensen-Shannon divergence between observed and model-expected word
/// distributions, per group and model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceSurvey {
    /// Free-form label.
    pub title: String,
    /// Models in column order of `djs`.
    pub models: Vec<ModelKind>,
    /// Neurons per group.
    pub nbits: usize,
    /// Number of groups.
    pub ngroups: usize,
    /// Size of the population the groups were drawn from.
    pub nneurons: usize,
    /// Neuron ids of every group, in submission order.
    pub groups: Vec<Vec<NeuronId>>,
    /// Spatial restriction on Ising couplings, if any.
    pub range: Option<SpatialRange>,
    /// Windows the codes were built over.
    pub windows: Vec<TimeWindow>,
    /// `djs[g][m]`: divergence of model `m` on group `g`.
    #[serde(with = "float_table")]
    pub djs: Vec<Vec<f64>>,
    /// `log10(djs[g][1] / djs[g][0])` when exactly two models were compared,
    /// otherwise empty. Not sanitized: zero divergences give NaN or infinities.
    #[serde(with = "float_seq")]
    pub log_ratios: Vec<f64>,
}

impl DivergenceSurvey {
    /// Score each outcome's model distributions against its observed words.
    pub(crate) fn collect(
        title: String,
        models: Vec<ModelKind>,
        nbits: usize,
        nneurons: usize,
        range: Option<SpatialRange>,
        windows: Vec<TimeWindow>,
        outcomes: &[GroupOutcome],
    ) -> Result<Self> {
        let djs = outcomes
            .iter()
            .map(|outcome| {
                models
                    .iter()
                    .map(|&model| {
                        let expected = outcome.expected(model).ok_or_else(|| {
                            NetstateError::MismatchedInput(format!("model {model} was not evaluated"))
                                .in_group(outcome.group)
                        })?;
                        djs_between(&outcome.observed, expected)
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let log_ratios = if models.len() == 2 {
            djs.iter().map(|row| (row[1] / row[0]).log10()).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            title,
            nbits,
            ngroups: outcomes.len(),
            nneurons,
            groups: outcomes.iter().map(|o| o.ids.clone()).collect(),
            models,
            range,
            windows,
            djs,
            log_ratios,
        })
    }

    /// Divergences of one model across all groups.
    pub fn model_djs(&self, model: ModelKind) -> Option<Vec<f64>> {
        let column = self.models.iter().position(|&m| m == model)?;
        Some(self.djs.iter().map(|row| row[column]).collect())
    }

    /// Write the survey as a JSON archive.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        archive::save(self, path.as_ref())
    }

    /// Read a survey written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        archive::load(path.as_ref())
    }
}
