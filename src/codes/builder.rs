//! Binarization of spike trains into a neuron-by-bin code matrix.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CodeConfig;
use crate::error::{NetstateError, Result};
use crate::types::{NeuronId, SpikeTrain, TimeWindow, Timestamp};

use super::state_space::{check_bits, int_from_bits, Word, MAX_WORD_BITS};

/// Binary code matrix: row `i` is neuron `i`, column `j` is time bin `j`.
///
/// Columns are concatenated across windows in window order. Row order fixes
/// bit significance (row 0 is the least significant bit of every word).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCodeMatrix")]
pub struct CodeMatrix {
    neuron_ids: Vec<NeuronId>,
    bin_edges: Vec<Timestamp>,
    /// Row-major, `neuron_ids.len() * bin_edges.len()` entries in {0, 1}.
    data: Vec<u8>,
}

/// Unchecked wire form of [`CodeMatrix`].
#[derive(Deserialize)]
struct RawCodeMatrix {
    neuron_ids: Vec<NeuronId>,
    bin_edges: Vec<Timestamp>,
    data: Vec<u8>,
}

impl TryFrom<RawCodeMatrix> for CodeMatrix {
    type Error = NetstateError;

    fn try_from(raw: RawCodeMatrix) -> Result<Self> {
        let expected = raw.neuron_ids.len().checked_mul(raw.bin_edges.len());
        if expected != Some(raw.data.len()) {
            return Err(NetstateError::MismatchedInput(format!(
                "{} code entries for {} neurons and {} bins",
                raw.data.len(),
                raw.neuron_ids.len(),
                raw.bin_edges.len()
            )));
        }
        if let Some(&bad) = raw.data.iter().find(|&&v| v > 1) {
            return Err(NetstateError::MismatchedInput(format!(
                "code entry {bad} is not binary"
            )));
        }
        Ok(Self {
            neuron_ids: raw.neuron_ids,
            bin_edges: raw.bin_edges,
            data: raw.data,
        })
    }
}

impl CodeMatrix {
    /// Build from raw rows. Every row must have one entry per bin edge.
    pub fn from_rows(
        neuron_ids: Vec<NeuronId>,
        bin_edges: Vec<Timestamp>,
        rows: Vec<Vec<u8>>,
    ) -> Result<Self> {
        if rows.len() != neuron_ids.len() {
            return Err(NetstateError::MismatchedInput(format!(
                "{} rows for {} neuron ids",
                rows.len(),
                neuron_ids.len()
            )));
        }
        let nbins = bin_edges.len();
        let mut data = Vec::with_capacity(rows.len() * nbins);
        for (row, id) in rows.iter().zip(&neuron_ids) {
            if row.len() != nbins {
                return Err(NetstateError::MismatchedInput(format!(
                    "row for neuron {id} has {} bins, expected {nbins}",
                    row.len()
                )));
            }
            data.extend(row.iter().map(|&v| u8::from(v != 0)));
        }
        Ok(Self {
            neuron_ids,
            bin_edges,
            data,
        })
    }

    /// Number of neurons (rows).
    pub fn nneurons(&self) -> usize {
        self.neuron_ids.len()
    }

    /// Number of time bins (columns).
    pub fn nbins(&self) -> usize {
        self.bin_edges.len()
    }

    /// Neuron ids in row order.
    pub fn neuron_ids(&self) -> &[NeuronId] {
        &self.neuron_ids
    }

    /// Left edge of every bin, in column order.
    pub fn bin_edges(&self) -> &[Timestamp] {
        &self.bin_edges
    }

    /// Row index of a neuron id.
    pub fn index_of(&self, id: NeuronId) -> Option<usize> {
        self.neuron_ids.iter().position(|&n| n == id)
    }

    /// Code of neuron row `i`.
    pub fn row(&self, i: usize) -> &[u8] {
        let nbins = self.nbins();
        &self.data[i * nbins..(i + 1) * nbins]
    }

    /// Rows in neuron order.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.nneurons()).map(move |i| self.row(i))
    }

    /// Entry at neuron row `i`, bin `j`.
    pub fn get(&self, i: usize, j: usize) -> u8 {
        self.data[i * self.nbins() + j]
    }

    /// Bits of column `j`, one per neuron.
    pub fn column(&self, j: usize) -> Vec<u8> {
        (0..self.nneurons()).map(|i| self.get(i, j)).collect()
    }

    /// Per-neuron firing probability: the mean of each row.
    ///
    /// A matrix with no bins yields zeros.
    pub fn firing_probabilities(&self) -> Vec<f64> {
        let nbins = self.nbins();
        self.rows()
            .map(|row| {
                if nbins == 0 {
                    0.0
                } else {
                    row.iter().map(|&b| b as f64).sum::<f64>() / nbins as f64
                }
            })
            .collect()
    }

    /// Population word of every bin.
    pub fn words(&self) -> Result<Vec<Word>> {
        check_bits(self.nneurons(), MAX_WORD_BITS)?;
        Ok((0..self.nbins())
            .map(|j| int_from_bits(&self.column(j)))
            .collect())
    }

    /// Number of active neurons in every bin.
    pub fn active_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.nbins()];
        for row in self.rows() {
            for (count, &bit) in counts.iter_mut().zip(row) {
                *count += bit as usize;
            }
        }
        counts
    }

    /// Sub-matrix with rows for `ids`, in the order given.
    pub fn select(&self, ids: &[NeuronId]) -> Result<CodeMatrix> {
        let mut data = Vec::with_capacity(ids.len() * self.nbins());
        for &id in ids {
            let i = self.index_of(id).ok_or(NetstateError::UnknownNeuron(id))?;
            data.extend_from_slice(self.row(i));
        }
        Ok(CodeMatrix {
            neuron_ids: ids.to_vec(),
            bin_edges: self.bin_edges.clone(),
            data,
        })
    }

    /// Bins in which every neuron is active.
    ///
    /// A matrix with no rows has no synchronous bins.
    pub fn sync_bins(&self) -> Vec<usize> {
        if self.nneurons() == 0 {
            return Vec::new();
        }
        self.active_counts()
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == self.nneurons())
            .map(|(j, _)| j)
            .collect()
    }

    /// Left edges of the synchronous bins.
    pub fn sync_times(&self) -> Vec<Timestamp> {
        self.sync_bins().into_iter().map(|j| self.bin_edges[j]).collect()
    }

    /// Left edges of bins where exactly the neurons in `on_ids` are active.
    pub fn word_times(&self, on_ids: &[NeuronId]) -> Result<Vec<Timestamp>> {
        let mut on = vec![false; self.nneurons()];
        for &id in on_ids {
            let i = self.index_of(id).ok_or(NetstateError::UnknownNeuron(id))?;
            on[i] = true;
        }
        Ok((0..self.nbins())
            .filter(|&j| (0..self.nneurons()).all(|i| (self.get(i, j) == 1) == on[i]))
            .map(|j| self.bin_edges[j])
            .collect())
    }

    /// Permute each row independently.
    ///
    /// Keeps every neuron's firing probability and destroys temporal and
    /// cross-neuron structure; used to build an independence control.
    pub fn shuffle_rows<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let nbins = self.nbins();
        if nbins == 0 {
            return;
        }
        for row in self.data.chunks_mut(nbins) {
            row.shuffle(rng);
        }
    }
}

/// Left bin edges for each window, concatenated in window order.
pub fn bin_edges(windows: &[TimeWindow], code: &CodeConfig) -> Vec<Timestamp> {
    let offset = code.phase_offset();
    let mut edges = Vec::new();
    for window in windows {
        let mut edge = window.start + offset;
        while edge < window.end {
            edges.push(edge);
            edge += code.tres;
        }
    }
    edges
}

/// Binarize spike trains over `windows`.
///
/// Each bin `[edge, edge + tres)` is clipped to its window, and a neuron is
/// 1 in a bin when at least one spike falls inside. Overlapping windows are
/// not checked and may count a spike twice.
pub fn build_codes(
    trains: &[(NeuronId, &SpikeTrain)],
    windows: &[TimeWindow],
    code: &CodeConfig,
) -> Result<CodeMatrix> {
    if code.tres <= 0 {
        return Err(NetstateError::InvalidConfig(format!(
            "bin width must be positive, got {}",
            code.tres
        )));
    }

    let offset = code.phase_offset();
    let edges = bin_edges(windows, code);
    let nbins = edges.len();
    let mut data = Vec::with_capacity(trains.len() * nbins);

    for (_, train) in trains {
        for window in windows {
            let mut edge = window.start + offset;
            while edge < window.end {
                let lo = edge.max(window.start);
                let hi = (edge + code.tres).min(window.end);
                data.push(u8::from(train.count_in(lo, hi) > 0));
                edge += code.tres;
            }
        }
    }
    debug_assert_eq!(data.len(), trains.len() * nbins);

    Ok(CodeMatrix {
        neuron_ids: trains.iter().map(|(id, _)| *id).collect(),
        bin_edges: edges,
        data,
    })
}
