//! Upstream data: spike trains per neuron and inter-neuron distances.

use std::collections::BTreeMap;

use crate::error::{NetstateError, Result};
use crate::types::{NeuronId, SpatialRange, SpikeTrain};

/// Supplies spike trains and, for spatially restricted fits, distances.
///
/// Anything that can look up a neuron's spikes by id can drive the analyses;
/// recordings, simulations and test fixtures all implement this.
pub trait SpikeSource {
    /// All neuron ids, in ascending order.
    fn neuron_ids(&self) -> Vec<NeuronId>;

    /// Spike train of `id`, or `None` for a neuron the source does not know.
    fn spikes(&self, id: NeuronId) -> Option<&SpikeTrain>;

    /// Physical distance between two neurons, when known.
    fn distance(&self, _a: NeuronId, _b: NeuronId) -> Option<f64> {
        None
    }
}

/// In-memory population with optional neuron positions.
#[derive(Debug, Clone, Default)]
pub struct Population {
    trains: BTreeMap<NeuronId, SpikeTrain>,
    positions: BTreeMap<NeuronId, (f64, f64)>,
}

impl Population {
    /// Empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a neuron's spike train.
    pub fn with_neuron(mut self, id: NeuronId, train: SpikeTrain) -> Self {
        self.trains.insert(id, train);
        self
    }

    /// Place a neuron at `(x, y)`; distances are Euclidean.
    pub fn with_position(mut self, id: NeuronId, x: f64, y: f64) -> Self {
        self.positions.insert(id, (x, y));
        self
    }

    /// Add or replace a neuron's spike train in place.
    pub fn insert(&mut self, id: NeuronId, train: SpikeTrain) {
        self.trains.insert(id, train);
    }

    /// Number of neurons.
    pub fn len(&self) -> usize {
        self.trains.len()
    }

    /// True when no neurons have been added.
    pub fn is_empty(&self) -> bool {
        self.trains.is_empty()
    }
}

impl SpikeSource for Population {
    fn neuron_ids(&self) -> Vec<NeuronId> {
        self.trains.keys().copied().collect()
    }

    fn spikes(&self, id: NeuronId) -> Option<&SpikeTrain> {
        self.trains.get(&id)
    }

    fn distance(&self, a: NeuronId, b: NeuronId) -> Option<f64> {
        let (ax, ay) = self.positions.get(&a)?;
        let (bx, by) = self.positions.get(&b)?;
        Some((ax - bx).hypot(ay - by))
    }
}

/// Pairs of row indices `i < j` of `ids` whose distance lies strictly
/// inside `range`.
pub(crate) fn pairs_in_range<S: SpikeSource + ?Sized>(
    source: &S,
    ids: &[NeuronId],
    range: &SpatialRange,
) -> Result<Vec<(usize, usize)>> {
    let mut pairs = Vec::new();
    for i in 0..ids.len() {
        for j in i + 1..ids.len() {
            let (a, b) = (ids[i], ids[j]);
            let d = source
                .distance(a, b)
                .ok_or(NetstateError::MissingDistance { a, b })?;
            if range.contains(d) {
                pairs.push((i, j));
            }
        }
    }
    Ok(pairs)
}
