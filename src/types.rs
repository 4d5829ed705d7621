//! Type aliases and common types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NetstateError, Result};

/// Identifier of one neuron in the upstream recording.
pub type NeuronId = u32;

/// Timestamp in the recording's time unit (bin width and phase share it).
pub type Timestamp = i64;

/// Immutable, sorted spike timestamps of one neuron.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpikeTrain {
    times: Vec<Timestamp>,
}

impl SpikeTrain {
    /// Build a spike train, sorting the timestamps if needed.
    pub fn new(mut times: Vec<Timestamp>) -> Self {
        if !times.windows(2).all(|w| w[0] <= w[1]) {
            times.sort_unstable();
        }
        Self { times }
    }

    /// A neuron that never fires.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sorted timestamps.
    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    /// Number of spikes.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the neuron never fires.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of spikes in `[start, end)`.
    pub fn count_in(&self, start: Timestamp, end: Timestamp) -> usize {
        if end <= start {
            return 0;
        }
        let lo = self.times.partition_point(|&t| t < start);
        let hi = self.times.partition_point(|&t| t < end);
        hi - lo
    }
}

impl From<Vec<Timestamp>> for SpikeTrain {
    fn from(times: Vec<Timestamp>) -> Self {
        Self::new(times)
    }
}

/// Half-open time interval `[start, end)` over which codes are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start.
    pub start: Timestamp,
    /// Exclusive end.
    pub end: Timestamp,
}

impl TimeWindow {
    /// Create a window. No ordering check: an inverted window yields no bins.
    pub const fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Window duration, zero for inverted windows.
    pub fn duration(&self) -> Timestamp {
        (self.end - self.start).max(0)
    }
}

/// Torus `(r0, r1)` of inter-neuron distances whose pairs get a free coupling.
///
/// A pair is coupled when `r0 < distance < r1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSpatialRange")]
pub struct SpatialRange {
    r0: f64,
    r1: f64,
}

/// Unchecked wire form of [`SpatialRange`].
#[derive(Deserialize)]
struct RawSpatialRange {
    r0: f64,
    r1: f64,
}

impl TryFrom<RawSpatialRange> for SpatialRange {
    type Error = NetstateError;

    fn try_from(raw: RawSpatialRange) -> Result<Self> {
        Self::new(raw.r0, raw.r1)
    }
}

impl SpatialRange {
    /// Validate and build a range.
    pub fn new(r0: f64, r1: f64) -> Result<Self> {
        if !(r0 < r1) {
            return Err(NetstateError::InvalidRange { r0, r1 });
        }
        Ok(Self { r0, r1 })
    }

    /// Inner radius.
    pub fn r0(&self) -> f64 {
        self.r0
    }

    /// Outer radius.
    pub fn r1(&self) -> f64 {
        self.r1
    }

    /// Whether a pair at `distance` is inside the torus.
    pub fn contains(&self, distance: f64) -> bool {
        self.r0 < distance && distance < self.r1
    }
}

/// Population models that predict a word distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Factorized model from per-neuron marginals.
    #[serde(rename = "indep")]
    Independent,
    /// Pairwise maximum-entropy model.
    #[serde(rename = "ising")]
    Ising,
}

impl ModelKind {
    /// Both models, independent first.
    pub const ALL: [ModelKind; 2] = [ModelKind::Independent, ModelKind::Ising];

    /// Short name used in archives and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Independent => "indep",
            Self::Ising => "ising",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = NetstateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "indep" | "independent" => Ok(Self::Independent),
            "ising" => Ok(Self::Ising),
            _ => Err(NetstateError::UnknownModel(s.to_string())),
        }
    }
}
