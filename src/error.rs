//! Error type shared by every analysis entry point.

use std::io;
use std::path::PathBuf;

use crate::types::NeuronId;

/// Errors returned by code building, model fitting and surveys.
///
/// All of these are fatal to the call that produced them and nothing else.
/// Numerical conditions (zero-probability words, NaN ratios, optimizer
/// non-convergence) are not errors; they are reported in the results.
#[derive(Debug, thiserror::Error)]
pub enum NetstateError {
    /// Word length exceeds the state-space enumeration cap.
    #[error("{bits} bits exceeds the enumeration cap of {max} bits")]
    TooManyBits {
        /// Requested number of bits.
        bits: usize,
        /// Configured cap.
        max: usize,
    },

    /// Spatial range must satisfy `r0 < r1`.
    #[error("invalid spatial range: r0={r0} must be < r1={r1}")]
    InvalidRange {
        /// Inner radius.
        r0: f64,
        /// Outer radius.
        r1: f64,
    },

    /// Configuration value outside its domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Inputs that disagree in shape (neuron lists, windows, distributions).
    #[error("mismatched input: {0}")]
    MismatchedInput(String),

    /// A neuron id that the code matrix or population does not contain.
    #[error("unknown neuron id {0}")]
    UnknownNeuron(NeuronId),

    /// A spatially restricted fit needs a distance the source cannot supply.
    #[error("no distance available between neurons {a} and {b}")]
    MissingDistance {
        /// First neuron.
        a: NeuronId,
        /// Second neuron.
        b: NeuronId,
    },

    /// Model name that does not map to a [`ModelKind`](crate::ModelKind).
    #[error("unknown model {0:?} (expected \"indep\" or \"ising\")")]
    UnknownModel(String),

    /// Optimizer name that does not map to an [`Algorithm`](crate::Algorithm).
    #[error("unknown optimization algorithm {0:?}")]
    UnknownAlgorithm(String),

    /// A survey task failed; the whole survey is aborted.
    #[error("group {group} failed: {source}")]
    GroupFailed {
        /// Index of the failing group in submission order.
        group: usize,
        /// Underlying failure.
        #[source]
        source: Box<NetstateError>,
    },

    /// Reading or writing a survey archive failed.
    #[error("archive I/O error at {}: {source}", path.display())]
    Archive {
        /// Path we attempted to access.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Archive contents could not be (de)serialized.
    #[error("archive format error: {0}")]
    ArchiveFormat(#[from] serde_json::Error),
}

impl NetstateError {
    /// Attach the index of the survey group that produced this error.
    pub fn in_group(self, group: usize) -> Self {
        Self::GroupFailed {
            group,
            source: Box::new(self),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetstateError>;
