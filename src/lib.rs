//! # netstate
//!
//! Binary population codes, pairwise maximum-entropy (Ising) models and the
//! information measures built on them.
//!
//! Spike trains are binned into a binary code matrix; each time bin's joint
//! on/off pattern is a *word*. The crate compares the observed word
//! distribution against two models:
//!
//! - the independent model, from each neuron's firing probability alone
//! - the Ising model, which also matches every pairwise correlation
//!
//! and quantifies the difference with entropies, multi-information and the
//! Jensen-Shannon divergence, for single groups or surveys over many random
//! groups.
//!
//! ## Bit ordering
//!
//! Row `i` of a code matrix is bit `i` of every word (row 0 is the least
//! significant bit). Every `2^n`-length array in the crate, from the truth
//! table to the model distributions, is indexed by word value under this
//! convention.
//!
//! ## Quick Start
//!
//! ```ignore
//! use netstate::{ModelKind, Netstate, Population, SpikeTrain, TimeWindow};
//!
//! let population = Population::new()
//!     .with_neuron(1, SpikeTrain::new(spikes_1))
//!     .with_neuron(2, SpikeTrain::new(spikes_2));
//!
//! let ns = Netstate::new(&population).windows(vec![TimeWindow::new(0, 60_000_000)]);
//! let scatter = ns.scatter(&[1, 2], &ModelKind::ALL, None)?;
//! println!("DJS indep={:.4} ising={:.4}", scatter.djs[0], scatter.djs[1]);
//! ```
//!
//! ## Logging
//!
//! Events go through [`tracing`]; install a subscriber to see Ising
//! convergence warnings and survey progress.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod netstate;
mod result;
mod types;

// Functional modules
pub mod codes;
pub mod distribution;
pub mod ising;
pub mod metrics;
pub mod optimize;
pub mod population;
pub mod sampling;
pub mod survey;
pub mod thread_pool;

// Re-exports for public API
pub use codes::{build_codes, CodeMatrix, Word};
pub use config::{
    CodeConfig, Config, IsingConfig, SurveyConfig, DEFAULT_MAX_BITS, DEFAULT_TRES, DEFAULT_WORD_LEN,
};
pub use distribution::Distribution;
pub use error::{NetstateError, Result};
pub use ising::{fit_ising, IsingFit, IsingTargets};
pub use netstate::Netstate;
pub use optimize::Algorithm;
pub use population::{Population, SpikeSource};
pub use result::{CellCheck, Scatter, SpikeCountPmf};
pub use sampling::SubgroupSampler;
pub use survey::{DivergenceSurvey, EntropyScaling, InformationSurvey, IsingParameterSurvey};
pub use types::{ModelKind, NeuronId, SpatialRange, SpikeTrain, TimeWindow, Timestamp};
