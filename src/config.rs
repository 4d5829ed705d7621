//! Configuration for code building, model fitting and surveys.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{NetstateError, Result};
use crate::optimize::Algorithm;
use crate::types::Timestamp;

/// Default bin width in recording time units (20 ms at microsecond resolution).
pub const DEFAULT_TRES: Timestamp = 20_000;

/// Default number of neurons per population word.
pub const DEFAULT_WORD_LEN: usize = 10;

/// Default cap on the number of bits enumerated by the Ising fit.
pub const DEFAULT_MAX_BITS: usize = 14;

/// Configuration options for `Netstate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Binning of spike trains into codes.
    pub code: CodeConfig,
    /// Ising model fitting.
    pub ising: IsingConfig,
    /// Multi-group surveys.
    pub survey: SurveyConfig,
}

/// How spike trains are binned into binary codes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CodeConfig {
    /// Bin width, same unit as spike timestamps (default: 20,000).
    pub tres: Timestamp,

    /// Bin phase in degrees of one bin (default: 0).
    ///
    /// The first left edge of every window sits at `start + tres * phase / 360`.
    pub phase: f64,

    /// Neurons per population word for random-group analyses (default: 10).
    pub word_len: usize,
}

/// Ising fit settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsingConfig {
    /// Minimizer used for moment matching (default: conjugate gradient).
    pub algorithm: Algorithm,

    /// Iteration budget for the minimizer (default: 1,000).
    pub max_iterations: usize,

    /// Convergence threshold on the moment mismatch (default: 1e-6).
    pub gradient_tolerance: f64,

    /// Largest word length the fitter will enumerate (default: 14).
    ///
    /// Every objective evaluation walks all `2^n` states, so this is a hard wall.
    pub max_bits: usize,
}

/// Settings shared by all surveys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Surveys with more groups than this run on the thread pool (default: 5).
    pub parallel_threshold: usize,

    /// Optional deterministic seed for group sampling and code shuffling.
    pub seed: Option<u64>,

    /// Shuffle each neuron's code independently before analysis (default: false).
    pub shuffle: bool,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            tres: DEFAULT_TRES,
            phase: 0.0,
            word_len: DEFAULT_WORD_LEN,
        }
    }
}

impl Default for IsingConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::ConjugateGradient,
            max_iterations: 1_000,
            gradient_tolerance: 1e-6,
            max_bits: DEFAULT_MAX_BITS,
        }
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 5,
            seed: None,
            shuffle: false,
        }
    }
}

impl CodeConfig {
    /// Offset of the first left bin edge from a window start.
    pub fn phase_offset(&self) -> Timestamp {
        (self.tres as f64 * self.phase / 360.0).round() as Timestamp
    }
}

impl Config {
    /// Small word length and iteration budget for tests and exploration.
    pub fn quick() -> Self {
        Self {
            code: CodeConfig {
                word_len: 5,
                ..CodeConfig::default()
            },
            ising: IsingConfig {
                max_iterations: 300,
                gradient_tolerance: 1e-7,
                ..IsingConfig::default()
            },
            survey: SurveyConfig::default(),
        }
    }

    /// Merge overrides from `NETSTATE_*` environment variables.
    ///
    /// Unset or unparsable variables leave the current value untouched.
    pub fn from_env(mut self) -> Self {
        if let Some(tres) = parse_env::<Timestamp>("NETSTATE_TRES") {
            self.code.tres = tres;
        }
        if let Some(phase) = parse_env::<f64>("NETSTATE_PHASE") {
            self.code.phase = phase;
        }
        if let Some(word_len) = parse_env::<usize>("NETSTATE_WORD_LEN") {
            self.code.word_len = word_len;
        }
        if let Some(algorithm) = parse_env::<Algorithm>("NETSTATE_ALGORITHM") {
            self.ising.algorithm = algorithm;
        }
        if let Some(iterations) = parse_env::<usize>("NETSTATE_MAX_ITERATIONS") {
            self.ising.max_iterations = iterations;
        }
        if let Some(seed) = parse_env::<u64>("NETSTATE_SEED") {
            self.survey.seed = Some(seed);
        }
        self
    }

    /// Check that every setting is inside its domain.
    pub fn validate(&self) -> Result<()> {
        if self.code.tres <= 0 {
            return Err(NetstateError::InvalidConfig(format!(
                "bin width must be positive, got {}",
                self.code.tres
            )));
        }
        if !self.code.phase.is_finite() {
            return Err(NetstateError::InvalidConfig("phase must be finite".into()));
        }
        if self.code.word_len == 0 {
            return Err(NetstateError::InvalidConfig("word length must be > 0".into()));
        }
        if self.code.word_len > self.ising.max_bits {
            return Err(NetstateError::TooManyBits {
                bits: self.code.word_len,
                max: self.ising.max_bits,
            });
        }
        if !(self.ising.gradient_tolerance > 0.0) {
            return Err(NetstateError::InvalidConfig(
                "gradient tolerance must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.trim().parse().ok()
}
