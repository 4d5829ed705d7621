//! Binary population codes.
//!
//! - [`build_codes`] turns spike trains into a [`CodeMatrix`]
//! - [`state_space`] converts between words and bit vectors and builds the
//!   truth table every `2^n`-length array is indexed by

mod builder;
pub mod state_space;

pub use builder::{bin_edges, build_codes, CodeMatrix};
pub use state_space::{
    bits_from_int, check_bits, full_truth_table, int_from_bits, TruthTable, Word,
};
