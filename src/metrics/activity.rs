//! Population activity statistics that do not need a full word distribution.

use serde::{Deserialize, Serialize};

use crate::codes::CodeMatrix;
use crate::error::{NetstateError, Result};

/// PMF over `0..=n` of how many neurons are active in one bin.
///
/// Returns all zeros when the matrix has no bins.
pub fn spike_count_pmf(codes: &CodeMatrix) -> Vec<f64> {
    let n = codes.nneurons();
    let mut counts = vec![0.0; n + 1];
    for active in codes.active_counts() {
        counts[active] += 1.0;
    }
    let nbins = codes.nbins();
    if nbins > 0 {
        counts.iter_mut().for_each(|c| *c /= nbins as f64);
    }
    counts
}

/// Activity of one cell conditioned on how many other cells are active.
///
/// Column `m` of the `2 x (k + 1)` table holds `P(cell off | m active)` in
/// row 0 and `P(cell on | m active)` in row 1. Columns with no bins are
/// left at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalActivity {
    /// Row 0: cell off.
    pub off: Vec<f64>,
    /// Row 1: cell on.
    pub on: Vec<f64>,
}

impl ConditionalActivity {
    /// Number of columns, `k + 1`.
    pub fn len(&self) -> usize {
        self.on.len()
    }

    /// True for a zero-column table (never produced by [`conditional_activity`]).
    pub fn is_empty(&self) -> bool {
        self.on.is_empty()
    }
}

/// Conditional activity of `cell` given the active count among `others`.
///
/// All rows must have the same number of bins.
pub fn conditional_activity(cell: &[u8], others: &[&[u8]]) -> Result<ConditionalActivity> {
    if let Some(bad) = others.iter().find(|row| row.len() != cell.len()) {
        return Err(NetstateError::MismatchedInput(format!(
            "cell has {} bins but another row has {}",
            cell.len(),
            bad.len()
        )));
    }

    let k = others.len();
    let mut off = vec![0.0; k + 1];
    let mut on = vec![0.0; k + 1];
    for (bin, &state) in cell.iter().enumerate() {
        let active = others.iter().filter(|row| row[bin] != 0).count();
        if state != 0 {
            on[active] += 1.0;
        } else {
            off[active] += 1.0;
        }
    }

    for (a, b) in off.iter_mut().zip(on.iter_mut()) {
        let total = *a + *b;
        if total > 0.0 {
            *a /= total;
            *b /= total;
        }
    }
    Ok(ConditionalActivity { off, on })
}
