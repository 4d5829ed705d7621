//! Unconstrained minimizers used for moment matching.
//!
//! All methods minimize a smooth [`Objective`] from a starting point and
//! return the best point found, converged or not:
//!
//! 1. **Conjugate gradient** ([`conjugate_gradient`]): Polak-Ribière+ with restarts
//! 2. **BFGS** ([`bfgs`]): dense inverse-Hessian quasi-Newton
//! 3. **L-BFGS** ([`lbfgs`]): limited-memory two-loop recursion
//! 4. **Powell** ([`powell`]): derivative-free conjugate directions
//! 5. **Nelder-Mead** ([`nelder_mead`]): derivative-free simplex
//!
//! Gradient methods stop when the gradient infinity norm drops below the
//! tolerance, or when the line search can no longer find a decrease and the
//! gradient is already at the precision floor of the objective (reported as
//! `stalled`). Derivative-free methods stop when the objective spread across
//! their working points drops below the tolerance.

mod bfgs;
mod conjugate_gradient;
mod lbfgs;
mod line_search;
mod nelder_mead;
mod powell;

use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::NetstateError;

/// Parameter and gradient vectors.
pub type Vector = DVector<f64>;

/// A differentiable scalar function of a parameter vector.
pub trait Objective {
    /// Number of parameters.
    fn dim(&self) -> usize;

    /// Objective value at `x`.
    fn value(&self, x: &Vector) -> f64;

    /// Objective value and gradient at `x`.
    fn value_and_gradient(&self, x: &Vector) -> (f64, Vector);
}

/// Minimization method, also parseable from its short name ("CG", "BFGS", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Nonlinear conjugate gradient ("CG").
    ConjugateGradient,
    /// Broyden-Fletcher-Goldfarb-Shanno ("BFGS").
    Bfgs,
    /// Limited-memory BFGS ("LBFGSB", "L-BFGS").
    LBfgs,
    /// Powell's conjugate direction method ("Powell").
    Powell,
    /// Nelder-Mead downhill simplex ("Nelder-Mead").
    NelderMead,
}

impl Algorithm {
    /// Every method, gradient-based first.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::ConjugateGradient,
        Algorithm::Bfgs,
        Algorithm::LBfgs,
        Algorithm::Powell,
        Algorithm::NelderMead,
    ];

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConjugateGradient => "CG",
            Self::Bfgs => "BFGS",
            Self::LBfgs => "L-BFGS",
            Self::Powell => "Powell",
            Self::NelderMead => "Nelder-Mead",
        }
    }

    /// Whether the method uses gradients.
    pub fn uses_gradient(&self) -> bool {
        matches!(self, Self::ConjugateGradient | Self::Bfgs | Self::LBfgs)
    }

    /// Minimize `objective` starting from `x0`.
    pub fn minimize<O: Objective + ?Sized>(
        &self,
        objective: &O,
        x0: Vector,
        options: &MinimizeOptions,
    ) -> Minimum {
        assert_eq!(x0.len(), objective.dim(), "starting point has wrong dimension");
        match self {
            Self::ConjugateGradient => conjugate_gradient::minimize(objective, x0, options),
            Self::Bfgs => bfgs::minimize(objective, x0, options),
            Self::LBfgs => lbfgs::minimize(objective, x0, options),
            Self::Powell => powell::minimize(objective, x0, options),
            Self::NelderMead => nelder_mead::minimize(objective, x0, options),
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::ConjugateGradient
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = NetstateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "cg" | "conjugategradient" => Ok(Self::ConjugateGradient),
            "bfgs" => Ok(Self::Bfgs),
            "lbfgs" | "lbfgsb" => Ok(Self::LBfgs),
            "powell" => Ok(Self::Powell),
            "neldermead" | "simplex" => Ok(Self::NelderMead),
            _ => Err(NetstateError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Stopping criteria shared by all methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeOptions {
    /// Iteration budget. Derivative-free methods get this many sweeps per
    /// dimension.
    pub max_iterations: usize,
    /// Gradient norm (or objective spread) at which to stop.
    pub tolerance: f64,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1_000,
            tolerance: 1e-6,
        }
    }
}

/// Best point found by a minimizer.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Location of the best point.
    pub x: Vector,
    /// Objective value there.
    pub value: f64,
    /// Iterations used.
    pub iterations: usize,
    /// Whether the stopping criterion was met within the budget.
    pub converged: bool,
    /// Converged at the precision floor rather than below the tolerance.
    pub stalled: bool,
}

/// Multiple of `sqrt(eps * |f|)` at which a stalled line search still counts
/// as converged.
const STALL_FACTOR: f64 = 10.0;

#[inline]
pub(crate) fn inf_norm(v: &Vector) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}

/// Smallest gradient norm a line search can still act on at objective value
/// `f`: below it the decrease `~|g|^2` is lost in the rounding of `f`.
pub(crate) fn precision_floor(f: f64) -> f64 {
    STALL_FACTOR * (f64::EPSILON * f.abs().max(1.0)).sqrt()
}

/// Result of a gradient method whose line search found no decrease at `x`.
///
/// Counts as converged when the gradient is below the tolerance or at the
/// precision floor.
pub(super) fn stalled_at(x: Vector, f: f64, g: &Vector, iterations: usize, tolerance: f64) -> Minimum {
    let norm = inf_norm(g);
    let converged = norm < tolerance || norm <= precision_floor(f);
    Minimum {
        x,
        value: f,
        iterations,
        converged,
        stalled: converged && norm >= tolerance,
    }
}

#[cfg(test)]
pub(crate) mod test_functions {
    use super::*;

    /// Shifted anisotropic quadratic with minimum 0 at (1, -2, 3).
    pub struct Quadratic;

    impl Objective for Quadratic {
        fn dim(&self) -> usize {
            3
        }

        fn value(&self, x: &Vector) -> f64 {
            (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 2.0).powi(2) + 0.5 * (x[2] - 3.0).powi(2)
        }

        fn value_and_gradient(&self, x: &Vector) -> (f64, Vector) {
            let g = Vector::from_vec(vec![
                2.0 * (x[0] - 1.0),
                20.0 * (x[1] + 2.0),
                x[2] - 3.0,
            ]);
            (self.value(x), g)
        }
    }

    /// Two-dimensional Rosenbrock, minimum 0 at (1, 1).
    pub struct Rosenbrock;

    impl Objective for Rosenbrock {
        fn dim(&self) -> usize {
            2
        }

        fn value(&self, x: &Vector) -> f64 {
            (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
        }

        fn value_and_gradient(&self, x: &Vector) -> (f64, Vector) {
            let g = Vector::from_vec(vec![
                -2.0 * (1.0 - x[0]) - 400.0 * x[0] * (x[1] - x[0] * x[0]),
                200.0 * (x[1] - x[0] * x[0]),
            ]);
            (self.value(x), g)
        }
    }
}
