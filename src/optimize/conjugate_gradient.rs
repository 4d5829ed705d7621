//! Polak-Ribière+ nonlinear conjugate gradient.

use super::line_search::strong_wolfe;
use super::{inf_norm, stalled_at, MinimizeOptions, Minimum, Objective, Vector};

/// Curvature constant; CG needs a fairly exact line search.
const C2: f64 = 0.1;

pub(super) fn minimize<O: Objective + ?Sized>(
    objective: &O,
    x0: Vector,
    options: &MinimizeOptions,
) -> Minimum {
    let n = objective.dim();
    let mut x = x0;
    let (mut f, mut g) = objective.value_and_gradient(&x);
    let mut d = -&g;
    let mut steepest = true;
    let mut alpha_guess = 1.0 / inf_norm(&g).max(1.0);

    let mut iterations = 0;
    while iterations < options.max_iterations {
        let iteration = iterations;
        iterations += 1;

        if inf_norm(&g) < options.tolerance {
            return Minimum {
                x,
                value: f,
                iterations: iteration,
                converged: true,
                stalled: false,
            };
        }

        // Restart along steepest descent whenever d stops being downhill.
        if g.dot(&d) >= 0.0 {
            d = -&g;
            steepest = true;
        }

        let Some(step) = strong_wolfe(objective, &x, f, &g, &d, alpha_guess, C2) else {
            if steepest {
                return stalled_at(x, f, &g, iterations, options.tolerance);
            }
            d = -&g;
            steepest = true;
            continue;
        };

        let g_new = step.gradient;
        let y = &g_new - &g;
        let beta = (g_new.dot(&y) / g.dot(&g)).max(0.0);
        let slope_old = g.dot(&d);

        if beta == 0.0 || (iteration + 1) % n.max(1) == 0 {
            d = -&g_new;
            steepest = true;
        } else {
            d = -&g_new + &d * beta;
            steepest = false;
        }

        // Next trial step from the previous one's first-order decrease.
        let slope_new = g_new.dot(&d);
        alpha_guess = if slope_new < 0.0 {
            (step.alpha * slope_old / slope_new).clamp(1e-10, 1e10)
        } else {
            1.0
        };

        x = step.x;
        f = step.value;
        g = g_new;
    }

    let converged = inf_norm(&g) < options.tolerance;
    Minimum {
        x,
        value: f,
        iterations,
        converged,
        stalled: false,
    }
}
