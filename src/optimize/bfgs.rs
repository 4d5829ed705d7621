//! Dense BFGS with an inverse-Hessian approximation.

use nalgebra::DMatrix;

use super::line_search::strong_wolfe;
use super::{inf_norm, stalled_at, MinimizeOptions, Minimum, Objective, Vector};

const C2: f64 = 0.9;

pub(super) fn minimize<O: Objective + ?Sized>(
    objective: &O,
    x0: Vector,
    options: &MinimizeOptions,
) -> Minimum {
    let n = objective.dim();
    let mut x = x0;
    let (mut f, mut g) = objective.value_and_gradient(&x);
    let mut h = DMatrix::<f64>::identity(n, n);
    let mut first_step = true;

    for iteration in 0..options.max_iterations {
        if inf_norm(&g) < options.tolerance {
            return Minimum {
                x,
                value: f,
                iterations: iteration,
                converged: true,
                stalled: false,
            };
        }

        let mut d = -(&h * &g);
        if g.dot(&d) >= 0.0 {
            // Lost positive definiteness; fall back to steepest descent.
            h = DMatrix::identity(n, n);
            d = -&g;
        }

        let alpha_init = if first_step {
            1.0 / inf_norm(&g).max(1.0)
        } else {
            1.0
        };
        let Some(step) = strong_wolfe(objective, &x, f, &g, &d, alpha_init, C2) else {
            return stalled_at(x, f, &g, iteration, options.tolerance);
        };

        let s = &step.x - &x;
        let y = &step.gradient - &g;
        let sy = s.dot(&y);

        if sy > 1e-12 {
            if first_step {
                // Scale the initial approximation to the observed curvature.
                h = DMatrix::identity(n, n) * (sy / y.dot(&y));
                first_step = false;
            }
            let rho = 1.0 / sy;
            let hy = &h * &y;
            let yhy = y.dot(&hy);
            // H+ = H - rho (H y s' + s y' H) + (rho^2 y'Hy + rho) s s'
            h -= (&hy * s.transpose() + &s * hy.transpose()) * rho;
            h += (&s * s.transpose()) * (rho * rho * yhy + rho);
        }

        x = step.x;
        f = step.value;
        g = step.gradient;
    }

    let converged = inf_norm(&g) < options.tolerance;
    Minimum {
        x,
        value: f,
        iterations: options.max_iterations,
        converged,
        stalled: false,
    }
}
