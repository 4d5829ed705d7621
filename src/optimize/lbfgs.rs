//! Limited-memory BFGS (two-loop recursion).

use std::collections::VecDeque;

use super::line_search::strong_wolfe;
use super::{inf_norm, stalled_at, MinimizeOptions, Minimum, Objective, Vector};

const C2: f64 = 0.9;

/// Number of curvature pairs kept.
const MEMORY: usize = 10;

struct Pair {
    s: Vector,
    y: Vector,
    rho: f64,
}

fn two_loop(g: &Vector, history: &VecDeque<Pair>) -> Vector {
    let mut q = g.clone();
    let mut alphas = Vec::with_capacity(history.len());
    for pair in history.iter().rev() {
        let a = pair.rho * pair.s.dot(&q);
        q -= &pair.y * a;
        alphas.push(a);
    }

    let gamma = history
        .back()
        .map_or(1.0, |p| p.s.dot(&p.y) / p.y.dot(&p.y));
    let mut r = q * gamma;

    for (pair, a) in history.iter().zip(alphas.into_iter().rev()) {
        let b = pair.rho * pair.y.dot(&r);
        r += &pair.s * (a - b);
    }
    -r
}

pub(super) fn minimize<O: Objective + ?Sized>(
    objective: &O,
    x0: Vector,
    options: &MinimizeOptions,
) -> Minimum {
    let mut x = x0;
    let (mut f, mut g) = objective.value_and_gradient(&x);
    let mut history: VecDeque<Pair> = VecDeque::with_capacity(MEMORY);

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

        let mut d = two_loop(&g, &history);
        if g.dot(&d) >= 0.0 {
            history.clear();
            d = -&g;
        }

        let alpha_init = if history.is_empty() {
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
            if history.len() == MEMORY {
                history.pop_front();
            }
            history.push_back(Pair { s, y, rho: 1.0 / sy });
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
