//! Nelder-Mead downhill simplex.

use super::{MinimizeOptions, Minimum, Objective, Vector};

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

fn value_or_inf<O: Objective + ?Sized>(objective: &O, x: &Vector) -> f64 {
    let v = objective.value(x);
    if v.is_nan() {
        f64::INFINITY
    } else {
        v
    }
}

fn initial_simplex(x0: &Vector) -> Vec<Vector> {
    let mut simplex = vec![x0.clone()];
    for i in 0..x0.len() {
        let mut vertex = x0.clone();
        vertex[i] = if vertex[i] != 0.0 {
            vertex[i] * 1.05
        } else {
            0.00025
        };
        simplex.push(vertex);
    }
    simplex
}

/// Minimize with restarts.
///
/// A simplex can collapse onto a subspace and report convergence away from
/// the minimum, so every converged search is restarted with a fresh simplex
/// around its best point until a restart stops improving the value.
pub(super) fn minimize<O: Objective + ?Sized>(
    objective: &O,
    x0: Vector,
    options: &MinimizeOptions,
) -> Minimum {
    let budget = options.max_iterations * objective.dim().max(1);
    let mut best = search(objective, x0, options, budget);
    let mut used = best.iterations;

    while best.converged && used < budget {
        let restart = search(objective, best.x.clone(), options, budget - used);
        used += restart.iterations;
        let improvement = best.value - restart.value;
        if improvement > 0.0 {
            best = restart;
        }
        if improvement <= options.tolerance {
            break;
        }
    }

    best.iterations = used;
    best
}

fn search<O: Objective + ?Sized>(
    objective: &O,
    x0: Vector,
    options: &MinimizeOptions,
    budget: usize,
) -> Minimum {
    let n = objective.dim();
    let x_tolerance = options.tolerance.sqrt();

    let mut simplex = initial_simplex(&x0);
    let mut values: Vec<f64> = simplex.iter().map(|x| value_or_inf(objective, x)).collect();

    for iteration in 0..budget {
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let f_spread = values[n] - values[0];
        let x_spread = simplex[1..]
            .iter()
            .map(|v| (v - &simplex[0]).amax())
            .fold(0.0, f64::max);
        if f_spread <= options.tolerance && x_spread <= x_tolerance {
            return Minimum {
                x: simplex.swap_remove(0),
                value: values[0],
                iterations: iteration,
                converged: true,
                stalled: false,
            };
        }

        let centroid = simplex[..n]
            .iter()
            .fold(Vector::zeros(n), |acc, v| acc + v)
            / n.max(1) as f64;
        let worst = simplex[n].clone();

        let reflected = &centroid + (&centroid - &worst) * REFLECT;
        let f_reflected = value_or_inf(objective, &reflected);

        if f_reflected < values[0] {
            let expanded = &centroid + (&reflected - &centroid) * EXPAND;
            let f_expanded = value_or_inf(objective, &expanded);
            if f_expanded < f_reflected {
                simplex[n] = expanded;
                values[n] = f_expanded;
            } else {
                simplex[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n.saturating_sub(1)] {
            simplex[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        let (contracted, f_contracted, accept) = if f_reflected < values[n] {
            let c = &centroid + (&reflected - &centroid) * CONTRACT;
            let fc = value_or_inf(objective, &c);
            let accept = fc <= f_reflected;
            (c, fc, accept)
        } else {
            let c = &centroid + (&worst - &centroid) * CONTRACT;
            let fc = value_or_inf(objective, &c);
            let accept = fc < values[n];
            (c, fc, accept)
        };

        if accept {
            simplex[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        let best = simplex[0].clone();
        for i in 1..=n {
            simplex[i] = &best + (&simplex[i] - &best) * SHRINK;
            values[i] = value_or_inf(objective, &simplex[i]);
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);
    Minimum {
        x: simplex.swap_remove(best),
        value: values[best],
        iterations: budget,
        converged: false,
        stalled: false,
    }
}
