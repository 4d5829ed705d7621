//! Powell's conjugate direction method with golden-section line minimization.

use super::{MinimizeOptions, Minimum, Objective, Vector};

const GOLD: f64 = 1.618_033_988_749_895;
const INV_GOLD: f64 = 0.618_033_988_749_895;
const MAX_BRACKET_STEPS: usize = 60;
const MAX_SECTION_STEPS: usize = 200;

fn value_along<O: Objective + ?Sized>(objective: &O, x: &Vector, d: &Vector, t: f64) -> f64 {
    let v = objective.value(&(x + d * t));
    if v.is_nan() {
        f64::INFINITY
    } else {
        v
    }
}

/// Minimize `t -> f(x + t d)`; returns `(t, f)`, never worse than `(0, f0)`.
fn line_minimize<O: Objective + ?Sized>(objective: &O, x: &Vector, d: &Vector, f0: f64) -> (f64, f64) {
    let (mut a, mut fa) = (0.0, f0);
    let (mut b, mut fb) = (1.0, value_along(objective, x, d, 1.0));
    if fb > fa {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut c = b + GOLD * (b - a);
    let mut fc = value_along(objective, x, d, c);
    for _ in 0..MAX_BRACKET_STEPS {
        if fc >= fb {
            break;
        }
        a = b;
        fa = fb;
        b = c;
        fb = fc;
        c = b + GOLD * (b - a);
        fc = value_along(objective, x, d, c);
    }

    let (mut lo, mut hi) = if a < c { (a, c) } else { (c, a) };
    let mut x1 = hi - INV_GOLD * (hi - lo);
    let mut x2 = lo + INV_GOLD * (hi - lo);
    let mut f1 = value_along(objective, x, d, x1);
    let mut f2 = value_along(objective, x, d, x2);
    for _ in 0..MAX_SECTION_STEPS {
        if (hi - lo).abs() <= 1e-12 * (1.0 + 0.5 * (lo + hi).abs()) {
            break;
        }
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_GOLD * (hi - lo);
            f1 = value_along(objective, x, d, x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_GOLD * (hi - lo);
            f2 = value_along(objective, x, d, x2);
        }
    }

    [(0.0, f0), (a, fa), (b, fb), (c, fc), (x1, f1), (x2, f2)]
        .into_iter()
        .filter(|(_, f)| f.is_finite())
        .min_by(|p, q| p.1.total_cmp(&q.1))
        .unwrap_or((0.0, f0))
}

pub(super) fn minimize<O: Objective + ?Sized>(
    objective: &O,
    x0: Vector,
    options: &MinimizeOptions,
) -> Minimum {
    let n = objective.dim();
    let budget = options.max_iterations * n.max(1);
    let mut directions: Vec<Vector> = (0..n)
        .map(|i| {
            let mut e = Vector::zeros(n);
            e[i] = 1.0;
            e
        })
        .collect();

    let mut x = x0;
    let mut f = objective.value(&x);

    for iteration in 0..budget {
        let x_start = x.clone();
        let f_start = f;
        let mut biggest_drop = 0.0;
        let mut biggest_index = 0;

        for (i, d) in directions.iter().enumerate() {
            let f_before = f;
            let (t, f_new) = line_minimize(objective, &x, d, f);
            x += d * t;
            f = f_new;
            if f_before - f > biggest_drop {
                biggest_drop = f_before - f;
                biggest_index = i;
            }
        }

        if 2.0 * (f_start - f) <= options.tolerance * (f_start.abs() + f.abs()) + 1e-20 {
            return Minimum {
                x,
                value: f,
                iterations: iteration + 1,
                converged: true,
                stalled: false,
            };
        }

        let new_direction = &x - &x_start;
        let extrapolated = &x + &new_direction;
        let f_ext = objective.value(&extrapolated);
        if f_ext < f_start {
            let t = 2.0 * (f_start - 2.0 * f + f_ext) * (f_start - f - biggest_drop).powi(2)
                - biggest_drop * (f_start - f_ext).powi(2);
            if t < 0.0 {
                let (s, f_new) = line_minimize(objective, &x, &new_direction, f);
                x += &new_direction * s;
                f = f_new;
                let last = n - 1;
                directions.swap(biggest_index, last);
                directions[last] = new_direction;
            }
        }
    }

    Minimum {
        x,
        value: f,
        iterations: budget,
        converged: false,
        stalled: false,
    }
}
