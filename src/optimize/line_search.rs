//! Strong-Wolfe line search (bracketing + zoom).

use super::{Objective, Vector};

const MAX_BRACKET_STEPS: usize = 40;
const MAX_ZOOM_STEPS: usize = 60;

/// Sufficient-decrease constant.
pub(super) const C1: f64 = 1e-4;

/// An accepted step along the search direction.
#[derive(Debug, Clone)]
pub(super) struct Step {
    pub alpha: f64,
    pub x: Vector,
    pub value: f64,
    pub gradient: Vector,
}

struct Trial {
    alpha: f64,
    value: f64,
    slope: f64,
    step: Step,
}

fn trial<O: Objective + ?Sized>(objective: &O, x: &Vector, d: &Vector, alpha: f64) -> Trial {
    let x_new = x + d * alpha;
    let (value, gradient) = objective.value_and_gradient(&x_new);
    let slope = gradient.dot(d);
    Trial {
        alpha,
        value,
        slope,
        step: Step {
            alpha,
            x: x_new,
            value,
            gradient,
        },
    }
}

/// Find a step satisfying the strong Wolfe conditions with curvature
/// constant `c2`.
///
/// `d` must be a descent direction (`g0 . d < 0`). Returns `None` if no step
/// decreasing the objective was found.
pub(super) fn strong_wolfe<O: Objective + ?Sized>(
    objective: &O,
    x: &Vector,
    f0: f64,
    g0: &Vector,
    d: &Vector,
    alpha_init: f64,
    c2: f64,
) -> Option<Step> {
    let slope0 = g0.dot(d);
    if !(slope0 < 0.0) {
        return None;
    }

    let mut prev: Option<Trial> = None;
    let mut alpha = alpha_init;

    for i in 0..MAX_BRACKET_STEPS {
        let current = trial(objective, x, d, alpha);

        if !current.value.is_finite() {
            // Overshot into overflow; back off towards the last good point.
            alpha = 0.5 * (alpha + prev.as_ref().map_or(0.0, |p| p.alpha));
            continue;
        }

        let prev_value = prev.as_ref().map_or(f0, |p| p.value);
        if current.value > f0 + C1 * alpha * slope0 || (i > 0 && current.value >= prev_value) {
            return zoom(objective, x, f0, slope0, d, c2, prev, current);
        }
        if current.slope.abs() <= -c2 * slope0 {
            return Some(current.step);
        }
        if current.slope >= 0.0 {
            return zoom(objective, x, f0, slope0, d, c2, Some(current), prev_as_hi(prev, f0, slope0));
        }

        alpha *= 2.0;
        prev = Some(current);
    }

    prev.filter(|p| p.value < f0).map(|p| p.step)
}

/// Reinterpret the previous trial (or the origin) as the upper bracket end.
fn prev_as_hi(prev: Option<Trial>, f0: f64, slope0: f64) -> Trial {
    prev.unwrap_or(Trial {
        alpha: 0.0,
        value: f0,
        slope: slope0,
        step: Step {
            alpha: 0.0,
            x: Vector::zeros(0),
            value: f0,
            gradient: Vector::zeros(0),
        },
    })
}

#[allow(clippy::too_many_arguments)]
fn zoom<O: Objective + ?Sized>(
    objective: &O,
    x: &Vector,
    f0: f64,
    slope0: f64,
    d: &Vector,
    c2: f64,
    lo: Option<Trial>,
    hi: Trial,
) -> Option<Step> {
    let (mut lo_alpha, mut lo_value, mut lo_slope) = match &lo {
        Some(t) => (t.alpha, t.value, t.slope),
        None => (0.0, f0, slope0),
    };
    let mut lo_step = lo.map(|t| t.step);
    let (mut hi_alpha, mut hi_value) = (hi.alpha, hi.value);

    for _ in 0..MAX_ZOOM_STEPS {
        let width = hi_alpha - lo_alpha;
        if width.abs() <= 1e-16 * lo_alpha.abs().max(1.0) {
            break;
        }

        // Quadratic through (lo, f_lo, f'_lo) and (hi, f_hi), safeguarded
        // to the interior of the bracket.
        let curvature = (hi_value - lo_value - lo_slope * width) / (width * width);
        let mut alpha = if curvature > 0.0 && curvature.is_finite() {
            lo_alpha - lo_slope / (2.0 * curvature)
        } else {
            lo_alpha + 0.5 * width
        };
        let (a, b) = if lo_alpha < hi_alpha {
            (lo_alpha, hi_alpha)
        } else {
            (hi_alpha, lo_alpha)
        };
        let margin = 0.1 * (b - a);
        if !(alpha > a + margin && alpha < b - margin) {
            alpha = 0.5 * (a + b);
        }

        let current = trial(objective, x, d, alpha);
        if !current.value.is_finite()
            || current.value > f0 + C1 * alpha * slope0
            || current.value >= lo_value
        {
            hi_alpha = alpha;
            hi_value = if current.value.is_finite() {
                current.value
            } else {
                f64::MAX
            };
            continue;
        }

        if current.slope.abs() <= -c2 * slope0 {
            return Some(current.step);
        }
        if current.slope * (hi_alpha - lo_alpha) >= 0.0 {
            hi_alpha = lo_alpha;
            hi_value = lo_value;
        }
        lo_alpha = current.alpha;
        lo_value = current.value;
        lo_slope = current.slope;
        lo_step = Some(current.step);
    }

    lo_step.filter(|s| s.value < f0)
}
