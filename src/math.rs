//! Small numeric helpers shared by the animators.

use std::f64::consts::PI;

/// Overshoot tension used by the docking animation.
pub const OVERSHOOT_TENSION: f64 = 2.0;

/// Moves from `start` towards a larger `end`.
pub fn enlarge(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Moves from `start` towards a smaller `end`.
pub fn reduce(start: f64, end: f64, t: f64) -> f64 {
    start - (start - end) * t
}

/// Maps `value` from `[min, max]` into `[0, 1]` (unclamped).
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 1.0;
    }
    (value - min) / (max - min)
}

pub fn between(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Inclusive on both ends.
pub fn is_between(value: f64, start: f64, end: f64) -> bool {
    value >= start && value <= end
}

/// Exponential smoothing: `a` is the weight given to the new sample.
pub fn smooth(prev: f64, next: f64, a: f64) -> f64 {
    a * next + (1.0 - a) * prev
}

pub fn rotate_x(x: f64, y: f64, cx: f64, cy: f64, degrees: f64) -> f64 {
    let rad = degrees * PI / 180.0;
    cx + (x - cx) * rad.cos() - (y - cy) * rad.sin()
}

pub fn rotate_y(x: f64, y: f64, cx: f64, cy: f64, degrees: f64) -> f64 {
    let rad = degrees * PI / 180.0;
    cy + (x - cx) * rad.sin() + (y - cy) * rad.cos()
}

/// Piecewise-linear curve through `(value, at)` knots sorted by `at`.
///
/// Outside the knot range the nearest knot's value is returned.
pub fn custom_function(t: f64, knots: &[(f64, f64)]) -> f64 {
    let Some(&(first_value, first_at)) = knots.first() else {
        return 0.0;
    };
    if t <= first_at {
        return first_value;
    }
    knots
        .windows(2)
        .find(|w| is_between(t, w[0].1, w[1].1))
        .map(|w| {
            let (v0, t0) = w[0];
            let (v1, t1) = w[1];
            enlarge(v0, v1, normalize(t, t0, t1))
        })
        .unwrap_or_else(|| knots[knots.len() - 1].0)
}

/// Slow start and end, fast middle.
pub fn accelerate_decelerate(t: f64) -> f64 {
    ((t + 1.0) * PI).cos() / 2.0 + 0.5
}

pub fn decelerate(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Runs past 1.0 and settles back; exactly 1.0 at `t == 1`.
pub fn overshoot(t: f64, tension: f64) -> f64 {
    let t = t - 1.0;
    t * t * ((tension + 1.0) * t + tension) + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_normalize_and_between() {
        assert!(approx(normalize(5.0, 0.0, 10.0), 0.5));
        assert!(approx(normalize(15.0, 10.0, 20.0), 0.5));
        assert_eq!(between(-3.0, 0.0, 255.0), 0.0);
        assert_eq!(between(300.0, 0.0, 255.0), 255.0);
        assert!(is_between(10.0, 0.0, 10.0));
        assert!(!is_between(10.1, 0.0, 10.0));
    }

    #[test]
    fn test_smooth_weights_new_sample() {
        assert!(approx(smooth(0.0, 100.0, 0.2), 20.0));
        assert!(approx(smooth(20.0, 100.0, 0.2), 36.0));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let x = rotate_x(10.0, 0.0, 0.0, 0.0, 90.0);
        let y = rotate_y(10.0, 0.0, 0.0, 0.0, 90.0);
        assert!(approx(x, 0.0));
        assert!(approx(y, 10.0));
    }

    #[test]
    fn test_custom_function_plateau() {
        let knots = [(0.0, 0.0), (255.0, 0.33), (255.0, 0.66), (0.0, 1.0)];
        assert_eq!(custom_function(0.0, &knots), 0.0);
        assert!(approx(custom_function(0.165, &knots), 127.5));
        assert_eq!(custom_function(0.5, &knots), 255.0);
        assert_eq!(custom_function(1.0, &knots), 0.0);
        assert_eq!(custom_function(1.5, &knots), 0.0);
    }

    #[test]
    fn test_easing_endpoints() {
        assert!(approx(accelerate_decelerate(0.0), 0.0));
        assert!(approx(accelerate_decelerate(1.0), 1.0));
        assert!(approx(accelerate_decelerate(0.5), 0.5));
        assert_eq!(overshoot(1.0, OVERSHOOT_TENSION), 1.0);
        assert_eq!(overshoot(0.0, OVERSHOOT_TENSION), 0.0);
        assert!(overshoot(0.7, OVERSHOOT_TENSION) > 1.0);
        assert!(approx(decelerate(1.0), 1.0));
    }
}
