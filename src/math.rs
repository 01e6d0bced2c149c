use std::f64::consts::PI;

#[inline(always)]
pub fn pi(v: f64) -> f64 {
    PI * v
}

/// Floored modulo: the result has the sign of `m`, so negative hues wrap into `[0, 360)`.
pub fn modulo(n: f64, m: f64) -> f64 {
    ((n % m) + m) % m
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn dist((x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> f64 {
    (x1 - x2).hypot(y1 - y2)
}

/// Computes the angle from `(x1, y1)` to `(x2, y2)`, as a value in radians from 0 to 2π.
pub fn angle((x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> f64 {
    modulo((y2 - y1).atan2(x2 - x1), pi(2.0))
}

/// Moves `point` toward `pointer` by `factor` of the way, scaled by a linear falloff that reaches
/// zero at `threshold` pixels.
pub fn pull_toward(
    point: (f64, f64),
    pointer: (f64, f64),
    threshold: f64,
    factor: f64,
) -> (f64, f64) {
    let influence = (1.0 - dist(point, pointer) / threshold).max(0.0);
    let t = influence * factor;
    (lerp(point.0, pointer.0, t), lerp(point.1, pointer.1, t))
}

/// Folds `value` into `[0, extent]` as if it bounced off both walls.
pub fn bounce(value: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return 0.0;
    }
    let folded = modulo(value, 2.0 * extent);
    if folded > extent {
        2.0 * extent - folded
    } else {
        folded
    }
}
