// Angle helpers

use std::f64::consts::TAU;

/// Folds an angle into `[0, 2π)`.
///
/// `rem_euclid` can round a tiny negative input up to exactly `2π`, which
/// would break the half-open range, so that case folds back to zero.
pub fn normalize(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Polar angle of `(x, y)` in `[0, 2π)`.
pub fn heading(dx: f64, dy: f64) -> f64 {
    normalize(dy.atan2(dx))
}
