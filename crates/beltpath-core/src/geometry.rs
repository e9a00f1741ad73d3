//! Belt path geometry around a closed loop of pulleys.
//!
//! The computation runs in two passes. The first walks every segment
//! `i -> next(i)` and finds the tangent line joining the two pulleys; the
//! second walks every pulley and measures the arc between the incoming and
//! outgoing tangents.
//!
//! A single formula covers both tangent types. With signed radii
//! `s = r * dir`, the tangent leaving pulley `i` for pulley `j` makes the
//! angle
//!
//! ```text
//! local = asin((s_j - s_i) / d)
//! ```
//!
//! with the center line, where `d` is the center distance. Equal
//! directions pick the outer tangent, opposite directions the crossed one.

use crate::{
    angle,
    cyclic,
    error::{BeltError, Result},
    point::Point,
    pulley::Pulley,
};
use serde::Serialize;
use std::f64::consts::FRAC_PI_2;

/// Pulley centers must be at least `MIN_SPACE * (r_i + r_j)` apart.
///
/// Must stay above 1 so the tangent equations always have a solution.
pub const MIN_SPACE: f64 = 1.01;

/// Geometry of pulley `i` and of the segment leaving it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SegmentGeometry {
    /// Distance from pulley `i` to its successor.
    pub c2c_length: f64,
    /// Direction from pulley `i` to its successor, in `[0, 2π)`.
    pub c2c_angle: f64,
    pub tangent_length: f64,
    /// Tangent angle relative to the center line.
    pub local_tangent_angle: f64,
    /// Tangent angle in the plane, in `[0, 2π)`.
    pub global_tangent_angle: f64,
    /// Arc the belt traces around pulley `i`, in `[0, 2π)`.
    pub wrap_angle: f64,
    pub wrap_length: f64,
    /// Where the incoming segment touches pulley `i`.
    pub contact_in: Point,
    /// Where the outgoing segment leaves pulley `i`.
    pub contact_out: Point,
}

/// Result of [`compute`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Geometry {
    segments: Vec<SegmentGeometry>,
    total_length: f64,
}

impl Geometry {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of every wrap length and tangent length.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    pub fn segment(&self, index: usize) -> Option<&SegmentGeometry> {
        self.segments.get(index)
    }

    pub fn segments(&self) -> &[SegmentGeometry] {
        &self.segments
    }

    pub fn global_tangent_angle(&self, index: usize) -> Option<f64> {
        self.segment(index).map(|s| s.global_tangent_angle)
    }
}

/// Compute the belt path around `pulleys`, taken as a closed loop.
pub fn compute(pulleys: &[Pulley]) -> Result<Geometry> {
    let n = pulleys.len();
    if n < 2 {
        return Err(BeltError::InsufficientPulleys { count: n });
    }

    let mut segments = vec![SegmentGeometry::default(); n];

    // First pass: center lines and tangents
    for i in 0..n {
        let j = cyclic::next(i, n);
        let (p_i, p_j) = (&pulleys[i], &pulleys[j]);

        let dx = p_j.x() - p_i.x();
        let dy = p_j.y() - p_i.y();
        let centre_delta = dx.hypot(dy);

        let minimum = (p_i.radius() + p_j.radius()) * MIN_SPACE;
        if centre_delta < minimum {
            return Err(BeltError::PulleysTooClose {
                first: i,
                second: j,
                distance: centre_delta,
                minimum,
            });
        }

        // |radius_delta| < centre_delta is guaranteed by the spacing check
        let radius_delta = p_j.signed_radius() - p_i.signed_radius();
        let c2c_angle = angle::heading(dx, dy);
        let local_tangent_angle = (radius_delta / centre_delta).asin();

        let seg = &mut segments[i];
        seg.c2c_length = centre_delta;
        seg.c2c_angle = c2c_angle;
        seg.tangent_length =
            (centre_delta * centre_delta - radius_delta * radius_delta).sqrt();
        seg.local_tangent_angle = local_tangent_angle;
        seg.global_tangent_angle = angle::normalize(local_tangent_angle + c2c_angle);
    }

    // Second pass: wraps and contact points
    for (k, i, _) in cyclic::neighbours(n) {
        let p = &pulleys[i];
        let dir = p.direction().sign();
        let tangent_in = segments[k].global_tangent_angle;
        let tangent_out = segments[i].global_tangent_angle;

        let seg = &mut segments[i];
        // Incoming minus outgoing for clockwise pulleys, the reverse otherwise
        seg.wrap_angle = angle::normalize(dir * (tangent_in - tangent_out));
        seg.wrap_length = seg.wrap_angle * p.radius();

        let normal_in = tangent_in + dir * FRAC_PI_2;
        let normal_out = tangent_out + dir * FRAC_PI_2;
        seg.contact_in = p.center().polar_offset(p.radius(), normal_in);
        seg.contact_out = p.center().polar_offset(p.radius(), normal_out);
    }

    let total_length = segments
        .iter()
        .map(|s| s.wrap_length + s.tangent_length)
        .sum();

    tracing::debug!(pulleys = n, total_length, "computed belt geometry");

    Ok(Geometry {
        segments,
        total_length,
    })
}
