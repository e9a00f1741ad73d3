//! Static force balance of the belt.
//!
//! Each pulley changes the belt tension by `dir * T / r` as the belt passes
//! over it. Torques around the loop must balance, which fixes the torque of
//! the single unknown-torque pulley. The tensions are then known up to a
//! constant offset, pinned either by a minimum tension or by the average
//! tension at a tensioner pulley.

use crate::{
    angle,
    cyclic,
    error::{BeltError, Result, ensure_non_negative},
    geometry::Geometry,
    pulley::Pulley,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Inputs of the force solve other than the pulleys themselves.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceOptions {
    /// Pulley whose torque is solved for.
    pub unknown_torque_index: usize,
    /// Lowest tension in the belt when there is no tensioner.
    pub min_tension: f64,
    /// Pulley whose average in/out tension is pinned.
    pub tensioner_index: Option<usize>,
    /// Average tension at the tensioner pulley.
    pub tensioner_tension: f64,
}

impl ForceOptions {
    pub fn with_min_tension(unknown_torque_index: usize, min_tension: f64) -> Self {
        Self {
            unknown_torque_index,
            min_tension,
            ..Self::default()
        }
    }

    pub fn with_tensioner(unknown_torque_index: usize, index: usize, tension: f64) -> Self {
        Self {
            unknown_torque_index,
            tensioner_index: Some(index),
            tensioner_tension: tension,
            ..Self::default()
        }
    }

    /// Check indices against a loop of `len` pulleys and tensions for sign.
    pub fn validate(&self, len: usize) -> Result<()> {
        if self.unknown_torque_index >= len {
            return Err(BeltError::index_out_of_range(
                "unknown torque",
                self.unknown_torque_index,
                len,
            ));
        }
        if let Some(index) = self.tensioner_index.filter(|&index| index >= len) {
            return Err(BeltError::index_out_of_range("tensioner", index, len));
        }
        ensure_non_negative("minimum tension", self.min_tension)?;
        ensure_non_negative("tensioner tension", self.tensioner_tension)?;
        Ok(())
    }
}

/// Force results for pulley `i` and the segment leaving it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SegmentForces {
    /// Tension in the segment from pulley `i` to its successor.
    pub local_tension: f64,
    /// Magnitude of the bearing reaction on pulley `i`.
    pub reaction_force: f64,
    /// Direction of the bearing reaction, in `[0, 2π)`.
    pub reaction_angle: f64,
}

/// Result of [`compute`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Forces {
    unknown_torque_index: usize,
    solved_torque: f64,
    segments: Vec<SegmentForces>,
}

impl Forces {
    pub fn unknown_torque_index(&self) -> usize {
        self.unknown_torque_index
    }

    /// Torque the unknown-torque pulley must carry for the loop to balance.
    pub fn solved_torque(&self) -> f64 {
        self.solved_torque
    }

    pub fn segment(&self, index: usize) -> Option<&SegmentForces> {
        self.segments.get(index)
    }

    pub fn segments(&self) -> &[SegmentForces] {
        &self.segments
    }

    pub fn tension(&self, index: usize) -> Option<f64> {
        self.segment(index).map(|s| s.local_tension)
    }

    /// Torque of pulley `index` with the solved value substituted. `None` when
    /// `index` is not a pulley of `pulleys`.
    pub fn torque_of(&self, pulleys: &[Pulley], index: usize) -> Option<f64> {
        let pulley = pulleys.get(index)?;
        if index == self.unknown_torque_index {
            Some(self.solved_torque)
        } else {
            Some(pulley.torque())
        }
    }
}

/// Solve torques, tensions and bearing reactions.
///
/// `geometry` must have been computed from the same `pulleys`.
pub fn compute(pulleys: &[Pulley], geometry: &Geometry, options: &ForceOptions) -> Result<Forces> {
    let n = pulleys.len();
    if n < 2 {
        return Err(BeltError::InsufficientPulleys { count: n });
    }
    if geometry.len() != n {
        return Err(BeltError::invalid_argument(format!(
            "geometry covers {} pulleys but {n} were given",
            geometry.len()
        )));
    }
    options.validate(n)?;

    let ut = options.unknown_torque_index;

    // Torque balance over every pulley except the unknown one
    let known: f64 = pulleys
        .iter()
        .enumerate()
        .filter(|&(m, _)| m != ut)
        .map(|(_, p)| p.tension_step(p.torque()))
        .sum();
    let unknown = &pulleys[ut];
    let solved_torque = -(unknown.direction().sign() * known * unknown.radius());

    let torque_of = |i: usize| {
        if i == ut {
            solved_torque
        } else {
            pulleys[i].torque()
        }
    };

    // Tension in each segment relative to segment 0
    let mut tensions = vec![0.0; n];
    for i in 1..n {
        tensions[i] = tensions[i - 1] - pulleys[i].tension_step(torque_of(i));
    }

    let offset = match options.tensioner_index {
        None => options.min_tension - min_with_index(&tensions).1,
        Some(ti) => {
            // (tension_in + tension_out) / 2 == tensioner_tension
            options.tensioner_tension
                - tensions[ti]
                - pulleys[ti].tension_step(torque_of(ti)) / 2.0
        }
    };
    for t in &mut tensions {
        *t += offset;
    }

    // Overflowing steps leave NaN, which the sign check below never flags
    if let Some((index, tension)) = tensions.iter().enumerate().find(|(_, t)| !t.is_finite()) {
        return Err(BeltError::invalid_argument(format!(
            "tension in segment {index} is {tension}, torques are too large for the pulley radii"
        )));
    }
    let (index, tension) = min_with_index(&tensions);
    if tension < 0.0 {
        return Err(BeltError::NegativeTension { index, tension });
    }

    let segments = cyclic::neighbours(n)
        .map(|(k, i, _)| {
            let tangent_in = geometry.segments()[k].global_tangent_angle;
            let tangent_out = geometry.segments()[i].global_tangent_angle;

            let rx = tensions[k] * tangent_in.cos() + tensions[i] * (tangent_out + PI).cos();
            let ry = tensions[k] * tangent_in.sin() + tensions[i] * (tangent_out + PI).sin();

            SegmentForces {
                local_tension: tensions[i],
                reaction_force: ry.hypot(rx),
                reaction_angle: angle::heading(rx, ry),
            }
        })
        .collect();

    tracing::debug!(
        unknown_torque_index = ut,
        solved_torque,
        offset,
        min_tension = tension,
        "solved belt forces"
    );

    Ok(Forces {
        unknown_torque_index: ut,
        solved_torque,
        segments,
    })
}

// First index holding the smallest value.
fn min_with_index(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, v)| if v < best.1 { (i, v) } else { best })
}
