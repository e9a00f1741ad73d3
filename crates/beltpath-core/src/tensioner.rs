//! Swing-arm tensioner placement.
//!
//! A tensioner pulley rides on an arm of fixed length pivoting about a fixed
//! point. Moving the arm changes how far the tensioner deflects the belt,
//! and so the belt length. [`TensionerArm::solve`] finds the arm angle at
//! which the belt reaches a target length.
//!
//! The search is bracketed:
//!
//! - the upper limit is the angle at which the tensioner just touches the
//!   strand the belt would take without it (shortest belt),
//! - the lower limit is the angle at which the tensioner comes within
//!   `clearance * (r_prev + r_t)` of the pulley feeding it (longest belt).
//!
//! Between the two the length falls monotonically as the angle grows, so a
//! plain bisection converges.

use crate::{
    angle,
    belt::Belt,
    cyclic,
    error::{BeltError, Result, ensure_finite, ensure_positive},
    geometry,
    point::Point,
    pulley::Pulley,
};
use serde::Serialize;
use std::f64::consts::{PI, TAU};

pub const DEFAULT_CLEARANCE: f64 = 1.1;
pub const DEFAULT_ACCURACY: f64 = 0.1;
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Arm geometry of a tensioner pulley already placed in a belt.
#[derive(Clone, Debug, PartialEq)]
pub struct TensionerArm {
    /// Slot of the tensioner pulley in the belt.
    pub index: usize,
    pub pivot: Point,
    pub arm_length: f64,
    /// Closest approach to the feeding pulley, as a multiple of the radius sum.
    pub clearance: f64,
}

/// Target and stopping rule for [`TensionerArm::solve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmSearch {
    pub target_length: f64,
    pub accuracy: f64,
    pub max_iterations: usize,
}

impl ArmSearch {
    pub fn new(target_length: f64) -> Self {
        Self {
            target_length,
            accuracy: DEFAULT_ACCURACY,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Arm angles bounding the search, both in `[0, 2π)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArmLimits {
    /// Tensioner closest to the feeding pulley.
    pub lower: f64,
    /// Tensioner tangent to the undeflected strand.
    pub upper: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArmSolution {
    /// Arm angle, in `[0, 2π)`.
    pub angle: f64,
    pub position: Point,
    pub length: f64,
    pub iterations: usize,
    pub limits: ArmLimits,
}

impl TensionerArm {
    pub fn new(index: usize, pivot: Point, arm_length: f64) -> Self {
        Self {
            index,
            pivot,
            arm_length,
            clearance: DEFAULT_CLEARANCE,
        }
    }

    /// Center of the tensioner pulley at arm angle `angle`.
    pub fn position_at(&self, angle: f64) -> Point {
        self.pivot.polar_offset(self.arm_length, angle)
    }

    /// Bracket the arm angle for the belt's current pulleys.
    pub fn limits(&self, belt: &Belt) -> Result<ArmLimits> {
        self.validate(belt)?;

        let n = belt.len();
        let pulleys = belt.pulleys();
        let tensioner = &pulleys[self.index];
        let feeding = &pulleys[cyclic::prev(self.index, n)];

        // The strand from the feeding pulley straight to the next one
        let others: Vec<Pulley> = pulleys
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != self.index)
            .map(|(_, p)| p.clone())
            .collect();
        let feeding_slot = if self.index == 0 { n - 2 } else { self.index - 1 };
        let bare = geometry::compute(&others)?;
        let strand = &bare.segments()[feeding_slot];
        let strand_angle = strand.global_tangent_angle;

        // Signed distance from the strand line to the pivot
        let hub_dx = self.pivot.x - strand.contact_out.x;
        let hub_dy = self.pivot.y - strand.contact_out.y;
        let perp_distance = (hub_dy.atan2(hub_dx) - strand_angle).sin() * hub_dx.hypot(hub_dy);

        let reach = (tensioner.radius() - perp_distance) / self.arm_length;
        if reach.abs() > 1.0 {
            return Err(BeltError::invalid_argument(
                "tensioner arm cannot reach the belt strand",
            ));
        }
        let upper = angle::normalize(strand_angle + reach.asin());

        // Law of cosines in the pivot / feeding pulley / tensioner triangle
        let side_a = self.pivot.distance_to(feeding.center());
        let side_b = self.clearance * (feeding.radius() + tensioner.radius());
        let side_c = self.arm_length;
        let cos_theta = (side_a * side_a + side_c * side_c - side_b * side_b) / (2.0 * side_a * side_c);
        if !(-1.0..=1.0).contains(&cos_theta) {
            return Err(BeltError::invalid_argument(
                "can't calculate the lower tensioner arm angle",
            ));
        }
        let feeding_to_pivot = angle::heading(
            self.pivot.x - feeding.x(),
            self.pivot.y - feeding.y(),
        );
        let lower = angle::normalize(feeding_to_pivot - (PI - cos_theta.acos()));

        tracing::debug!(
            lower_deg = lower.to_degrees(),
            upper_deg = upper.to_degrees(),
            "tensioner arm limits"
        );

        Ok(ArmLimits { lower, upper })
    }

    /// Swing the tensioner until the belt length is within
    /// `search.accuracy` of `search.target_length`.
    ///
    /// The belt is left with the tensioner at the last tried position, which
    /// is the solution on success.
    pub fn solve(&self, belt: &mut Belt, search: &ArmSearch) -> Result<ArmSolution> {
        let target = ensure_positive("target length", search.target_length)?;
        ensure_positive("length accuracy", search.accuracy)?;

        let limits = self.limits(belt)?;

        // Sweep counter-clockwise from lower to upper
        let mut lo = limits.lower;
        let mut hi = lo + (limits.upper - limits.lower).rem_euclid(TAU);
        let mut length = belt.total_length();

        for iteration in 1..=search.max_iterations {
            let mid = 0.5 * (lo + hi);
            let position = self.position_at(mid);
            belt.set_pulley_position(self.index, position.x, position.y)?;
            length = belt.total_length();

            tracing::debug!(
                iteration,
                angle_deg = mid.to_degrees(),
                length,
                target,
                "tensioner arm step"
            );

            if (length - target).abs() <= search.accuracy {
                return Ok(ArmSolution {
                    angle: angle::normalize(mid),
                    position,
                    length,
                    iterations: iteration,
                    limits,
                });
            }

            if length > target {
                // too long, swing further toward the strand
                lo = mid;
            } else {
                hi = mid;
            }
        }

        Err(BeltError::NoConvergence {
            iterations: search.max_iterations,
            length,
            target,
            hint: if length < target {
                "try a shorter belt"
            } else {
                "try a longer belt"
            },
        })
    }

    fn validate(&self, belt: &Belt) -> Result<()> {
        if belt.len() < 3 {
            return Err(BeltError::invalid_argument(
                "a tensioner arm needs at least three pulleys",
            ));
        }
        if self.index >= belt.len() {
            return Err(BeltError::index_out_of_range("tensioner", self.index, belt.len()));
        }
        ensure_finite("pivot x", self.pivot.x)?;
        ensure_finite("pivot y", self.pivot.y)?;
        ensure_positive("arm length", self.arm_length)?;
        if !self.clearance.is_finite() || self.clearance <= 1.0 {
            return Err(BeltError::invalid_argument("arm clearance must be greater than 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{forces::ForceOptions, pulley::Direction};
    use approx::assert_abs_diff_eq;

    const PITCH: f64 = 11.0;

    // Rear hub 440 mm behind the bottom bracket, tensioner on a 75 mm arm
    // hung below and behind the chainring.
    fn bike_belt() -> Belt {
        let rear = Pulley::new(Pulley::pitch_radius(21, PITCH), -440.0, 0.0, Direction::Clockwise)
            .and_then(|p| p.with_torque(-100_000.0))
            .unwrap();
        let front = Pulley::new(Pulley::pitch_radius(36, PITCH), 0.0, 0.0, Direction::Clockwise)
            .and_then(|p| p.with_torque(75_000.0))
            .unwrap();
        let tensioner = Pulley::new(25.0, 0.0, -200.0, Direction::CounterClockwise)
            .and_then(|p| p.with_torque(0.1))
            .unwrap();
        Belt::new(
            vec![rear, front, tensioner],
            ForceOptions::with_tensioner(0, 2, 12.0),
        )
        .unwrap()
    }

    fn bike_arm() -> TensionerArm {
        TensionerArm::new(2, Point::new(-50.0, -55.0), 75.0)
    }

    #[test]
    fn limits_bracket_the_arm() {
        let limits = bike_arm().limits(&bike_belt()).unwrap();
        assert_abs_diff_eq!(limits.lower.to_degrees(), 128.569, epsilon = 1e-3);
        assert_abs_diff_eq!(limits.upper.to_degrees(), 200.273, epsilon = 1e-3);
    }

    #[test]
    fn upper_limit_reproduces_the_bare_belt() {
        let arm = bike_arm();
        let mut belt = bike_belt();
        let limits = arm.limits(&belt).unwrap();
        // just shy of tangency, where the tensioner barely touches the strand
        let p = arm.position_at(limits.upper - 1e-4);
        belt.set_pulley_position(2, p.x, p.y).unwrap();

        let bare = geometry::compute(&belt.pulleys()[..2]).unwrap();
        assert!(belt.total_length() >= bare.total_length());
        assert_abs_diff_eq!(belt.total_length(), bare.total_length(), epsilon = 1e-3);
    }

    #[test]
    fn finds_arm_angle_for_target_length() {
        let arm = bike_arm();
        let mut belt = bike_belt();
        let target = PITCH * 111.0;
        let solution = arm.solve(&mut belt, &ArmSearch::new(target)).unwrap();

        assert!((solution.length - target).abs() <= 0.1);
        assert_eq!(solution.length, belt.total_length());
        assert!(solution.iterations <= DEFAULT_MAX_ITERATIONS);
        assert!(solution.angle > solution.limits.lower && solution.angle < solution.limits.upper);
        assert_abs_diff_eq!(solution.angle.to_degrees(), 149.58, epsilon = 0.05);
        assert_eq!(belt.pulley(2).unwrap().center(), solution.position);

        // the placed belt balances with a positive tension everywhere
        let forces = belt.forces().unwrap();
        assert!(forces.segments().iter().all(|s| s.local_tension > 0.0));
        let t = forces.segments();
        assert_abs_diff_eq!((t[1].local_tension + t[2].local_tension) / 2.0, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn unreachable_target_reports_direction() {
        let arm = bike_arm();
        let mut belt = bike_belt();
        let err = arm.solve(&mut belt, &ArmSearch::new(PITCH * 130.0)).unwrap_err();
        match err {
            BeltError::NoConvergence { hint, length, target, .. } => {
                assert!(length < target);
                assert_eq!(hint, "try a shorter belt");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = arm.solve(&mut belt, &ArmSearch::new(PITCH * 100.0)).unwrap_err();
        assert!(matches!(
            err,
            BeltError::NoConvergence {
                hint: "try a longer belt",
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_arm() {
        let belt = bike_belt();
        let mut arm = bike_arm();
        arm.arm_length = 0.0;
        assert!(arm.limits(&belt).is_err());

        let mut arm = bike_arm();
        arm.index = 3;
        assert!(arm.limits(&belt).is_err());

        // pivot far below the strand: the arm cannot reach it
        let arm = TensionerArm::new(2, Point::new(-200.0, -400.0), 75.0);
        assert!(arm.limits(&belt).is_err());

        let two = Belt::new(belt.pulleys()[..2].to_vec(), ForceOptions::default()).unwrap();
        assert!(bike_arm().limits(&two).is_err());
    }

    #[test]
    fn rejects_bad_search() {
        let arm = bike_arm();
        let mut belt = bike_belt();
        for (target, accuracy) in [(1221.0, f64::NAN), (1221.0, 0.0), (-5.0, 0.1), (f64::NAN, 0.1)] {
            let search = ArmSearch {
                accuracy,
                ..ArmSearch::new(target)
            };
            let err = arm.solve(&mut belt, &search).unwrap_err();
            assert!(matches!(err, BeltError::InvalidArgument(_)), "{err}");
        }

        let mut arm = bike_arm();
        arm.clearance = f64::NAN;
        assert!(arm.limits(&belt).is_err());
        arm.clearance = 1.0;
        assert!(arm.limits(&belt).is_err());
    }
}
