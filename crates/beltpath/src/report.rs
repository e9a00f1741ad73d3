use beltpath_core::{ArmSolution, Belt, Direction};
use serde::Serialize;
use std::fmt;

/// Solved state of a belt, printed as text or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total_length: f64,
    pub unknown_torque_index: usize,
    pub solved_torque: f64,
    pub pulleys: Vec<PulleyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tensioner_arm: Option<ArmSolution>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PulleyReport {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub direction: Direction,
    /// Solved torque for the unknown pulley, configured torque otherwise.
    pub torque: f64,
    pub wrap_angle: f64,
    pub wrap_length: f64,
    /// Straight run to the next pulley.
    pub tangent_length: f64,
    /// Tension in the straight run to the next pulley.
    pub tension: f64,
    pub reaction_force: f64,
    pub reaction_angle: f64,
}

impl Report {
    /// Solve the belt's forces and collect everything worth printing.
    pub fn new(belt: &mut Belt, tensioner_arm: Option<ArmSolution>) -> beltpath_core::Result<Self> {
        let forces = belt.forces()?.clone();
        let pulleys = belt
            .pulleys()
            .iter()
            .zip(belt.geometry().segments())
            .zip(forces.segments())
            .enumerate()
            .map(|(i, ((p, g), f))| PulleyReport {
                x: p.x(),
                y: p.y(),
                radius: p.radius(),
                direction: p.direction(),
                torque: forces.torque_of(belt.pulleys(), i).unwrap_or(p.torque()),
                wrap_angle: g.wrap_angle,
                wrap_length: g.wrap_length,
                tangent_length: g.tangent_length,
                tension: f.local_tension,
                reaction_force: f.reaction_force,
                reaction_angle: f.reaction_angle,
            })
            .collect();

        Ok(Self {
            total_length: belt.total_length(),
            unknown_torque_index: forces.unknown_torque_index(),
            solved_torque: forces.solved_torque(),
            pulleys,
            tensioner_arm,
        })
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "belt length: {:.3}", self.total_length)?;
        writeln!(
            f,
            "solved torque on pulley {}: {:.3}",
            self.unknown_torque_index, self.solved_torque
        )?;
        if let Some(arm) = &self.tensioner_arm {
            writeln!(
                f,
                "tensioner arm: {:.3} deg, center ({:.3}, {:.3}) after {} iterations",
                arm.angle.to_degrees(),
                arm.position.x,
                arm.position.y,
                arm.iterations
            )?;
        }
        for (i, p) in self.pulleys.iter().enumerate() {
            write!(
                f,
                "\npulley {i} ({}): torque {:.3}, wrap {:.2} deg, tension {:.3}, reaction {:.3} at {:.2} deg",
                p.direction,
                p.torque,
                p.wrap_angle.to_degrees(),
                p.tension,
                p.reaction_force,
                p.reaction_angle.to_degrees()
            )?;
        }
        Ok(())
    }
}
