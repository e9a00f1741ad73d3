//! A belt wrapped around an ordered loop of pulleys.
//!
//! [`Belt`] owns its pulleys and composes [`geometry::compute`] and
//! [`forces::compute`]. Geometry is recomputed as soon as a pulley moves;
//! forces are solved on first read and dropped whenever an input they depend
//! on changes, so no accessor can hand out results for an older
//! configuration.

use crate::{
    error::{BeltError, Result, ensure_non_negative},
    forces::{self, ForceOptions, Forces, SegmentForces},
    geometry::{self, Geometry, SegmentGeometry},
    pulley::Pulley,
};
use serde::Serialize;

/// Drawing hints carried with a belt. They have no physical effect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DisplayScale {
    /// Length units per tension unit for reaction arrows.
    pub force: f64,
    /// Length units per torque unit for torque discs.
    pub torque: f64,
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self {
            force: 1.0,
            torque: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Belt {
    pulleys: Vec<Pulley>,
    options: ForceOptions,
    display: DisplayScale,
    geometry: Geometry,
    forces: Option<Forces>,
}

impl Belt {
    pub fn new(pulleys: Vec<Pulley>, options: ForceOptions) -> Result<Self> {
        if pulleys.len() < 2 {
            return Err(BeltError::InsufficientPulleys {
                count: pulleys.len(),
            });
        }
        options.validate(pulleys.len())?;
        let geometry = geometry::compute(&pulleys)?;

        Ok(Self {
            pulleys,
            options,
            display: DisplayScale::default(),
            geometry,
            forces: None,
        })
    }

    pub fn len(&self) -> usize {
        self.pulleys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulleys.is_empty()
    }

    // ---- inputs ----

    /// Swap the pulley at `index`.
    ///
    /// When the new pulley makes the loop infeasible the belt is left as it
    /// was and the error is returned.
    pub fn replace_pulley(&mut self, index: usize, pulley: Pulley) -> Result<()> {
        self.check_index("pulley", index)?;
        let previous = std::mem::replace(&mut self.pulleys[index], pulley);
        match geometry::compute(&self.pulleys) {
            Ok(geometry) => {
                self.geometry = geometry;
                self.forces = None;
                Ok(())
            }
            Err(err) => {
                self.pulleys[index] = previous;
                Err(err)
            }
        }
    }

    /// Move the pulley at `index`. Same failure behaviour as
    /// [`replace_pulley`](Self::replace_pulley).
    pub fn set_pulley_position(&mut self, index: usize, x: f64, y: f64) -> Result<()> {
        self.check_index("pulley", index)?;
        let mut pulley = self.pulleys[index].clone();
        pulley.set_position(x, y)?;
        self.replace_pulley(index, pulley)
    }

    pub fn set_pulley_torque(&mut self, index: usize, torque: f64) -> Result<()> {
        self.check_index("pulley", index)?;
        self.pulleys[index].set_torque(torque)?;
        self.forces = None;
        Ok(())
    }

    pub fn set_min_tension(&mut self, min_tension: f64) -> Result<()> {
        self.options.min_tension = ensure_non_negative("minimum tension", min_tension)?;
        self.forces = None;
        Ok(())
    }

    pub fn set_tensioner_tension(&mut self, tension: f64) -> Result<()> {
        self.options.tensioner_tension = ensure_non_negative("tensioner tension", tension)?;
        self.forces = None;
        Ok(())
    }

    pub fn set_force_scale(&mut self, scale: f64) -> Result<()> {
        self.display.force = ensure_non_negative("force scale", scale)?;
        Ok(())
    }

    pub fn set_torque_scale(&mut self, scale: f64) -> Result<()> {
        self.display.torque = ensure_non_negative("torque scale", scale)?;
        Ok(())
    }

    /// Write the solved torque into the unknown-torque pulley.
    ///
    /// The solver never reads that pulley's stored torque, so cached forces
    /// stay valid.
    pub fn apply_solved_torque(&mut self) -> Result<f64> {
        let torque = self.forces()?.solved_torque();
        let index = self.options.unknown_torque_index;
        self.pulleys[index].set_torque(torque)?;
        Ok(torque)
    }

    // ---- geometry ----

    pub fn total_length(&self) -> f64 {
        self.geometry.total_length()
    }

    pub fn pulley(&self, index: usize) -> Option<&Pulley> {
        self.pulleys.get(index)
    }

    pub fn pulleys(&self) -> &[Pulley] {
        &self.pulleys
    }

    pub fn options(&self) -> &ForceOptions {
        &self.options
    }

    pub fn display_scale(&self) -> DisplayScale {
        self.display
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Geometry of pulley `index` and the segment leaving it.
    pub fn segment_geometry(&self, index: usize) -> Result<&SegmentGeometry> {
        self.check_index("segment", index)?;
        Ok(&self.geometry.segments()[index])
    }

    /// Typically used to check minimum tooth engagement.
    pub fn wrap_length(&self, index: usize) -> Result<f64> {
        Ok(self.segment_geometry(index)?.wrap_length)
    }

    pub fn global_tangent_angle(&self, index: usize) -> Result<f64> {
        Ok(self.segment_geometry(index)?.global_tangent_angle)
    }

    // ---- forces ----

    /// Solved forces, computing them first if an input changed.
    pub fn forces(&mut self) -> Result<&Forces> {
        let forces = match self.forces.take() {
            Some(forces) => forces,
            None => forces::compute(&self.pulleys, &self.geometry, &self.options)?,
        };
        Ok(self.forces.insert(forces))
    }

    pub fn segment_forces(&mut self, index: usize) -> Result<SegmentForces> {
        self.check_index("segment", index)?;
        Ok(self.forces()?.segments()[index])
    }

    /// Forces if they are already solved for the current inputs.
    pub fn cached_forces(&self) -> Option<&Forces> {
        self.forces.as_ref()
    }

    fn check_index(&self, name: &str, index: usize) -> Result<()> {
        if index < self.pulleys.len() {
            Ok(())
        } else {
            Err(BeltError::index_out_of_range(name, index, self.pulleys.len()))
        }
    }
}
