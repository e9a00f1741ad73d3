//! Geometry and static force balance of a belt wrapped around circular
//! pulleys in a plane.
//!
//! This crate intentionally avoids any rendering or file-format
//! dependencies.

pub mod angle;
pub mod belt;
pub mod cyclic;
pub mod error;
pub mod forces;
pub mod geometry;
pub mod point;
pub mod pulley;
pub mod tensioner;

pub use belt::{Belt, DisplayScale};
pub use error::{BeltError, Result};
pub use forces::{ForceOptions, Forces, SegmentForces};
pub use geometry::{Geometry, MIN_SPACE, SegmentGeometry};
pub use point::Point;
pub use pulley::{Direction, Pulley};
pub use tensioner::{ArmLimits, ArmSearch, ArmSolution, TensionerArm};
