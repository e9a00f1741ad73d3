//! Pulley value type.
//!
//! Length units of the pulley must match the belt's length units, and torque
//! must be expressed in tension units times length units (for example mm, N
//! and N·mm). Positive torque acts clockwise.

use crate::{
    error::{BeltError, Result, ensure_finite},
    point::Point,
};
use serde::{Deserialize, Serialize, Serializer};
use std::f64::consts::TAU;

/// Which way the belt wraps the pulley.
///
/// The sign of the direction selects the tangent type between neighbours:
/// equal signs give the outer (common) tangent, opposite signs the crossed
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "DirectionRepr")]
pub enum Direction {
    /// Belt wraps clockwise, sign `+1`.
    Clockwise,
    /// Belt wraps counter-clockwise, sign `-1`.
    CounterClockwise,
}

impl Direction {
    /// Parse a direction token: `CW`, `CCW`, `1` or `-1`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CW" | "1" | "+1" => Some(Direction::Clockwise),
            "CCW" | "-1" => Some(Direction::CounterClockwise),
            _ => None,
        }
    }

    pub fn from_sign(sign: i64) -> Option<Self> {
        match sign {
            1 => Some(Direction::Clockwise),
            -1 => Some(Direction::CounterClockwise),
            _ => None,
        }
    }

    /// Signed multiplier used in all belt arithmetic.
    #[inline]
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Clockwise => 1.0,
            Direction::CounterClockwise => -1.0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Clockwise => "CW",
            Direction::CounterClockwise => "CCW",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = BeltError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| {
            BeltError::invalid_argument(format!(
                "direction must be 1, -1, 'CW', or 'CCW', got {s:?}"
            ))
        })
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Config files may spell the direction as a number or a token.
#[derive(Deserialize)]
#[serde(untagged)]
enum DirectionRepr {
    Sign(i64),
    Token(String),
}

impl TryFrom<DirectionRepr> for Direction {
    type Error = BeltError;

    fn try_from(repr: DirectionRepr) -> Result<Self> {
        match repr {
            DirectionRepr::Sign(sign) => Direction::from_sign(sign).ok_or_else(|| {
                BeltError::invalid_argument(format!(
                    "direction must be 1, -1, 'CW', or 'CCW', got {sign}"
                ))
            }),
            DirectionRepr::Token(token) => token.parse(),
        }
    }
}

/// A circular pulley in the belt plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pulley {
    radius: f64,
    center: Point,
    direction: Direction,
    torque: f64,
}

impl Pulley {
    /// Create a pulley carrying no torque.
    pub fn new(radius: f64, x: f64, y: f64, direction: Direction) -> Result<Self> {
        ensure_finite("radius", radius)?;
        if radius <= 0.0 {
            return Err(BeltError::invalid_argument(format!(
                "pulley radius must be greater than 0, got {radius}"
            )));
        }
        Ok(Self {
            radius,
            center: Point::new(ensure_finite("x position", x)?, ensure_finite("y position", y)?),
            direction,
            torque: 0.0,
        })
    }

    /// Set the torque at construction.
    pub fn with_torque(mut self, torque: f64) -> Result<Self> {
        self.set_torque(torque)?;
        Ok(self)
    }

    /// Pitch radius of a toothed pulley.
    pub fn pitch_radius(teeth: u32, pitch: f64) -> f64 {
        f64::from(teeth) * pitch / TAU
    }

    pub fn set_position(&mut self, x: f64, y: f64) -> Result<()> {
        let x = ensure_finite("x position", x)?;
        let y = ensure_finite("y position", y)?;
        self.center = Point::new(x, y);
        Ok(())
    }

    pub fn set_torque(&mut self, torque: f64) -> Result<()> {
        self.torque = ensure_finite("torque", torque)?;
        Ok(())
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn x(&self) -> f64 {
        self.center.x
    }

    pub fn y(&self) -> f64 {
        self.center.y
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn torque(&self) -> f64 {
        self.torque
    }

    /// Signed radius, `r * dir`. Its difference across a segment fixes the
    /// tangent angle.
    pub(crate) fn signed_radius(&self) -> f64 {
        self.radius * self.direction.sign()
    }

    /// Tension step this pulley's torque forces across it, `dir * T / r`.
    pub(crate) fn tension_step(&self, torque: f64) -> f64 {
        self.direction.sign() * torque / self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parse() {
        assert_eq!(Direction::parse("CW"), Some(Direction::Clockwise));
        assert_eq!(Direction::parse("cw"), Some(Direction::Clockwise));
        assert_eq!(Direction::parse("1"), Some(Direction::Clockwise));
        assert_eq!(Direction::parse("CCW"), Some(Direction::CounterClockwise));
        assert_eq!(Direction::parse("-1"), Some(Direction::CounterClockwise));
        assert_eq!(Direction::parse("left"), None);
        assert_eq!(Direction::from_sign(-1), Some(Direction::CounterClockwise));
        assert_eq!(Direction::from_sign(0), None);
        assert!("2".parse::<Direction>().is_err());
    }

    #[test]
    fn direction_deserializes_numbers_and_tokens() {
        let parsed: Vec<Direction> = serde_json::from_str(r#"[1, -1, "CW", "CCW"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Direction::Clockwise,
                Direction::CounterClockwise,
                Direction::Clockwise,
                Direction::CounterClockwise,
            ]
        );
        assert!(serde_json::from_str::<Direction>("0").is_err());
        assert!(serde_json::from_str::<Direction>(r#""up""#).is_err());
    }

    #[test]
    fn rejects_bad_radius() {
        assert!(Pulley::new(0.0, 0.0, 0.0, Direction::Clockwise).is_err());
        assert!(Pulley::new(-1.0, 0.0, 0.0, Direction::Clockwise).is_err());
        assert!(Pulley::new(f64::NAN, 0.0, 0.0, Direction::Clockwise).is_err());
    }

    #[test]
    fn rejects_non_finite_fields() {
        assert!(Pulley::new(1.0, f64::INFINITY, 0.0, Direction::Clockwise).is_err());
        let mut p = Pulley::new(1.0, 0.0, 0.0, Direction::Clockwise).unwrap();
        assert!(p.set_position(0.0, f64::NAN).is_err());
        assert!(p.set_torque(f64::NEG_INFINITY).is_err());
        // failed updates leave the pulley untouched
        assert_eq!(p.center(), Point::new(0.0, 0.0));
        assert_eq!(p.torque(), 0.0);
    }

    #[test]
    fn updates_position_and_torque() {
        let mut p = Pulley::new(25.0, 0.0, -200.0, Direction::CounterClockwise)
            .unwrap()
            .with_torque(0.1)
            .unwrap();
        p.set_position(-120.0, -80.0).unwrap();
        p.set_torque(-3.0).unwrap();
        assert_eq!(p.x(), -120.0);
        assert_eq!(p.y(), -80.0);
        assert_eq!(p.torque(), -3.0);
        assert_eq!(p.signed_radius(), -25.0);
    }

    #[test]
    fn pitch_radius_of_toothed_pulley() {
        let r = Pulley::pitch_radius(36, 11.0);
        assert!((r - 63.025_357).abs() < 1e-6);
    }
}
