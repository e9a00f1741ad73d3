use anyhow::{Context, Result};
use beltpath_core::{
    ArmSearch, Belt, Direction, ForceOptions, Point, Pulley, TensionerArm, tensioner,
};
use beltpath_render::RenderOptions;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// A belt drive described in a TOML or JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Force solve settings
    #[serde(default)]
    pub belt: BeltConfig,

    /// Pulleys in belt order
    #[serde(default)]
    pub pulleys: Vec<PulleyConfig>,

    /// Drawing settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Swing arm carrying the tensioner pulley
    pub tensioner_arm: Option<TensionerArmConfig>,
}

/// Force solve configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeltConfig {
    /// Pulley whose torque is solved for
    #[serde(default)]
    pub unknown_torque_index: usize,

    /// Lowest tension in the belt when there is no tensioner
    #[serde(default)]
    pub min_tension: f64,

    /// Pulley whose average tension is pinned
    pub tensioner_index: Option<usize>,

    #[serde(default)]
    pub tensioner_tension: f64,

    /// Tooth pitch, needed when pulleys or belts are given in teeth
    pub pitch: Option<f64>,
}

/// One pulley
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulleyConfig {
    pub radius: Option<f64>,
    pub teeth: Option<u32>,
    pub x: f64,
    pub y: f64,
    /// `"CW"`, `"CCW"`, `1` or `-1`
    pub direction: Direction,
    #[serde(default)]
    pub torque: f64,
}

/// Drawing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_scale")]
    pub force_scale: f64,

    #[serde(default = "default_scale")]
    pub torque_scale: f64,

    #[serde(default = "default_circle_resolution")]
    pub circle_resolution: usize,

    #[serde(default = "default_line_width")]
    pub line_width: f64,

    #[serde(default = "default_true")]
    pub show_pulleys: bool,

    #[serde(default = "default_true")]
    pub show_labels: bool,

    #[serde(default = "default_true")]
    pub show_reaction: bool,

    #[serde(default = "default_true")]
    pub show_torque: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            force_scale: default_scale(),
            torque_scale: default_scale(),
            circle_resolution: default_circle_resolution(),
            line_width: default_line_width(),
            show_pulleys: true,
            show_labels: true,
            show_reaction: true,
            show_torque: true,
        }
    }
}

impl RenderConfig {
    pub fn options(&self) -> RenderOptions {
        RenderOptions {
            show_pulleys: self.show_pulleys,
            show_labels: self.show_labels,
            show_reaction: self.show_reaction,
            show_torque: self.show_torque,
            circle_resolution: self.circle_resolution,
            line_width: self.line_width,
        }
    }
}

/// Tensioner arm search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensionerArmConfig {
    /// Tensioner pulley, defaults to `belt.tensioner_index`
    pub index: Option<usize>,

    pub pivot: [f64; 2],

    pub arm_length: f64,

    /// Wanted belt length
    pub target_length: Option<f64>,

    /// Wanted belt length in teeth, needs `belt.pitch`
    pub belt_teeth: Option<u32>,

    #[serde(default = "default_accuracy")]
    pub accuracy: f64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_clearance")]
    pub clearance: f64,
}

fn default_scale() -> f64 {
    1.0
}

fn default_circle_resolution() -> usize {
    beltpath_render::CIRCLE_RESOLUTION
}

fn default_line_width() -> f64 {
    beltpath_render::LINE_WIDTH
}

fn default_true() -> bool {
    true
}

fn default_accuracy() -> f64 {
    tensioner::DEFAULT_ACCURACY
}

fn default_max_iterations() -> usize {
    tensioner::DEFAULT_MAX_ITERATIONS
}

fn default_clearance() -> f64 {
    tensioner::DEFAULT_CLEARANCE
}

impl Config {
    /// Load configuration from a file, auto-detecting TOML or JSON format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content).or_else(|_| Self::from_json(&content)),
        }
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse config as TOML")
    }

    /// Parse configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse config as JSON")
    }

    /// Validate the configuration
    ///
    /// Numeric ranges are left to the belt constructors, which report them
    /// with the offending pulley.
    pub fn validate(&self) -> Result<()> {
        if self.pulleys.is_empty() {
            anyhow::bail!("pulleys cannot be empty");
        }

        for (i, p) in self.pulleys.iter().enumerate() {
            match (p.radius, p.teeth) {
                (Some(_), Some(_)) => {
                    anyhow::bail!("pulleys[{i}] sets both radius and teeth")
                }
                (None, None) => anyhow::bail!("pulleys[{i}] needs a radius or teeth"),
                (None, Some(_)) if self.belt.pitch.is_none() => {
                    anyhow::bail!("pulleys[{i}] is given in teeth but belt.pitch is not set")
                }
                _ => {}
            }
        }

        if let Some(arm) = &self.tensioner_arm {
            if arm.index.or(self.belt.tensioner_index).is_none() {
                anyhow::bail!("tensioner_arm needs an index or belt.tensioner_index");
            }
            match (arm.target_length, arm.belt_teeth) {
                (Some(_), Some(_)) => {
                    anyhow::bail!("tensioner_arm sets both target_length and belt_teeth")
                }
                (None, None) => {
                    anyhow::bail!("tensioner_arm needs a target_length or belt_teeth")
                }
                (None, Some(_)) if self.belt.pitch.is_none() => {
                    anyhow::bail!("tensioner_arm.belt_teeth needs belt.pitch")
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn force_options(&self) -> ForceOptions {
        ForceOptions {
            unknown_torque_index: self.belt.unknown_torque_index,
            min_tension: self.belt.min_tension,
            tensioner_index: self.belt.tensioner_index,
            tensioner_tension: self.belt.tensioner_tension,
        }
    }

    /// Build the belt described by this configuration.
    pub fn belt(&self) -> Result<Belt> {
        let pulleys = self
            .pulleys
            .iter()
            .enumerate()
            .map(|(i, pulley)| {
                self.pulley(pulley)
                    .with_context(|| format!("invalid pulley {i}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut belt = Belt::new(pulleys, self.force_options()).context("invalid belt")?;
        belt.set_force_scale(self.render.force_scale)
            .context("invalid render.force_scale")?;
        belt.set_torque_scale(self.render.torque_scale)
            .context("invalid render.torque_scale")?;
        Ok(belt)
    }

    fn pulley(&self, spec: &PulleyConfig) -> Result<Pulley> {
        let radius = match (spec.radius, spec.teeth, self.belt.pitch) {
            (Some(radius), None, _) => radius,
            (None, Some(teeth), Some(pitch)) => Pulley::pitch_radius(teeth, pitch),
            _ => anyhow::bail!("a pulley needs exactly one of radius or teeth"),
        };
        Ok(Pulley::new(radius, spec.x, spec.y, spec.direction)?.with_torque(spec.torque)?)
    }

    /// The tensioner arm and its search target, if configured.
    pub fn tensioner_arm(&self) -> Result<Option<(TensionerArm, ArmSearch)>> {
        let Some(section) = &self.tensioner_arm else {
            return Ok(None);
        };
        let Some(index) = section.index.or(self.belt.tensioner_index) else {
            anyhow::bail!("tensioner_arm needs an index or belt.tensioner_index");
        };
        let target_length = match (section.target_length, section.belt_teeth, self.belt.pitch) {
            (Some(length), None, _) => length,
            (None, Some(teeth), Some(pitch)) => f64::from(teeth) * pitch,
            _ => anyhow::bail!("tensioner_arm needs exactly one of target_length or belt_teeth"),
        };

        let [x, y] = section.pivot;
        let arm = TensionerArm {
            clearance: section.clearance,
            ..TensionerArm::new(index, Point::new(x, y), section.arm_length)
        };
        let search = ArmSearch {
            accuracy: section.accuracy,
            max_iterations: section.max_iterations,
            ..ArmSearch::new(target_length)
        };
        Ok(Some((arm, search)))
    }
}
