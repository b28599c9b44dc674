//! Run parameters.
//!
//! Every field has a documented default so that partial JSON configs work:
//!
//! ```
//! use bugnav::config::{NavConfig, PolicyKind};
//! let cfg: NavConfig = serde_json::from_str(r#"{ "policy": "tangent" }"#).unwrap();
//! assert_eq!(cfg.policy, PolicyKind::C);
//! assert_eq!(cfg.step_size, bugnav::config::DEFAULT_STEP_SIZE);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NavError;

pub const DEFAULT_STEP_SIZE: f64 = 0.05;
pub const DEFAULT_TOLERANCE: f64 = 0.1;
pub const DEFAULT_SENSING_RANGE: f64 = 3.0;
/// One beam per degree.
pub const DEFAULT_ANGULAR_RESOLUTION: f64 = std::f64::consts::PI / 180.0;
pub const DEFAULT_MAX_STEPS: usize = 20_000;
/// Finest accepted beam spacing (about 63k beams per scan).
pub const MIN_ANGULAR_RESOLUTION: f64 = 1e-4;
/// Upper bound on beams per scan, whatever the resolution.
pub const MAX_BEAM_COUNT: usize = 65_536;

/// Leave policy selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Exhaustive loop: circle the obstacle once, leave from the closest point.
    #[default]
    #[serde(alias = "exhaustive")]
    A,
    /// Leave where the start–goal line is met again, closer to the goal.
    #[serde(alias = "mline")]
    B,
    /// Sensor-chosen direction, leave as soon as the goal is visible.
    #[serde(alias = "tangent")]
    C,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::A, PolicyKind::B, PolicyKind::C];

    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::A => "exhaustive",
            PolicyKind::B => "mline",
            PolicyKind::C => "tangent",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "exhaustive" => Ok(PolicyKind::A),
            "b" | "mline" => Ok(PolicyKind::B),
            "c" | "tangent" => Ok(PolicyKind::C),
            other => Err(NavError::invalid_config(format!(
                "unknown policy '{other}' (expected a|b|c)"
            ))),
        }
    }
}

/// Simulated range sensor (used by the tangent policy).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    /// Beam length.
    pub max_range: f64,
    /// Angle between neighbouring beams, radians.
    pub angular_resolution: f64,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            max_range: DEFAULT_SENSING_RANGE,
            angular_resolution: DEFAULT_ANGULAR_RESOLUTION,
        }
    }
}

impl SensorCfg {
    /// Number of beams covering a full turn, in `1..=MAX_BEAM_COUNT`.
    pub fn beam_count(&self) -> usize {
        let n = (std::f64::consts::TAU / self.angular_resolution).round();
        if n.is_nan() || n < 1.0 {
            1
        } else {
            n.min(MAX_BEAM_COUNT as f64) as usize
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Arc length per step, both when seeking and when following.
    pub step_size: f64,
    /// Goal reached when within this distance.
    pub tolerance: f64,
    pub policy: PolicyKind,
    pub sensor: SensorCfg,
    /// Caller-side cap used by `driver::drive`.
    pub max_steps: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE,
            tolerance: DEFAULT_TOLERANCE,
            policy: PolicyKind::default(),
            sensor: SensorCfg::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl NavConfig {
    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), NavError> {
        positive("step_size", self.step_size)?;
        positive("tolerance", self.tolerance)?;
        positive("sensor.max_range", self.sensor.max_range)?;
        positive("sensor.angular_resolution", self.sensor.angular_resolution)?;
        if self.sensor.angular_resolution < MIN_ANGULAR_RESOLUTION {
            return Err(NavError::invalid_config(format!(
                "sensor.angular_resolution must be >= {MIN_ANGULAR_RESOLUTION}, got {}",
                self.sensor.angular_resolution
            )));
        }
        if self.max_steps == 0 {
            return Err(NavError::invalid_config("max_steps must be > 0"));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), NavError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(NavError::invalid_config(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}
