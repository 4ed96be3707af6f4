//! Speed–density relationships used to estimate velocity from density.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Length in meters taken up by one vehicle, gap to the next one included.
pub const VEHICLE_LENGTH: f64 = 7.5;

/// Jam density (vehicles per meter) for a road with `lane_count` lanes.
pub fn jam_density(lane_count: f64) -> f64 {
    lane_count / VEHICLE_LENGTH
}

/// The macroscopic flow model applied to every record of a modeler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Greenshield,
    Underwood,
}

impl ModelType {
    /// Velocity for `density` on a road with free-flow speed `v_max` and jam
    /// density `max_density`. The unit of the result is the unit of `v_max`.
    ///
    /// Underwood is evaluated as `v_max * exp(k / k_jam)` and grows with
    /// density, unlike the textbook form `v_max * exp(-k / k_opt)`.
    pub fn velocity(self, v_max: f64, density: f64, max_density: f64) -> f64 {
        match self {
            ModelType::Greenshield => v_max * (1.0 - density / max_density),
            ModelType::Underwood => v_max * (density / max_density).exp(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Greenshield => "greenshield",
            ModelType::Underwood => "underwood",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greenshield" => Ok(ModelType::Greenshield),
            "underwood" => Ok(ModelType::Underwood),
            other => Err(ModelError::configuration(format!(
                "unknown model type '{other}' (expected 'greenshield' or 'underwood')"
            ))),
        }
    }
}
