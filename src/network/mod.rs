//! Road network attributes.
//!
//! [`EdgeAttributes`] is the per-edge geometry the model needs.
//! [`EdgeSource`] is the read-only lookup trait the modeler depends on.
//! [`SumoNetwork`] implements [`EdgeSource`] over a SUMO `.net.xml` file.

mod sumo;

pub use sumo::SumoNetwork;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ModelError, Result};

/// Physical attributes of a single road edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttributes {
    pub edge_id: String,
    /// Meters.
    pub length: f64,
    /// Speed limit in m/s.
    pub max_speed: f64,
    pub lane_count: u32,
}

impl EdgeAttributes {
    pub fn new(edge_id: impl Into<String>, length: f64, max_speed: f64, lane_count: u32) -> Self {
        Self {
            edge_id: edge_id.into(),
            length,
            max_speed,
            lane_count,
        }
    }

    /// Rejects attributes the model equations would divide by.
    pub fn validate(&self) -> Result<()> {
        if self.lane_count == 0 {
            return Err(ModelError::configuration(format!(
                "edge '{}' has no lanes",
                self.edge_id
            )));
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(ModelError::configuration(format!(
                "edge '{}' has invalid speed limit {}",
                self.edge_id, self.max_speed
            )));
        }
        Ok(())
    }
}

/// Looks up edge attributes by edge id.
pub trait EdgeSource {
    /// Returns the attributes of `edge_id`, or a data error if the network
    /// has no such edge.
    fn edge(&self, edge_id: &str) -> Result<&EdgeAttributes>;
}

impl EdgeSource for HashMap<String, EdgeAttributes> {
    fn edge(&self, edge_id: &str) -> Result<&EdgeAttributes> {
        self.get(edge_id)
            .ok_or_else(|| ModelError::data(format!("edge '{edge_id}' not found in network")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_regular_edge() {
        assert!(EdgeAttributes::new("E1", 120.0, 13.89, 2).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_lanes() {
        let err = EdgeAttributes::new("E1", 120.0, 13.89, 0).validate().unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_non_positive_speed() {
        for speed in [0.0, -1.0, f64::NAN] {
            let err = EdgeAttributes::new("E1", 120.0, speed, 1).validate().unwrap_err();
            assert!(matches!(err, ModelError::Configuration(_)));
        }
    }

    #[test]
    fn test_hash_map_source_lookup() {
        let mut edges = HashMap::new();
        edges.insert("E1".to_string(), EdgeAttributes::new("E1", 50.0, 8.33, 1));

        assert_eq!(edges.edge("E1").unwrap().lane_count, 1);
        assert!(matches!(edges.edge("E2"), Err(ModelError::Data(_))));
    }
}
