//! Per-edge traffic metrics derived from one measurement row.

use serde::Serialize;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::model::{ModelType, jam_density};
use crate::network::EdgeAttributes;
use crate::parser::MeasurementRow;
use crate::time_slot::{TimeSlot, bucket_column};

/// Derived traffic metrics for one edge over one time slot.
///
/// `density` and `lane_density` are per lane. `max_density` is the jam
/// density of the whole edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficRecord {
    pub edge_id: String,
    pub length: f64,
    pub lane_count: u32,
    /// Vehicle count over the slot, kept as text.
    pub flow: String,
    pub vehicles_per_second: f64,
    pub vps_per_lane: f64,
    pub lane_vps: f64,
    pub density: f64,
    pub lane_density: f64,
    pub max_density: f64,
    pub v_max: f64,
    pub velocity: f64,
    pub norm_velocity: f64,
}

impl TrafficRecord {
    /// Derives the record for `row` on `edge` using `model`.
    pub fn derive(
        row: &MeasurementRow,
        edge: &EdgeAttributes,
        slot: TimeSlot,
        model: ModelType,
    ) -> Result<Self> {
        edge.validate()?;

        let lanes = edge.lane_count as f64;
        let v_max = edge.max_speed;
        let max_density = jam_density(lanes);
        debug!(
            edge_id = %edge.edge_id,
            k_jam_per_km = max_density * 1000.0,
            "Jam density"
        );

        let flow = if slot.hours() > 1 {
            slot.bucket_columns().try_fold(0u64, |total, column| {
                total.checked_add(row.count(&column)?).ok_or_else(|| {
                    ModelError::data(format!(
                        "edge '{}' ({}) vehicle count over {slot} overflows",
                        row.edge_id, row.date
                    ))
                })
            })?
        } else {
            row.count(&bucket_column(slot.first()))?
        };

        let vps = flow as f64 / slot.duration_seconds();
        let free_flow_density = vps / v_max;
        let lane_density = free_flow_density / lanes;
        let lane_vps = vps / lanes;

        let velocity = model.velocity(v_max, free_flow_density, max_density);
        let density = if velocity > 0.0 {
            vps / velocity
        } else {
            max_density
        };

        Ok(TrafficRecord {
            edge_id: edge.edge_id.clone(),
            length: edge.length,
            lane_count: edge.lane_count,
            flow: flow.to_string(),
            vehicles_per_second: vps,
            vps_per_lane: vps / lanes,
            lane_vps,
            density: density / lanes,
            lane_density,
            max_density,
            v_max,
            velocity,
            norm_velocity: velocity / v_max,
        })
    }

    /// The vehicle count as a number.
    pub fn flow_count(&self) -> Option<u64> {
        self.flow.parse().ok()
    }

    /// Velocity in km/h.
    pub fn velocity_kmh(&self) -> f64 {
        self.velocity * 3.6
    }
}
