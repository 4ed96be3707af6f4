//! Theoretical curves of the selected model against observed records.
//!
//! Records are grouped by speed limit; each group gets a sampled curve of
//! the model (velocity in km/h, density in vehicles per meter) and the
//! group's observations as scatter points. Rendering is left to the caller.

pub mod curve;
pub mod types;
pub mod utility;

use crate::curves::curve::TheoreticalCurve;
use crate::curves::types::{CurveBundle, CurveGroup, GroupSeries, ObservedPoint, Series};
use crate::curves::utility::mean;
use crate::model::{ModelType, jam_density};
use crate::record::TrafficRecord;

const DENSITY_LABEL: &str = "Density (vehicles/m)";
const VELOCITY_LABEL: &str = "Velocity (km/h)";
const FLOW_LABEL: &str = "Flow (vehicles/h)";

/// Groups `records` by speed limit, in order of first appearance, and pairs
/// each group with a curve of `model` sampled at `samples` densities.
pub fn group_curves(records: &[TrafficRecord], model: ModelType, samples: usize) -> Vec<CurveGroup> {
    let mut buckets: Vec<(f64, Vec<&TrafficRecord>)> = Vec::new();
    for record in records {
        match buckets
            .iter_mut()
            .find(|(v_max, _)| v_max.to_bits() == record.v_max.to_bits())
        {
            Some((_, members)) => members.push(record),
            None => buckets.push((record.v_max, vec![record])),
        }
    }

    buckets
        .into_iter()
        .map(|(v_max, members)| {
            let lane_counts: Vec<f64> = members.iter().map(|r| r.lane_count as f64).collect();
            let mean_lane_count = mean(&lane_counts);

            let v_max_kmh = (v_max * 3.6).round_ties_even();
            let curve = TheoreticalCurve::new(model, v_max_kmh, jam_density(mean_lane_count), samples);

            let observed = members
                .iter()
                .map(|r| {
                    let velocity_kmh = r.velocity_kmh();
                    ObservedPoint {
                        density: r.density,
                        velocity_kmh,
                        flow: velocity_kmh * r.density,
                    }
                })
                .collect();

            CurveGroup {
                v_max,
                record_count: members.len(),
                mean_lane_count,
                curve,
                observed,
            }
        })
        .collect()
}

impl CurveGroup {
    pub fn observed_velocity_density(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.observed.iter().map(|p| (p.density, p.velocity_kmh))
    }

    pub fn observed_flow_density(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.observed.iter().map(|p| (p.density, p.flow))
    }

    pub fn observed_flow_velocity(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.observed.iter().map(|p| (p.velocity_kmh, p.flow))
    }

    /// Collects the three theoretical/observed series pairs of this group.
    pub fn series(&self) -> GroupSeries {
        let v_max_kmh = self.curve.v_max_kmh;
        GroupSeries {
            v_max: self.v_max,
            v_max_kmh,
            k_jam: self.curve.k_jam,
            record_count: self.record_count,
            mean_lane_count: self.mean_lane_count,
            velocity_density: Series {
                title: format!("Velocity-Density (v_max = {v_max_kmh} km/h)"),
                x_label: DENSITY_LABEL,
                y_label: VELOCITY_LABEL,
                theoretical: self.curve.velocity_density().collect(),
                observed: self.observed_velocity_density().collect(),
            },
            flow_density: Series {
                title: format!("Flow-Density (v_max = {v_max_kmh} km/h)"),
                x_label: DENSITY_LABEL,
                y_label: FLOW_LABEL,
                theoretical: self.curve.flow_density().collect(),
                observed: self.observed_flow_density().collect(),
            },
            flow_velocity: Series {
                title: format!("Flow-Velocity (v_max = {v_max_kmh} km/h)"),
                x_label: VELOCITY_LABEL,
                y_label: FLOW_LABEL,
                theoretical: self.curve.flow_velocity().collect(),
                observed: self.observed_flow_velocity().collect(),
            },
        }
    }
}

impl CurveBundle {
    pub fn from_groups(model: ModelType, time_slot: impl Into<String>, groups: &[CurveGroup]) -> Self {
        CurveBundle {
            generated_at: chrono::Utc::now(),
            model,
            time_slot: time_slot.into(),
            groups: groups.iter().map(CurveGroup::series).collect(),
        }
    }
}
