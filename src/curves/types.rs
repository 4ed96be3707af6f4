//! Data types handed to curve renderers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::curves::curve::TheoreticalCurve;
use crate::model::ModelType;

/// An observation as drawn next to the theoretical curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservedPoint {
    /// Per-lane density, vehicles per meter.
    pub density: f64,
    pub velocity_kmh: f64,
    /// `velocity_kmh * density`.
    pub flow: f64,
}

/// All records sharing one speed limit, with the curve they are compared to.
#[derive(Debug, Clone)]
pub struct CurveGroup {
    /// Speed limit in m/s, as stored on the records.
    pub v_max: f64,
    pub record_count: usize,
    pub mean_lane_count: f64,
    pub curve: TheoreticalCurve,
    pub observed: Vec<ObservedPoint>,
}

/// A theoretical series and the matching observed scatter.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub theoretical: Vec<(f64, f64)>,
    pub observed: Vec<(f64, f64)>,
}

/// Materialized series for one [`CurveGroup`].
#[derive(Debug, Clone, Serialize)]
pub struct GroupSeries {
    pub v_max: f64,
    pub v_max_kmh: f64,
    pub k_jam: f64,
    pub record_count: usize,
    pub mean_lane_count: f64,
    pub velocity_density: Series,
    pub flow_density: Series,
    pub flow_velocity: Series,
}

/// Everything a renderer needs to draw a model against its observations.
#[derive(Debug, Clone, Serialize)]
pub struct CurveBundle {
    pub generated_at: DateTime<Utc>,
    pub model: ModelType,
    pub time_slot: String,
    pub groups: Vec<GroupSeries>,
}
