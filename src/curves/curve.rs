use serde::Serialize;

use crate::curves::utility::linspace;
use crate::model::ModelType;

/// Number of density samples taken along a theoretical curve.
pub const DEFAULT_SAMPLES: usize = 500;

/// One sample of a theoretical curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    /// Vehicles per meter.
    pub density: f64,
    /// km/h.
    pub velocity: f64,
    pub flow: f64,
}

/// The speed–density curve of a model, sampled on demand.
///
/// Nothing is cached: every call to [`TheoreticalCurve::points`] walks the
/// densities again, so the curve can be iterated as often as needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TheoreticalCurve {
    pub model: ModelType,
    pub v_max_kmh: f64,
    pub k_jam: f64,
    pub samples: usize,
}

impl TheoreticalCurve {
    pub fn new(model: ModelType, v_max_kmh: f64, k_jam: f64, samples: usize) -> Self {
        Self {
            model,
            v_max_kmh,
            k_jam,
            samples,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = CurvePoint> + Clone + use<> {
        let Self {
            model,
            v_max_kmh,
            k_jam,
            samples,
        } = *self;
        linspace(0.0, k_jam, samples).map(move |k| {
            let v = model.velocity(v_max_kmh, k, k_jam);
            CurvePoint {
                density: k,
                velocity: v,
                flow: v * k,
            }
        })
    }

    pub fn velocity_density(&self) -> impl Iterator<Item = (f64, f64)> + use<> {
        self.points().map(|p| (p.density, p.velocity))
    }

    pub fn flow_density(&self) -> impl Iterator<Item = (f64, f64)> + use<> {
        self.points().map(|p| (p.density, p.flow))
    }

    pub fn flow_velocity(&self) -> impl Iterator<Item = (f64, f64)> + use<> {
        self.points().map(|p| (p.velocity, p.flow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::jam_density;

    #[test]
    fn test_greenshield_curve_shape() {
        let curve = TheoreticalCurve::new(ModelType::Greenshield, 50.0, jam_density(2.0), DEFAULT_SAMPLES);
        let points: Vec<_> = curve.points().collect();

        assert_eq!(points.len(), DEFAULT_SAMPLES);
        assert_eq!(points[0].density, 0.0);
        assert_eq!(points[0].velocity, 50.0);
        assert_eq!(points[0].flow, 0.0);

        let last = points.last().unwrap();
        assert_eq!(last.density, curve.k_jam);
        assert!(last.velocity.abs() < 1e-12);
        assert!(last.flow.abs() < 1e-12);

        assert!(points.windows(2).all(|w| w[1].velocity <= w[0].velocity));
    }

    #[test]
    fn test_greenshield_flow_peaks_at_half_jam_density() {
        let curve = TheoreticalCurve::new(ModelType::Greenshield, 50.0, jam_density(1.0), 501);
        let peak = curve
            .flow_density()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!((peak.0 - curve.k_jam / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_is_restartable() {
        let curve = TheoreticalCurve::new(ModelType::Underwood, 30.0, jam_density(1.0), 10);
        let first: Vec<_> = curve.velocity_density().collect();
        let second: Vec<_> = curve.velocity_density().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_flow_velocity_pairs() {
        let curve = TheoreticalCurve::new(ModelType::Underwood, 30.0, jam_density(1.0), 10);
        for ((v, q), p) in curve.flow_velocity().zip(curve.points()) {
            assert_eq!(v, p.velocity);
            assert_eq!(q, p.velocity * p.density);
        }
    }
}
