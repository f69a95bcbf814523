//! Mohr-Coulomb failure envelope geometry.

use std::fmt;

use serde::Serialize;
use uom::si::angle::degree;
use uom::si::f64::Angle;

use crate::soil::SimulationParameters;

/// Head-room applied to the largest stresses when sizing the envelope plot.
pub const PLOT_MARGIN: f64 = 1.2;

/// A point in normal stress / shear stress space, both in kilopascals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StressPoint {
    /// Normal stress `σ`.
    pub normal_stress: f64,
    /// Shear stress `τ`.
    pub shear_stress: f64,
}

impl StressPoint {
    /// Create a [`StressPoint`].
    #[must_use]
    pub const fn new(normal_stress: f64, shear_stress: f64) -> Self {
        Self {
            normal_stress,
            shear_stress,
        }
    }
}

/// Linear strength criterion `τ = c + σ·tan(φ)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FailureEnvelope {
    /// Cohesion `c` in kilopascals.
    cohesion: f64,
    /// Friction angle `φ`.
    friction_angle: Angle,
}

impl FailureEnvelope {
    /// Create an envelope from cohesion in kPa and friction angle in degrees.
    #[must_use]
    pub fn new(cohesion: f64, friction_angle_degrees: f64) -> Self {
        Self {
            cohesion,
            friction_angle: Angle::new::<degree>(friction_angle_degrees),
        }
    }

    /// Shear stress at failure under `normal_stress`.
    #[must_use]
    pub fn shear_at_failure(&self, normal_stress: f64) -> f64 {
        self.cohesion + normal_stress * self.friction_angle.tan().value
    }

    /// Failure points for three normal stresses plus the envelope line drawn
    /// from `(0, c)` to the largest of them.
    ///
    /// # Examples
    /// ```
    /// use shearbox::FailureEnvelope;
    ///
    /// let geometry = FailureEnvelope::new(0.0, 30.0).compute([50.0, 100.0, 200.0]);
    /// assert!((geometry.points[1].shear_stress - 57.735).abs() < 1.0e-3);
    /// assert_eq!(geometry.line[1].normal_stress, 200.0);
    /// ```
    #[must_use]
    pub fn compute(&self, normal_stresses: [f64; 3]) -> FailureEnvelopeGeometry {
        let points =
            normal_stresses.map(|sigma| StressPoint::new(sigma, self.shear_at_failure(sigma)));
        let max_stress = normal_stresses
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        let line = [
            StressPoint::new(0.0, self.cohesion),
            StressPoint::new(max_stress, self.shear_at_failure(max_stress)),
        ];
        FailureEnvelopeGeometry { points, line }
    }
}

impl From<&SimulationParameters> for FailureEnvelope {
    fn from(params: &SimulationParameters) -> Self {
        Self {
            cohesion: params.cohesion,
            friction_angle: params.friction_angle(),
        }
    }
}

impl fmt::Display for FailureEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "τ = {:.1} + σ·tan({:.1}°)",
            self.cohesion,
            self.friction_angle.get::<degree>()
        )
    }
}

/// Points and line of a failure envelope, ready for plotting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FailureEnvelopeGeometry {
    /// Failure point for each normal stress, in slot order.
    pub points: [StressPoint; 3],
    /// Envelope segment from `(0, c)` to the largest normal stress.
    pub line: [StressPoint; 2],
}

impl FailureEnvelopeGeometry {
    /// Upper plot bounds `(σ, τ)` leaving [`PLOT_MARGIN`] head-room.
    #[must_use]
    pub fn plot_extent(&self) -> StressPoint {
        let (sigma, tau) = self.points.iter().fold(
            (f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(sigma, tau), point| (sigma.max(point.normal_stress), tau.max(point.shear_stress)),
        );
        StressPoint::new(sigma * PLOT_MARGIN, tau * PLOT_MARGIN)
    }
}
