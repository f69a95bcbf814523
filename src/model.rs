//! Empirical constitutive formulas for the direct shear response.
//!
//! Each soil class maps to one coefficient set. Amplitudes and time constants
//! scale with the normalised stress `p = σ / 100`, either linearly or by a
//! fixed power, so one parametrised formula covers all three stress slots.

use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::soil::SoilClass;
use crate::strain::StrainAxis;

/// Normal stress that maps to `p = 1`, in kilopascals.
pub const REFERENCE_STRESS: f64 = 100.0;

/// Shear stress and height change sampled on a [`StrainAxis`].
///
/// Curves are always full length; playback only ever reads a prefix of them.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseCurve {
    /// Soil class the curve was computed for.
    pub soil: SoilClass,
    /// Normal stress the curve was computed for, in kilopascals.
    pub normal_stress: f64,
    /// Shear stress at every strain sample.
    pub shear_stress: Array1<f64>,
    /// Specimen height change at every strain sample (positive = dilation).
    pub height_change: Array1<f64>,
}

impl ResponseCurve {
    /// Number of samples in the curve.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shear_stress.len()
    }

    /// Returns `true` when the curve holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shear_stress.is_empty()
    }

    /// Returns `true` when every sample is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.shear_stress.iter().all(|value| value.is_finite())
            && self.height_change.iter().all(|value| value.is_finite())
    }
}

/// Anything able to produce a full response curve for a soil and stress.
pub trait ResponseSource {
    /// Evaluate the response of `soil` under `normal_stress` on every sample of `axis`.
    ///
    /// Callers guarantee `normal_stress > 0`.
    fn response(&self, soil: SoilClass, normal_stress: f64, axis: &StrainAxis) -> ResponseCurve;
}

/// Coefficients of the dense soil formulas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseCoefficients {
    /// Strain at which the shear response switches to the softening branch.
    pub softening_strain: f64,
    /// Plateau of the hardening branch per unit `p`.
    pub peak_amplitude: f64,
    /// Time constant of the hardening branch at `p = 1`.
    pub hardening_constant: f64,
    /// Residual stress as a fraction of the hardening plateau.
    pub residual_ratio: f64,
    /// Share of the post-peak drop carried by the fast relaxation term.
    pub fast_share: f64,
    /// Time constant of the fast relaxation term at `p = 1`.
    pub softening_constant: f64,
    /// Ratio of the slow to the fast relaxation time constant.
    pub slow_ratio: f64,
    /// Exponent applied to `p` for every shear time constant.
    pub time_exponent: f64,
    /// Dilation amplitude at `p = 1`.
    pub dilation_amplitude: f64,
    /// Exponent applied to `p` for the dilation amplitude.
    pub dilation_exponent: f64,
    /// Quarter period of the dilation sine at `p = 1`.
    pub dilation_period: f64,
    /// Exponent applied to `p` for the dilation period.
    pub period_exponent: f64,
    /// Post-peak height asymptote at `p = 1`; scales with `1 / p`.
    pub critical_height: f64,
    /// Time constant of the post-peak height relaxation.
    pub height_constant: f64,
}

impl Default for DenseCoefficients {
    fn default() -> Self {
        Self {
            softening_strain: 0.19,
            peak_amplitude: 92.0,
            hardening_constant: 0.055,
            residual_ratio: 0.68,
            fast_share: 0.6,
            softening_constant: 0.14,
            slow_ratio: 1.072,
            time_exponent: 0.25,
            dilation_amplitude: 0.35,
            dilation_exponent: -0.5,
            dilation_period: 0.30,
            period_exponent: 0.2,
            critical_height: 0.40,
            height_constant: 0.12,
        }
    }
}

/// Coefficients of the loose soil formulas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LooseCoefficients {
    /// Ultimate shear stress per unit `p`.
    pub ultimate_stress: f64,
    /// Rate constant of the shear relaxation.
    pub shear_rate: f64,
    /// Ultimate height change at `p = 1` (negative = compression).
    pub ultimate_height: f64,
    /// Exponent applied to `p` for the ultimate height change.
    pub height_exponent: f64,
    /// Rate constant of the height relaxation at `p = 1`.
    pub height_rate: f64,
    /// Exponent applied to `1 / p` for the height rate.
    pub rate_exponent: f64,
}

impl Default for LooseCoefficients {
    fn default() -> Self {
        Self {
            ultimate_stress: 58.0,
            shear_rate: 6.5,
            ultimate_height: -0.55,
            height_exponent: 0.35,
            height_rate: 4.0,
            rate_exponent: 0.25,
        }
    }
}

/// Closed-form soil response model.
///
/// # Examples
/// ```
/// use shearbox::{ConstitutiveModel, SoilClass, StrainAxis};
///
/// let axis = StrainAxis::new(100.0, 100);
/// let curve = ConstitutiveModel::default().compute(SoilClass::Dense, 100.0, &axis);
/// assert_eq!(curve.len(), axis.len());
/// assert_eq!(curve.shear_stress[0], 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstitutiveModel {
    /// Formula set for dense soil.
    pub dense: DenseCoefficients,
    /// Formula set for loose soil.
    pub loose: LooseCoefficients,
}

impl ConstitutiveModel {
    /// Evaluate the full response curve for `soil` under `normal_stress` kPa.
    ///
    /// The output always covers every sample of `axis`. `normal_stress` must be
    /// strictly positive; parameter validation happens before this call.
    #[must_use]
    pub fn compute(&self, soil: SoilClass, normal_stress: f64, axis: &StrainAxis) -> ResponseCurve {
        debug_assert!(normal_stress > 0.0, "normal stress must be positive");
        let strain = axis.values();
        let (shear_stress, height_change) = match soil {
            SoilClass::Dense => self.dense_response(normal_stress, strain),
            SoilClass::Loose => self.loose_response(normal_stress, strain),
        };
        ResponseCurve {
            soil,
            normal_stress,
            shear_stress,
            height_change,
        }
    }

    /// Peak then two-term softening in shear; sine dilation then relaxation in height.
    fn dense_response(
        &self,
        normal_stress: f64,
        strain: ArrayView1<'_, f64>,
    ) -> (Array1<f64>, Array1<f64>) {
        let c = &self.dense;
        let p = normal_stress / REFERENCE_STRESS;
        let time_scale = p.powf(c.time_exponent);

        let plateau = c.peak_amplitude * p;
        let hardening = c.hardening_constant * time_scale;
        let hardening_branch = |eps: f64| plateau + (-plateau) * (-eps / hardening).exp();

        let residual = c.residual_ratio * plateau;
        let drop = hardening_branch(c.softening_strain) - residual;
        let fast = c.softening_constant * time_scale;
        let slow = c.slow_ratio * fast;

        let shear_stress = strain.mapv(|eps| {
            if eps < c.softening_strain {
                hardening_branch(eps)
            } else {
                let delta = eps - c.softening_strain;
                residual
                    + c.fast_share * drop * (-delta / fast).exp()
                    + (1.0 - c.fast_share) * drop * (-delta / slow).exp()
            }
        });

        let peak = stable_argmax(shear_stress.iter().copied()).unwrap_or(0);
        let peak_strain = strain[peak];
        let amplitude = c.dilation_amplitude * p.powf(c.dilation_exponent);
        let period = c.dilation_period * p.powf(c.period_exponent);
        let dilation = |eps: f64| amplitude * (FRAC_PI_2 * eps / period).sin();
        let peak_height = dilation(peak_strain);
        let critical = c.critical_height * (REFERENCE_STRESS / normal_stress);

        let mut height_change = Array1::zeros(strain.len());
        for (index, (height, &eps)) in height_change.iter_mut().zip(strain.iter()).enumerate() {
            *height = if index < peak {
                dilation(eps)
            } else {
                critical + (peak_height - critical) * (-(eps - peak_strain) / c.height_constant).exp()
            };
        }

        (shear_stress, height_change)
    }

    /// Single exponential hardening in shear and single exponential compression.
    fn loose_response(
        &self,
        normal_stress: f64,
        strain: ArrayView1<'_, f64>,
    ) -> (Array1<f64>, Array1<f64>) {
        let c = &self.loose;
        let p = normal_stress / REFERENCE_STRESS;

        let ultimate = c.ultimate_stress * p;
        let shear_stress = strain.mapv(|eps| ultimate + (-ultimate) * (-c.shear_rate * eps).exp());

        let settled = c.ultimate_height * p.powf(c.height_exponent);
        let rate = c.height_rate * (REFERENCE_STRESS / normal_stress).powf(c.rate_exponent);
        let mut height_change = Array1::zeros(strain.len());
        Zip::from(&mut height_change)
            .and(&strain)
            .for_each(|height, &eps| *height = settled + (-settled) * (-rate * eps).exp());

        (shear_stress, height_change)
    }
}

impl ResponseSource for ConstitutiveModel {
    fn response(&self, soil: SoilClass, normal_stress: f64, axis: &StrainAxis) -> ResponseCurve {
        self.compute(soil, normal_stress, axis)
    }
}

/// Index of the first maximum of `values`, or `None` when empty.
pub(crate) fn stable_argmax(values: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values.into_iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
