//! Soil classes, stress slots and the parameter snapshot fed to the model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uom::si::angle::degree;
use uom::si::f64::Angle;

use crate::errors::{LabelParseError, ParameterError};
use crate::model::REFERENCE_STRESS;

/// Upper bound of the friction angle accepted by the model, in degrees.
pub const MAX_FRICTION_ANGLE: f64 = 50.0;

/// Soil state selecting which family of response formulas applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilClass {
    /// Dense sand or overconsolidated clay: peak followed by softening, dilation.
    Dense,
    /// Loose sand or normally consolidated clay: hardening, net compression.
    Loose,
}

impl SoilClass {
    /// Both soil classes in display order.
    pub const ALL: [SoilClass; 2] = [SoilClass::Dense, SoilClass::Loose];

    /// Human-readable description used in reports.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            SoilClass::Dense => "Dense sand / OC clay",
            SoilClass::Loose => "Loose sand / NC clay",
        }
    }
}

impl fmt::Display for SoilClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoilClass::Dense => f.write_str("dense"),
            SoilClass::Loose => f.write_str("loose"),
        }
    }
}

impl FromStr for SoilClass {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dense" => Ok(SoilClass::Dense),
            "loose" => Ok(SoilClass::Loose),
            _ => Err(LabelParseError::UnknownSoilClass(s.to_owned())),
        }
    }
}

/// One of the three normal-stress inputs of a test series.
///
/// The slot is only a label for selection and colouring; the response math
/// depends on the stress value, never on the slot itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressSlot {
    /// Normal stress 1.
    First,
    /// Normal stress 2.
    Second,
    /// Normal stress 3.
    Third,
}

impl StressSlot {
    /// All slots in input order.
    pub const ALL: [StressSlot; 3] = [StressSlot::First, StressSlot::Second, StressSlot::Third];

    /// One-based slot number.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            StressSlot::First => 1,
            StressSlot::Second => 2,
            StressSlot::Third => 3,
        }
    }
}

impl fmt::Display for StressSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for StressSlot {
    type Err = LabelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(StressSlot::First),
            "2" => Ok(StressSlot::Second),
            "3" => Ok(StressSlot::Third),
            _ => Err(LabelParseError::UnknownStressSlot(s.to_owned())),
        }
    }
}

/// Snapshot of the user-controlled test parameters.
///
/// Normal stresses and cohesion are in kilopascals, the friction angle in
/// degrees. A snapshot is immutable once handed to the simulation; an edit
/// produces a new snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Normal stress applied in slot 1.
    pub normal_stress_1: f64,
    /// Normal stress applied in slot 2.
    pub normal_stress_2: f64,
    /// Normal stress applied in slot 3.
    pub normal_stress_3: f64,
    /// Apparent cohesion `c`.
    pub cohesion: f64,
    /// Friction angle `φ`.
    pub friction_angle: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            normal_stress_1: 50.0,
            normal_stress_2: 100.0,
            normal_stress_3: 200.0,
            cohesion: 0.0,
            friction_angle: 30.0,
        }
    }
}

impl SimulationParameters {
    /// Normal stress assigned to `slot`.
    #[must_use]
    pub const fn normal_stress(&self, slot: StressSlot) -> f64 {
        match slot {
            StressSlot::First => self.normal_stress_1,
            StressSlot::Second => self.normal_stress_2,
            StressSlot::Third => self.normal_stress_3,
        }
    }

    /// The three normal stresses in slot order.
    #[must_use]
    pub const fn normal_stresses(&self) -> [f64; 3] {
        [self.normal_stress_1, self.normal_stress_2, self.normal_stress_3]
    }

    /// Friction angle as a typed angle quantity.
    #[must_use]
    pub fn friction_angle(&self) -> Angle {
        Angle::new::<degree>(self.friction_angle)
    }

    /// Check that the snapshot lies inside the model's domain.
    ///
    /// # Errors
    ///
    /// Returns the first offending field as a [`ParameterError`]: normal
    /// stresses must be strictly positive with a finite ratio `100 / σ`, the
    /// cohesion non-negative and the friction angle within `[0, 50]` degrees.
    /// NaN and infinities are rejected.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for slot in StressSlot::ALL {
            let value = self.normal_stress(slot);
            if !(value > 0.0 && value.is_finite()) {
                return Err(ParameterError::NonPositiveNormalStress { slot, value });
            }
            if !(REFERENCE_STRESS / value).is_finite() {
                return Err(ParameterError::NormalStressTooSmall { slot, value });
            }
        }
        if !(self.cohesion >= 0.0 && self.cohesion.is_finite()) {
            return Err(ParameterError::NegativeCohesion {
                value: self.cohesion,
            });
        }
        if !(0.0..=MAX_FRICTION_ANGLE).contains(&self.friction_angle) {
            return Err(ParameterError::FrictionAngleOutOfRange {
                value: self.friction_angle,
            });
        }
        Ok(())
    }
}

/// The (soil class, stress slot) pairs currently shown.
///
/// Soil classes and slots keep the order in which they were first selected;
/// repeated entries are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Selected soil classes, first occurrence order.
    soils: Vec<SoilClass>,
    /// Selected stress slots, first occurrence order.
    slots: Vec<StressSlot>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::single_soil(SoilClass::Dense)
    }
}

impl Selection {
    /// Build a selection from checklist values.
    ///
    /// # Examples
    /// ```
    /// use shearbox::{Selection, SoilClass, StressSlot};
    ///
    /// let selection = Selection::new(
    ///     [SoilClass::Loose, SoilClass::Dense, SoilClass::Loose],
    ///     [StressSlot::Third, StressSlot::First],
    /// );
    /// let pairs = selection.pairs();
    /// assert_eq!(pairs.len(), 4);
    /// assert_eq!(pairs[0], (SoilClass::Loose, StressSlot::Third));
    /// ```
    #[must_use]
    pub fn new(
        soils: impl IntoIterator<Item = SoilClass>,
        slots: impl IntoIterator<Item = StressSlot>,
    ) -> Self {
        Self {
            soils: dedup_in_order(soils),
            slots: dedup_in_order(slots),
        }
    }

    /// One soil class with all three stress slots, as chosen from a dropdown.
    #[must_use]
    pub fn single_soil(soil: SoilClass) -> Self {
        Self::new([soil], StressSlot::ALL)
    }

    /// Nothing selected.
    #[must_use]
    pub fn empty() -> Self {
        Self::new([], [])
    }

    /// Selected soil classes in selection order.
    #[must_use]
    pub fn soils(&self) -> &[SoilClass] {
        &self.soils
    }

    /// Selected stress slots in selection order.
    #[must_use]
    pub fn slots(&self) -> &[StressSlot] {
        &self.slots
    }

    /// Returns `true` when no curve would be shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.soils.is_empty() || self.slots.is_empty()
    }

    /// All selected pairs, soil-major, preserving selection order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(SoilClass, StressSlot)> {
        self.soils
            .iter()
            .flat_map(|&soil| self.slots.iter().map(move |&slot| (soil, slot)))
            .collect()
    }

    /// Returns `true` when `(soil, slot)` is part of the selection.
    #[must_use]
    pub fn contains(&self, soil: SoilClass, slot: StressSlot) -> bool {
        self.soils.contains(&soil) && self.slots.contains(&slot)
    }
}

/// Drop repeated items, keeping the first occurrence of each.
fn dedup_in_order<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_are_valid() {
        assert_eq!(SimulationParameters::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_fields_are_reported() {
        let negative = SimulationParameters {
            normal_stress_3: -10.0,
            ..SimulationParameters::default()
        };
        assert_eq!(
            negative.validate(),
            Err(ParameterError::NonPositiveNormalStress {
                slot: StressSlot::Third,
                value: -10.0
            })
        );

        let cohesion = SimulationParameters {
            cohesion: -1.0,
            ..SimulationParameters::default()
        };
        assert_eq!(
            cohesion.validate(),
            Err(ParameterError::NegativeCohesion { value: -1.0 })
        );

        let steep = SimulationParameters {
            friction_angle: 50.5,
            ..SimulationParameters::default()
        };
        assert_eq!(
            steep.validate(),
            Err(ParameterError::FrictionAngleOutOfRange { value: 50.5 })
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let nan = SimulationParameters {
            normal_stress_1: f64::NAN,
            ..SimulationParameters::default()
        };
        assert!(matches!(
            nan.validate(),
            Err(ParameterError::NonPositiveNormalStress {
                slot: StressSlot::First,
                ..
            })
        ));

        let angle = SimulationParameters {
            friction_angle: f64::NAN,
            ..SimulationParameters::default()
        };
        assert!(matches!(
            angle.validate(),
            Err(ParameterError::FrictionAngleOutOfRange { .. })
        ));
    }

    #[test]
    fn subnormal_normal_stress_is_rejected() {
        let tiny = SimulationParameters {
            normal_stress_2: 1.0e-310,
            ..SimulationParameters::default()
        };
        assert_eq!(
            tiny.validate(),
            Err(ParameterError::NormalStressTooSmall {
                slot: StressSlot::Second,
                value: 1.0e-310
            })
        );

        let small = SimulationParameters {
            normal_stress_2: 1.0e-300,
            ..SimulationParameters::default()
        };
        assert_eq!(small.validate(), Ok(()));
    }

    #[test]
    fn friction_angle_bounds_are_inclusive() {
        for friction_angle in [0.0, MAX_FRICTION_ANGLE] {
            let params = SimulationParameters {
                friction_angle,
                ..SimulationParameters::default()
            };
            assert_eq!(params.validate(), Ok(()));
        }
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("Dense".parse::<SoilClass>(), Ok(SoilClass::Dense));
        assert_eq!(" loose ".parse::<SoilClass>(), Ok(SoilClass::Loose));
        assert_eq!("2".parse::<StressSlot>(), Ok(StressSlot::Second));
        assert!("medium".parse::<SoilClass>().is_err());
        assert!("4".parse::<StressSlot>().is_err());
    }

    #[test]
    fn selection_keeps_first_occurrence_order() {
        let selection = Selection::new(
            [SoilClass::Loose, SoilClass::Dense],
            [StressSlot::Second, StressSlot::First, StressSlot::Second],
        );
        assert_eq!(
            selection.pairs(),
            vec![
                (SoilClass::Loose, StressSlot::Second),
                (SoilClass::Loose, StressSlot::First),
                (SoilClass::Dense, StressSlot::Second),
                (SoilClass::Dense, StressSlot::First),
            ]
        );
        assert!(selection.contains(SoilClass::Dense, StressSlot::First));
        assert!(!selection.contains(SoilClass::Dense, StressSlot::Third));
    }

    #[test]
    fn partial_selection_is_empty() {
        assert!(Selection::new([SoilClass::Dense], []).is_empty());
        assert!(Selection::new([], [StressSlot::First]).is_empty());
        assert!(Selection::empty().pairs().is_empty());
    }

    #[test]
    fn parameters_deserialize_with_defaults() {
        let params: SimulationParameters =
            serde_json::from_str(r#"{ "cohesion": 25.0 }"#).expect("valid json");
        assert_eq!(params.cohesion, 25.0);
        assert_eq!(params.normal_stress_2, 100.0);
    }
}
