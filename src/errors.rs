//! Error types produced while configuring or feeding a simulation.

use thiserror::Error;

use crate::soil::StressSlot;

/// Error returned when a parameter snapshot cannot be used by the soil model.
///
/// Some response formulas divide by the normal stress, so a snapshot is
/// validated as a whole before any curve is evaluated. The variants carry the
/// rejected value so callers can present actionable feedback to users.
///
/// # Examples
///
/// ```
/// use shearbox::{ParameterError, SimulationParameters, StressSlot};
///
/// let params = SimulationParameters {
///     normal_stress_2: 0.0,
///     ..SimulationParameters::default()
/// };
/// let error = params.validate().expect_err("zero normal stress is rejected");
/// assert_eq!(
///     error,
///     ParameterError::NonPositiveNormalStress { slot: StressSlot::Second, value: 0.0 }
/// );
/// ```
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ParameterError {
    /// Returned when a normal stress is zero, negative or not finite.
    #[error("normal stress in slot {slot} must be positive (received {value} kPa)")]
    NonPositiveNormalStress {
        /// Slot holding the rejected value.
        slot: StressSlot,
        /// Rejected normal stress in kilopascals.
        value: f64,
    },
    /// Returned when a normal stress is so close to zero that the stress
    /// ratio `100 / σ` overflows.
    #[error("normal stress in slot {slot} is too small to evaluate (received {value} kPa)")]
    NormalStressTooSmall {
        /// Slot holding the rejected value.
        slot: StressSlot,
        /// Rejected normal stress in kilopascals.
        value: f64,
    },
    /// Returned when the friction angle lies outside `[0, 50]` degrees.
    #[error("friction angle must lie within [0, 50] degrees (received {value})")]
    FrictionAngleOutOfRange {
        /// Rejected friction angle in degrees.
        value: f64,
    },
    /// Returned when the cohesion is negative or not finite.
    #[error("cohesion must be non-negative (received {value} kPa)")]
    NegativeCohesion {
        /// Rejected cohesion in kilopascals.
        value: f64,
    },
}

/// Error returned when loading a tabulated reference response.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    /// Returned when the underlying CSV stream cannot be decoded.
    #[error("failed to read reference table: {0}")]
    Csv(#[from] csv::Error),
    /// Returned when the table holds no rows.
    #[error("reference table contains no samples")]
    Empty,
    /// Returned when the strain column does not increase strictly.
    #[error("strain column must increase strictly (row {row}: {value})")]
    NonIncreasingStrain {
        /// Zero-based data row of the offending sample.
        row: usize,
        /// Offending strain value.
        value: f64,
    },
    /// Returned when any cell holds NaN or an infinity.
    #[error("reference table row {row} contains a non-finite value")]
    NonFinite {
        /// Zero-based data row of the offending sample.
        row: usize,
    },
}

/// Error returned when parsing a soil class or stress slot label.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LabelParseError {
    /// Returned for a soil class label other than `dense` or `loose`.
    #[error("unknown soil class '{0}' (expected 'dense' or 'loose')")]
    UnknownSoilClass(String),
    /// Returned for a stress slot label other than `1`, `2` or `3`.
    #[error("unknown stress slot '{0}' (expected 1, 2 or 3)")]
    UnknownStressSlot(String),
}
