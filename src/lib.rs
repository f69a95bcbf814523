#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

mod annotate;
mod envelope;
mod errors;
mod model;
mod playback;
mod reference;
mod simulation;
mod soil;
mod strain;

pub use annotate::{find_critical_state, find_peak, CriticalStateRule, Marker, MarkerKind};
pub use envelope::{FailureEnvelope, FailureEnvelopeGeometry, StressPoint, PLOT_MARGIN};
pub use errors::{LabelParseError, ParameterError, ReferenceDataError};
pub use model::{
    ConstitutiveModel, DenseCoefficients, LooseCoefficients, ResponseCurve, ResponseSource,
    REFERENCE_STRESS,
};
pub use playback::{
    AnimationController, AnimationState, ControlEvent, EndOfSeries, FrameDirective, PlaybackPhase,
};
pub use reference::ReferenceTable;
pub use simulation::{
    CurveFrame, MarkerPoint, SessionEvent, Simulation, SimulationConfig, SimulationFrame,
};
pub use soil::{Selection, SimulationParameters, SoilClass, StressSlot, MAX_FRICTION_ANGLE};
pub use strain::{StrainAxis, REFERENCE_LENGTH};
