//! Frame assembly: full curves in, visible prefixes out.
//!
//! A [`Simulation`] owns the strain axis, the playback controller, the last
//! valid parameter snapshot and one cached curve per selected
//! (soil class, stress slot) pair. Curves are always computed in full; only the
//! assembled frame is cut to the cursor.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::annotate::{find_critical_state, find_peak, CriticalStateRule, Marker, MarkerKind};
use crate::envelope::{FailureEnvelope, FailureEnvelopeGeometry};
use crate::errors::ParameterError;
use crate::model::{ConstitutiveModel, ResponseCurve, ResponseSource};
use crate::playback::{
    AnimationController, AnimationState, ControlEvent, EndOfSeries, FrameDirective, PlaybackPhase,
};
use crate::soil::{Selection, SimulationParameters, SoilClass, StressSlot};
use crate::strain::StrainAxis;

/// Settings fixed for the lifetime of a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of strain samples `N`.
    pub samples: usize,
    /// Horizontal displacement covered by the strain axis.
    pub displacement_range: f64,
    /// Multiplier turning the current strain into the shear box offset.
    pub shear_box_scale: f64,
    /// Behaviour once playback reaches the final sample.
    pub end_of_series: EndOfSeries,
    /// How critical-state markers are placed.
    pub critical_state: CriticalStateRule,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            displacement_range: 100.0,
            shear_box_scale: 50.0,
            end_of_series: EndOfSeries::AutoStop,
            critical_state: CriticalStateRule::MaxHeightChange,
        }
    }
}

impl SimulationConfig {
    /// Settings of the single-curve variant: markers at the series end.
    pub fn single_curve() -> Self {
        Self {
            critical_state: CriticalStateRule::SeriesEnd,
            ..Default::default()
        }
    }

    /// Build the strain axis these settings describe.
    #[must_use]
    pub fn strain_axis(&self) -> StrainAxis {
        StrainAxis::new(self.displacement_range, self.samples)
    }
}

/// Any external input the simulation reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Button press or timer tick.
    Control(ControlEvent),
    /// New parameter snapshot from the input widgets.
    Parameters(SimulationParameters),
    /// New checklist or dropdown selection.
    Selection(Selection),
}

/// A marker resolved to plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerPoint {
    /// What the marker flags.
    pub kind: MarkerKind,
    /// Text drawn next to the marker.
    pub label: &'static str,
    /// Index into the strain axis.
    pub strain_index: usize,
    /// Strain at the marker.
    pub strain: f64,
    /// Shear stress at the marker, for the stress-strain plot.
    pub shear_stress: f64,
    /// Height change at the marker, for the volume-change plot.
    pub height_change: f64,
}

impl MarkerPoint {
    /// Look up the strain and curve values at the marker index.
    fn resolve(marker: Marker, axis: &StrainAxis, curve: &ResponseCurve) -> Self {
        Self {
            kind: marker.kind,
            label: marker.label,
            strain_index: marker.strain_index,
            strain: axis.strain(marker.strain_index),
            shear_stress: curve.shear_stress[marker.strain_index],
            height_change: curve.height_change[marker.strain_index],
        }
    }
}

/// Visible part of one response curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveFrame {
    /// Soil class of the curve.
    pub soil: SoilClass,
    /// Stress slot of the curve.
    pub slot: StressSlot,
    /// Normal stress of the curve in kilopascals.
    pub normal_stress: f64,
    /// Strain samples `[0, cursor]`.
    pub strain: Vec<f64>,
    /// Shear stress samples `[0, cursor]`.
    pub shear_stress: Vec<f64>,
    /// Height change samples `[0, cursor]`.
    pub height_change: Vec<f64>,
    /// Markers the cursor has already reached.
    pub markers: Vec<MarkerPoint>,
}

/// Everything the renderer needs for one update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationFrame {
    /// Playback cursor and run flag at assembly time.
    pub state: AnimationState,
    /// Coarse playback phase.
    pub phase: PlaybackPhase,
    /// Mirrors `state.running`.
    pub timer_enabled: bool,
    /// Horizontal offset of the moving shear box half.
    pub shear_box_displacement: f64,
    /// Visible curves in selection order.
    pub curves: Vec<CurveFrame>,
    /// Failure envelope for the current parameters; absent after a reset.
    pub envelope: Option<FailureEnvelopeGeometry>,
}

impl SimulationFrame {
    /// Total number of markers across all curves.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.curves.iter().map(|curve| curve.markers.len()).sum()
    }

    /// Returns `true` when the frame draws nothing at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.curves.is_empty() && self.envelope.is_none()
    }
}

/// Cached full-length curve for one selected pair.
#[derive(Debug, Clone)]
struct CachedCurve {
    /// Soil class of the pair.
    soil: SoilClass,
    /// Stress slot of the pair.
    slot: StressSlot,
    /// Full-length curve at the slot's normal stress.
    curve: ResponseCurve,
}

/// One interactive direct shear session.
///
/// # Examples
/// ```
/// use shearbox::{ControlEvent, Simulation, SimulationConfig};
///
/// let mut simulation = Simulation::new(SimulationConfig::default());
/// simulation.control(ControlEvent::Start);
/// for _ in 0..30 {
///     simulation.control(ControlEvent::Tick);
/// }
/// let frame = simulation.frame();
/// assert_eq!(frame.curves.len(), 3);
/// assert_eq!(frame.curves[0].strain.len(), 31);
/// ```
#[derive(Debug)]
pub struct Simulation<S = ConstitutiveModel> {
    /// Settings fixed at construction.
    config: SimulationConfig,
    /// Strain axis shared by every curve.
    axis: StrainAxis,
    /// Where curves come from.
    source: S,
    /// Playback state machine.
    controller: AnimationController,
    /// Last valid parameter snapshot.
    parameters: SimulationParameters,
    /// Pairs to show.
    selection: Selection,
    /// One cached curve per selected pair.
    curves: Vec<CachedCurve>,
    /// Set by a reset; the next frame is blank.
    clear_pending: bool,
}

impl Simulation<ConstitutiveModel> {
    /// Create a session using the closed-form model, default parameters and
    /// the dense soil with all three stress slots selected.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_source(config, ConstitutiveModel::default())
    }
}

impl<S: ResponseSource> Simulation<S> {
    /// Create a session drawing its curves from `source`.
    #[must_use]
    pub fn with_source(config: SimulationConfig, source: S) -> Self {
        let axis = config.strain_axis();
        let controller = AnimationController::new(axis.len(), config.end_of_series);
        let mut simulation = Self {
            config,
            axis,
            source,
            controller,
            parameters: SimulationParameters::default(),
            selection: Selection::default(),
            curves: Vec::new(),
            clear_pending: false,
        };
        simulation.refresh_curves();
        simulation
    }

    /// Session settings.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Shared strain axis.
    #[must_use]
    pub const fn axis(&self) -> &StrainAxis {
        &self.axis
    }

    /// Source the curves are drawn from.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Last accepted parameter snapshot.
    #[must_use]
    pub const fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Current playback cursor and run flag.
    #[must_use]
    pub const fn state(&self) -> AnimationState {
        self.controller.state()
    }

    /// Full-length curve of a selected pair, if it is selected.
    #[must_use]
    pub fn curve(&self, soil: SoilClass, slot: StressSlot) -> Option<&ResponseCurve> {
        self.curves
            .iter()
            .find(|cached| cached.soil == soil && cached.slot == slot)
            .map(|cached| &cached.curve)
    }

    /// Replace the parameter snapshot.
    ///
    /// Only curves whose normal stress changed are recomputed.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] when the snapshot is outside the model's
    /// domain; the previous snapshot and its curves are kept.
    pub fn set_parameters(&mut self, parameters: SimulationParameters) -> Result<(), ParameterError> {
        if let Err(error) = parameters.validate() {
            warn!(%error, "rejected parameter update, keeping last valid snapshot");
            return Err(error);
        }
        self.parameters = parameters;
        self.refresh_curves();
        Ok(())
    }

    /// Replace the selection, dropping curves of deselected pairs and
    /// computing only the newly selected ones.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.refresh_curves();
    }

    /// Forward a playback event to the controller.
    pub fn control(&mut self, event: ControlEvent) {
        if self.controller.apply(event) == FrameDirective::Clear {
            self.clear_pending = true;
        }
    }

    /// Apply one external event and assemble the resulting frame.
    ///
    /// A rejected parameter update is logged and otherwise ignored, so the
    /// frame reflects the last valid snapshot.
    pub fn handle(&mut self, event: SessionEvent) -> SimulationFrame {
        match event {
            SessionEvent::Control(event) => self.control(event),
            SessionEvent::Parameters(parameters) => {
                // Already logged; the last valid snapshot stays in effect.
                let _ = self.set_parameters(parameters);
            }
            SessionEvent::Selection(selection) => self.set_selection(selection),
        }
        self.frame()
    }

    /// Assemble the frame for the current cursor.
    ///
    /// The first frame after a reset is blank; assembly resumes normally on
    /// the following call.
    pub fn frame(&mut self) -> SimulationFrame {
        let state = self.controller.state();
        let phase = self.controller.phase();
        if std::mem::take(&mut self.clear_pending) {
            return SimulationFrame {
                state,
                phase,
                timer_enabled: state.running,
                shear_box_displacement: 0.0,
                curves: Vec::new(),
                envelope: None,
            };
        }

        let cursor = state.cursor.min(self.axis.last_index());
        debug_assert_eq!(cursor, state.cursor, "cursor out of range");
        let strain = self.axis.prefix(cursor).to_vec();

        let curves = self
            .selection
            .pairs()
            .into_iter()
            .filter_map(|(soil, slot)| self.curve(soil, slot).map(|curve| (soil, slot, curve)))
            .map(|(soil, slot, curve)| {
                let markers = [
                    find_peak(curve, cursor),
                    find_critical_state(curve, cursor, self.config.critical_state),
                ]
                .into_iter()
                .flatten()
                .map(|marker| MarkerPoint::resolve(marker, &self.axis, curve))
                .collect();
                CurveFrame {
                    soil,
                    slot,
                    normal_stress: curve.normal_stress,
                    strain: strain.clone(),
                    shear_stress: curve.shear_stress.iter().take(cursor + 1).copied().collect(),
                    height_change: curve.height_change.iter().take(cursor + 1).copied().collect(),
                    markers,
                }
            })
            .collect();

        SimulationFrame {
            state,
            phase,
            timer_enabled: self.controller.timer_enabled(),
            shear_box_displacement: self.axis.strain(cursor) * self.config.shear_box_scale,
            curves,
            envelope: Some(
                FailureEnvelope::from(&self.parameters).compute(self.parameters.normal_stresses()),
            ),
        }
    }

    /// Bring the cache in line with the selection and parameters.
    fn refresh_curves(&mut self) {
        let selection = &self.selection;
        let parameters = &self.parameters;
        self.curves.retain(|cached| {
            selection.contains(cached.soil, cached.slot)
                && cached.curve.normal_stress == parameters.normal_stress(cached.slot)
        });
        for (soil, slot) in self.selection.pairs() {
            if self.curve(soil, slot).is_some() {
                continue;
            }
            let normal_stress = self.parameters.normal_stress(slot);
            debug!(%soil, %slot, normal_stress, "computing response curve");
            let curve = self.source.response(soil, normal_stress, &self.axis);
            self.curves.push(CachedCurve { soil, slot, curve });
        }
    }
}
