use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use shearbox::{
    ControlEvent, ResponseSource, Selection, SessionEvent, Simulation, SimulationConfig,
    SimulationFrame, SimulationParameters, SoilClass, StressSlot,
};
use tracing::info;

/// Everything needed to start a headless replay.
///
/// Each section may be omitted from a session file and falls back to its
/// default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Test parameters.
    pub parameters: SimulationParameters,
    /// Axis, playback and marker settings.
    pub simulation: SimulationConfig,
    /// Curves to show.
    pub selection: Selection,
}

impl SessionSettings {
    /// Read settings from a JSON session file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&text)
            .map_err(|error| format!("invalid session file {}: {error}", path.display()))?;
        Ok(settings)
    }

    /// Assign up to three normal stresses to the slots in order.
    pub fn apply_stresses(&mut self, stresses: &[f64]) -> Result<(), Box<dyn Error>> {
        if stresses.len() > StressSlot::ALL.len() {
            return Err(format!(
                "at most three normal stresses can be given (received {})",
                stresses.len()
            )
            .into());
        }
        for (slot, &stress) in StressSlot::ALL.iter().zip(stresses) {
            match slot {
                StressSlot::First => self.parameters.normal_stress_1 = stress,
                StressSlot::Second => self.parameters.normal_stress_2 = stress,
                StressSlot::Third => self.parameters.normal_stress_3 = stress,
            }
        }
        Ok(())
    }

    /// Replace the soil classes and/or slots of the selection when given.
    pub fn apply_selection(&mut self, soils: &[SoilClass], slots: &[StressSlot]) {
        if soils.is_empty() && slots.is_empty() {
            return;
        }
        let soils = if soils.is_empty() {
            self.selection.soils().to_vec()
        } else {
            soils.to_vec()
        };
        let slots = if slots.is_empty() {
            self.selection.slots().to_vec()
        } else {
            slots.to_vec()
        };
        self.selection = Selection::new(soils, slots);
    }
}

/// Build a session from `settings`, press start and tick until playback stops
/// or `ticks` ticks have elapsed. Every frame is handed to `on_frame`; the last
/// one is returned.
pub fn replay<S: ResponseSource>(
    mut simulation: Simulation<S>,
    settings: &SessionSettings,
    ticks: Option<usize>,
    mut on_frame: impl FnMut(&SimulationFrame),
) -> Result<SimulationFrame, Box<dyn Error>> {
    simulation.set_parameters(settings.parameters)?;
    simulation.set_selection(settings.selection.clone());

    let limit = ticks.unwrap_or_else(|| simulation.axis().last_index());
    info!(
        samples = simulation.axis().len(),
        curves = settings.selection.pairs().len(),
        limit,
        "starting replay"
    );

    let mut frame = simulation.handle(SessionEvent::Control(ControlEvent::Start));
    on_frame(&frame);
    for _ in 0..limit {
        if !frame.timer_enabled {
            break;
        }
        frame = simulation.handle(SessionEvent::Control(ControlEvent::Tick));
        on_frame(&frame);
    }

    info!(cursor = frame.state.cursor, markers = frame.marker_count(), "replay finished");
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_runs_to_series_end() {
        let settings = SessionSettings::default();
        let mut frames = 0;
        let frame = replay(
            Simulation::new(settings.simulation),
            &settings,
            None,
            |_| frames += 1,
        )
        .expect("default session is valid");
        assert_eq!(frame.state.cursor, 99);
        assert!(!frame.timer_enabled);
        assert_eq!(frames, 100);
    }

    #[test]
    fn replay_honours_tick_limit() {
        let settings = SessionSettings::default();
        let frame = replay(Simulation::new(settings.simulation), &settings, Some(10), |_| {})
            .expect("default session is valid");
        assert_eq!(frame.state.cursor, 10);
        assert!(frame.timer_enabled);
    }

    #[test]
    fn invalid_parameters_abort_replay() {
        let mut settings = SessionSettings::default();
        settings.parameters.cohesion = -5.0;
        let result = replay(Simulation::new(settings.simulation), &settings, None, |_| {});
        assert!(result.is_err());
    }

    #[test]
    fn stresses_fill_slots_in_order() {
        let mut settings = SessionSettings::default();
        settings
            .apply_stresses(&[20.0, 40.0])
            .expect("two stresses accepted");
        assert_eq!(settings.parameters.normal_stresses(), [20.0, 40.0, 200.0]);
        assert!(settings.apply_stresses(&[1.0, 2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn selection_overrides_keep_unspecified_part() {
        let mut settings = SessionSettings::default();
        settings.apply_selection(&[SoilClass::Loose], &[]);
        assert_eq!(settings.selection.soils(), &[SoilClass::Loose]);
        assert_eq!(settings.selection.slots(), &StressSlot::ALL);
    }

    #[test]
    fn session_file_sections_are_optional() {
        let settings: SessionSettings = serde_json::from_str(
            r#"{ "parameters": { "friction_angle": 35.0 }, "simulation": { "samples": 50 } }"#,
        )
        .expect("valid session");
        assert_eq!(settings.parameters.friction_angle, 35.0);
        assert_eq!(settings.simulation.samples, 50);
        assert_eq!(settings.selection, Selection::default());
    }
}
