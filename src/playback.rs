//! Playback control: the cursor that reveals curves sample by sample.
//!
//! The controller is the only mutable state carried between ticks. Each
//! session owns its own instance; nothing here is global.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Discrete input driving playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlEvent {
    /// Begin or resume playback, rewinding first when the series is complete.
    Start,
    /// Freeze the cursor.
    Pause,
    /// Rewind to the first sample, stop, and clear the display once.
    Reset,
    /// Advance one sample; ignored unless running.
    Tick,
}

/// Coarse playback state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// Not running and not started since the last reset or completed run.
    #[default]
    Idle,
    /// Cursor advances on every tick.
    Running,
    /// Stopped after a start; cursor retained.
    Paused,
}

/// What happens when the cursor reaches the final sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfSeries {
    /// Stop running and return to [`PlaybackPhase::Idle`].
    #[default]
    AutoStop,
    /// Keep running with the cursor held on the final sample.
    Hold,
}

/// Cursor position and run flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AnimationState {
    /// Index of the last visible sample.
    pub cursor: usize,
    /// Whether ticks advance the cursor; also enables the external timer.
    pub running: bool,
}

/// How the next frame should be assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameDirective {
    /// Assemble the visible prefix as usual.
    Assemble,
    /// Emit an empty frame for this cycle.
    Clear,
}

/// State machine owning the playback cursor.
///
/// # Examples
/// ```
/// use shearbox::{AnimationController, ControlEvent, EndOfSeries};
///
/// let mut controller = AnimationController::new(3, EndOfSeries::AutoStop);
/// controller.apply(ControlEvent::Start);
/// controller.apply(ControlEvent::Tick);
/// controller.apply(ControlEvent::Tick);
/// assert_eq!(controller.state().cursor, 2);
/// assert!(!controller.state().running);
/// ```
#[derive(Clone, Debug)]
pub struct AnimationController {
    /// Cursor and run flag.
    state: AnimationState,
    /// Coarse phase reported to the renderer.
    phase: PlaybackPhase,
    /// Index of the final strain sample.
    last_index: usize,
    /// What happens once the cursor reaches `last_index`.
    end_of_series: EndOfSeries,
}

impl AnimationController {
    /// Create an idle controller for a series of `samples` samples.
    #[must_use]
    pub fn new(samples: usize, end_of_series: EndOfSeries) -> Self {
        Self {
            state: AnimationState::default(),
            phase: PlaybackPhase::Idle,
            last_index: samples.saturating_sub(1),
            end_of_series,
        }
    }

    /// Current cursor and run flag.
    #[must_use]
    pub const fn state(&self) -> AnimationState {
        self.state
    }

    /// Current coarse phase.
    #[must_use]
    pub const fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Whether the external timer should fire.
    #[must_use]
    pub const fn timer_enabled(&self) -> bool {
        self.state.running
    }

    /// Returns `true` once the cursor sits on the final sample.
    #[must_use]
    pub const fn at_series_end(&self) -> bool {
        self.state.cursor >= self.last_index
    }

    /// Apply one event and report how the following frame must be built.
    pub fn apply(&mut self, event: ControlEvent) -> FrameDirective {
        let before = self.state;
        let directive = match event {
            ControlEvent::Start => {
                if self.at_series_end() {
                    self.state.cursor = 0;
                }
                self.state.running = true;
                self.phase = PlaybackPhase::Running;
                FrameDirective::Assemble
            }
            ControlEvent::Pause => {
                self.state.running = false;
                if self.phase == PlaybackPhase::Running {
                    self.phase = PlaybackPhase::Paused;
                }
                FrameDirective::Assemble
            }
            ControlEvent::Reset => {
                self.state = AnimationState::default();
                self.phase = PlaybackPhase::Idle;
                FrameDirective::Clear
            }
            ControlEvent::Tick => {
                self.tick();
                FrameDirective::Assemble
            }
        };
        debug_assert!(self.state.cursor <= self.last_index, "cursor out of range");
        if before != self.state {
            debug!(
                ?event,
                cursor = self.state.cursor,
                running = self.state.running,
                phase = ?self.phase,
                "playback transition"
            );
        }
        directive
    }

    /// Advance the cursor by one sample, stopping or holding at the end.
    fn tick(&mut self) {
        if !self.state.running {
            return;
        }
        self.state.cursor = (self.state.cursor + 1).min(self.last_index);
        if self.at_series_end() && self.end_of_series == EndOfSeries::AutoStop {
            self.state.running = false;
            self.phase = PlaybackPhase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_ticks(controller: &mut AnimationController, ticks: usize) {
        for _ in 0..ticks {
            controller.apply(ControlEvent::Tick);
        }
    }

    #[test]
    fn starts_idle_at_origin() {
        let controller = AnimationController::new(10, EndOfSeries::AutoStop);
        assert_eq!(controller.state(), AnimationState { cursor: 0, running: false });
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
        assert!(!controller.timer_enabled());
    }

    #[test]
    fn ticks_are_ignored_until_started() {
        let mut controller = AnimationController::new(10, EndOfSeries::AutoStop);
        run_ticks(&mut controller, 5);
        assert_eq!(controller.state().cursor, 0);
    }

    #[test]
    fn cursor_is_monotonic_and_bounded() {
        for end_of_series in [EndOfSeries::AutoStop, EndOfSeries::Hold] {
            let mut controller = AnimationController::new(10, end_of_series);
            controller.apply(ControlEvent::Start);
            let mut previous = controller.state().cursor;
            for _ in 0..25 {
                controller.apply(ControlEvent::Tick);
                let cursor = controller.state().cursor;
                assert!(cursor >= previous);
                assert!(cursor <= 9);
                previous = cursor;
            }
            assert_eq!(previous, 9);
        }
    }

    #[test]
    fn auto_stop_halts_at_final_sample() {
        let mut controller = AnimationController::new(5, EndOfSeries::AutoStop);
        controller.apply(ControlEvent::Start);
        run_ticks(&mut controller, 3);
        assert!(controller.timer_enabled());
        controller.apply(ControlEvent::Tick);
        assert_eq!(controller.state(), AnimationState { cursor: 4, running: false });
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn hold_keeps_running_at_final_sample() {
        let mut controller = AnimationController::new(5, EndOfSeries::Hold);
        controller.apply(ControlEvent::Start);
        run_ticks(&mut controller, 10);
        assert_eq!(controller.state(), AnimationState { cursor: 4, running: true });
        assert_eq!(controller.phase(), PlaybackPhase::Running);
    }

    #[test]
    fn start_at_end_rewinds() {
        let mut controller = AnimationController::new(5, EndOfSeries::Hold);
        controller.apply(ControlEvent::Start);
        run_ticks(&mut controller, 4);
        assert_eq!(controller.state().cursor, 4);
        controller.apply(ControlEvent::Start);
        assert_eq!(controller.state(), AnimationState { cursor: 0, running: true });
    }

    #[test]
    fn pause_retains_cursor_and_resume_continues() {
        let mut controller = AnimationController::new(10, EndOfSeries::AutoStop);
        controller.apply(ControlEvent::Start);
        run_ticks(&mut controller, 3);
        assert_eq!(controller.apply(ControlEvent::Pause), FrameDirective::Assemble);
        assert_eq!(controller.state(), AnimationState { cursor: 3, running: false });
        assert_eq!(controller.phase(), PlaybackPhase::Paused);
        run_ticks(&mut controller, 3);
        assert_eq!(controller.state().cursor, 3);
        controller.apply(ControlEvent::Start);
        controller.apply(ControlEvent::Tick);
        assert_eq!(controller.state().cursor, 4);
    }

    #[test]
    fn pause_while_idle_stays_idle() {
        let mut controller = AnimationController::new(10, EndOfSeries::AutoStop);
        controller.apply(ControlEvent::Pause);
        assert_eq!(controller.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn reset_always_returns_to_origin_and_clears() {
        let scripts: [&[ControlEvent]; 4] = [
            &[],
            &[ControlEvent::Start, ControlEvent::Tick, ControlEvent::Tick],
            &[ControlEvent::Start, ControlEvent::Tick, ControlEvent::Pause],
            &[ControlEvent::Reset],
        ];
        for script in scripts {
            let mut controller = AnimationController::new(10, EndOfSeries::AutoStop);
            for &event in script {
                controller.apply(event);
            }
            assert_eq!(controller.apply(ControlEvent::Reset), FrameDirective::Clear);
            assert_eq!(controller.state(), AnimationState::default());
            assert_eq!(controller.phase(), PlaybackPhase::Idle);
        }
    }

    #[test]
    fn single_sample_series_never_advances() {
        let mut controller = AnimationController::new(1, EndOfSeries::AutoStop);
        controller.apply(ControlEvent::Start);
        controller.apply(ControlEvent::Tick);
        assert_eq!(controller.state().cursor, 0);
        assert!(!controller.timer_enabled());
    }
}
