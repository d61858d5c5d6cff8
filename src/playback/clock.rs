//! The playback clock: a pure frame counter driven by host-supplied elapsed
//! time.
//!
//! The clock never schedules anything itself. The host calls
//! [`AnimationClock::tick`] once per display frame with the wall-clock time
//! since the previous call; the clock folds that into a sub-frame-accurate
//! frame counter, handles bounds and looping, and reports what happened so
//! the owner can re-evaluate and notify.

use std::time::Duration;

use crate::foundation::core::FrameRange;
use crate::foundation::error::{AnimyteError, AnimyteResult};
use crate::foundation::math::lerp;

/// Where the clock is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockState {
    /// Created but never played.
    #[default]
    Idle,
    /// Advancing on every tick.
    Running,
    /// Stopped, resumable from the current frame.
    Paused,
    /// Stopped via cancel; the frame stays where it was.
    Cancelled,
    /// Ran out of repeats, or was ended explicitly.
    Ended,
}

/// What happens when the frame exits the playable window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatMode {
    /// Wrap to the opposite bound and keep going.
    #[default]
    Restart,
    /// Flip the speed sign and reflect the overshoot back inside.
    Reverse,
}

/// What one [`AnimationClock::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The reported frame moved.
    pub updated: bool,
    /// The clock wrapped or reflected at a bound.
    pub repeated: bool,
    /// Playback finished on this tick.
    pub ended: bool,
}

/// Frame clock for one composition.
///
/// Frames advance by `elapsed_seconds * frame_rate * speed` per tick and
/// stay inside `[min_frame, max_frame]`, which default to the composition's
/// authored range. All bound setters clamp the current frame into the new
/// window.
#[derive(Debug)]
pub struct AnimationClock {
    range: FrameRange,
    frame_rate: f32,
    state: ClockState,
    speed: f32,
    // Set while REVERSE looping has the speed sign flipped; changing the
    // repeat mode restores the authored sign.
    speed_reversed_for_repeat: bool,
    use_composition_frame_rate: bool,
    repeat_mode: RepeatMode,
    repeat_count: Option<u32>,
    repeats_done: u32,
    min_frame: Option<f32>,
    max_frame: Option<f32>,
    frame_raw: f32,
    frame: f32,
}

impl AnimationClock {
    /// A clock over the given frame range, idle at the range start.
    pub fn new(range: FrameRange, frame_rate: f32) -> Self {
        Self {
            range,
            frame_rate,
            state: ClockState::Idle,
            speed: 1.0,
            speed_reversed_for_repeat: false,
            use_composition_frame_rate: false,
            repeat_mode: RepeatMode::Restart,
            repeat_count: None,
            repeats_done: 0,
            min_frame: None,
            max_frame: None,
            frame_raw: range.start,
            frame: range.start,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Whether ticks advance the frame.
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// The reported frame. With `use_composition_frame_rate` this is the
    /// raw counter floored to a whole authored frame.
    pub fn frame(&self) -> f32 {
        self.frame
    }

    /// Progress of the reported frame over the full authored range,
    /// regardless of playback bounds.
    pub fn progress(&self) -> f32 {
        self.range.progress_for_frame(self.frame)
    }

    /// Playback speed; negative plays backwards.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the playback speed.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Loop behavior at the bounds.
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    /// Set the loop behavior. If REVERSE looping left the speed flipped,
    /// the authored sign comes back.
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
        if self.speed_reversed_for_repeat {
            self.speed_reversed_for_repeat = false;
            self.speed = -self.speed;
        }
    }

    /// How many loop events may fire before the clock ends; `None` loops
    /// forever.
    pub fn repeat_count(&self) -> Option<u32> {
        self.repeat_count
    }

    /// Bound the number of loop events.
    pub fn set_repeat_count(&mut self, count: Option<u32>) {
        self.repeat_count = count;
    }

    /// Report whole frames only, stepping at the authored rate while the
    /// raw counter keeps sub-frame accuracy.
    pub fn set_use_composition_frame_rate(&mut self, enabled: bool) {
        self.use_composition_frame_rate = enabled;
    }

    /// Lower playable bound.
    pub fn min_frame(&self) -> f32 {
        self.min_frame.unwrap_or(self.range.start)
    }

    /// Upper playable bound.
    pub fn max_frame(&self) -> f32 {
        self.max_frame.unwrap_or(self.range.end)
    }

    /// Start from the beginning: the min bound, or the max bound when the
    /// speed is negative.
    pub fn play(&mut self) {
        self.state = ClockState::Running;
        self.repeats_done = 0;
        let start = if self.speed < 0.0 {
            self.max_frame()
        } else {
            self.min_frame()
        };
        self.frame_raw = start;
        self.frame = self.reported(start);
    }

    /// Continue from the current frame without resetting.
    pub fn resume(&mut self) {
        self.state = ClockState::Running;
    }

    /// Stop advancing; `resume` picks up where this left off.
    pub fn pause(&mut self) {
        self.state = ClockState::Paused;
    }

    /// Stop advancing without restoring any frame. The owner reports the
    /// end notification.
    pub fn cancel(&mut self) {
        self.state = ClockState::Cancelled;
    }

    /// Finish playback now.
    pub fn end(&mut self) {
        self.state = ClockState::Ended;
    }

    /// Advance by host elapsed time. Idle, paused, cancelled, and ended
    /// clocks ignore ticks.
    pub fn tick(&mut self, elapsed: Duration) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.state != ClockState::Running || self.frame_rate <= 0.0 {
            return outcome;
        }
        let before = self.frame;
        let delta = elapsed.as_secs_f32() * self.frame_rate * self.speed;
        let mut raw = self.frame_raw + delta;
        let (min, max) = (self.min_frame(), self.max_frame());
        if raw < min || raw > max {
            let exhausted = self
                .repeat_count
                .is_some_and(|count| self.repeats_done >= count);
            if exhausted {
                raw = raw.clamp(min, max);
                self.state = ClockState::Ended;
                outcome.ended = true;
            } else {
                self.repeats_done += 1;
                outcome.repeated = true;
                match self.repeat_mode {
                    RepeatMode::Restart => {
                        raw = if raw > max { min } else { max };
                    }
                    RepeatMode::Reverse => {
                        raw = if raw > max {
                            max - (raw - max)
                        } else {
                            min + (min - raw)
                        };
                        self.speed = -self.speed;
                        self.speed_reversed_for_repeat = !self.speed_reversed_for_repeat;
                    }
                }
                raw = raw.clamp(min, max);
            }
        }
        self.frame_raw = raw;
        self.frame = self.reported(raw);
        outcome.updated = self.frame != before;
        outcome
    }

    /// Jump to an absolute frame, clamped into the playable bounds.
    /// Returns whether the reported frame moved.
    pub fn set_frame(&mut self, frame: f32) -> bool {
        let before = self.frame;
        self.frame_raw = frame.clamp(self.min_frame(), self.max_frame());
        self.frame = self.reported(self.frame_raw);
        self.frame != before
    }

    /// Jump to a progress fraction of the authored range. Conversions
    /// truncate toward zero.
    pub fn set_progress(&mut self, progress: f32) -> bool {
        self.set_frame(self.frame_for_progress(progress))
    }

    /// Set the lower bound by absolute frame.
    pub fn set_min_frame(&mut self, min: f32) -> AnimyteResult<()> {
        self.set_min_and_max_frame(min, self.max_frame())
    }

    /// Set the upper bound by absolute frame.
    pub fn set_max_frame(&mut self, max: f32) -> AnimyteResult<()> {
        self.set_min_and_max_frame(self.min_frame(), max)
    }

    /// Set both bounds by absolute frame.
    pub fn set_min_and_max_frame(&mut self, min: f32, max: f32) -> AnimyteResult<()> {
        if min > max {
            return Err(AnimyteError::configuration(format!(
                "min frame ({min}) must be <= max frame ({max})"
            )));
        }
        self.min_frame = Some(min);
        self.max_frame = Some(max);
        self.set_frame(self.frame_raw);
        Ok(())
    }

    /// Set the lower bound by progress fraction (truncating).
    pub fn set_min_progress(&mut self, progress: f32) -> AnimyteResult<()> {
        self.set_min_frame(self.frame_for_progress(progress))
    }

    /// Set the upper bound by progress fraction. The converted frame gains
    /// 0.99 so the final authored frame stays inside the window.
    pub fn set_max_progress(&mut self, progress: f32) -> AnimyteResult<()> {
        self.set_max_frame(self.frame_for_progress(progress) + 0.99)
    }

    /// Set both bounds by progress fraction.
    pub fn set_min_and_max_progress(&mut self, min: f32, max: f32) -> AnimyteResult<()> {
        self.set_min_and_max_frame(
            self.frame_for_progress(min),
            self.frame_for_progress(max) + 0.99,
        )
    }

    fn frame_for_progress(&self, progress: f32) -> f32 {
        lerp(self.range.start, self.range.end, progress).trunc()
    }

    fn reported(&self, raw: f32) -> f32 {
        if self.use_composition_frame_rate {
            raw.floor()
        } else {
            raw
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
