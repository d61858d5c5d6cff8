//! The player facade: one composition, one clock, one renderer.
//!
//! A [`Player`] can be created before any composition exists. Control calls
//! made in that window queue up and replay, in call order, the moment a
//! composition is attached, so embedders can wire up their UI without caring
//! whether the document has finished loading.

use std::sync::Arc;
use std::time::Duration;

use kurbo::{Point, Vec2};
use tracing::debug;

use crate::animation::color::ColorMixing;
use crate::composition::model::Composition;
use crate::foundation::core::Rgba;
use crate::foundation::error::{AnimyteError, AnimyteResult};
use crate::keypath::{self, KeyPath, OverrideTarget, PropertyOverride};
use crate::playback::clock::{AnimationClock, ClockState, RepeatMode, TickOutcome};
use crate::render::display_list::DisplayList;
use crate::render::renderer::Renderer;
use crate::render::surface::DrawSurface;

/// Notified when playback finishes or is cancelled.
pub type EndListener = Box<dyn FnMut()>;

/// A control call made before a composition was attached, kept to replay on
/// attach.
#[derive(Clone, Debug)]
enum PendingOp {
    Play,
    Resume,
    Pause,
    Frame(f32),
    Progress(f32),
    MinFrame(f32),
    MaxFrame(f32),
    MinAndMaxFrame(f32, f32),
    MinProgress(f32),
    MaxProgress(f32),
    MinAndMaxProgress(f32, f32),
    MarkerBounds(String),
}

/// Drives one composition: owns the clock and the renderer, forwards the
/// playback control surface, and resolves value overrides.
pub struct Player {
    renderer: Option<Renderer>,
    clock: Option<AnimationClock>,
    mixing: ColorMixing,
    safe_mode: bool,
    pending: Vec<PendingOp>,
    end_listeners: Vec<EndListener>,
    // Clock settings survive re-attachment, unlike frame state.
    speed: f32,
    repeat_mode: RepeatMode,
    repeat_count: Option<u32>,
    use_composition_frame_rate: bool,
}

impl Player {
    /// An empty player with default (straight) color mixing.
    pub fn new() -> Self {
        Self::with_mixing(ColorMixing::Straight)
    }

    /// An empty player with an explicit color mixing mode for the graphs it
    /// builds.
    pub fn with_mixing(mixing: ColorMixing) -> Self {
        Self {
            renderer: None,
            clock: None,
            mixing,
            safe_mode: false,
            pending: Vec::new(),
            end_listeners: Vec::new(),
            speed: 1.0,
            repeat_mode: RepeatMode::Restart,
            repeat_count: Some(0),
            use_composition_frame_rate: false,
        }
    }

    /// Attach a composition: builds the evaluation graph and the clock, then
    /// replays any control calls queued while no composition was attached.
    pub fn set_composition(&mut self, composition: Arc<Composition>) -> AnimyteResult<()> {
        let mut renderer = Renderer::new(Arc::clone(&composition), self.mixing)?;
        renderer.set_safe_mode(self.safe_mode);
        let mut clock = AnimationClock::new(composition.range, composition.frame_rate);
        clock.set_speed(self.speed);
        clock.set_repeat_mode(self.repeat_mode);
        clock.set_repeat_count(self.repeat_count);
        clock.set_use_composition_frame_rate(self.use_composition_frame_rate);
        self.renderer = Some(renderer);
        self.clock = Some(clock);

        let pending = std::mem::take(&mut self.pending);
        if !pending.is_empty() {
            debug!(count = pending.len(), "replaying queued player operations");
        }
        for op in pending {
            self.apply(op)?;
        }
        self.sync_renderer();
        Ok(())
    }

    /// The attached composition, if any.
    pub fn composition(&self) -> Option<&Arc<Composition>> {
        self.renderer.as_ref().map(Renderer::composition)
    }

    /// Whether a composition is attached.
    pub fn is_attached(&self) -> bool {
        self.renderer.is_some()
    }

    /// Lifecycle state of the clock; [`ClockState::Idle`] while detached.
    pub fn state(&self) -> ClockState {
        self.clock
            .as_ref()
            .map_or(ClockState::Idle, AnimationClock::state)
    }

    /// Whether ticks currently advance the frame.
    pub fn is_running(&self) -> bool {
        self.clock.as_ref().is_some_and(AnimationClock::is_running)
    }

    fn apply(&mut self, op: PendingOp) -> AnimyteResult<()> {
        match op {
            PendingOp::Play => self.play(),
            PendingOp::Resume => self.resume(),
            PendingOp::Pause => self.pause(),
            PendingOp::Frame(frame) => self.set_frame(frame),
            PendingOp::Progress(progress) => self.set_progress(progress),
            PendingOp::MinFrame(min) => return self.set_min_frame(min),
            PendingOp::MaxFrame(max) => return self.set_max_frame(max),
            PendingOp::MinAndMaxFrame(min, max) => return self.set_min_and_max_frame(min, max),
            PendingOp::MinProgress(min) => return self.set_min_progress(min),
            PendingOp::MaxProgress(max) => return self.set_max_progress(max),
            PendingOp::MinAndMaxProgress(min, max) => {
                return self.set_min_and_max_progress(min, max);
            }
            PendingOp::MarkerBounds(name) => {
                return self.set_min_and_max_frame_by_marker(&name);
            }
        }
        Ok(())
    }

    fn sync_renderer(&mut self) {
        if let (Some(renderer), Some(clock)) = (self.renderer.as_mut(), self.clock.as_ref()) {
            renderer.set_progress(clock.progress());
        }
    }

    fn fire_end(&mut self) {
        for listener in &mut self.end_listeners {
            listener();
        }
    }

    /// Register a callback fired when playback ends or is cancelled.
    pub fn add_end_listener(&mut self, listener: EndListener) {
        self.end_listeners.push(listener);
    }

    /// Drop every registered end listener.
    pub fn clear_end_listeners(&mut self) {
        self.end_listeners.clear();
    }

    // ----- playback control surface -----

    /// Start from the beginning of the playable window.
    pub fn play(&mut self) {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.play();
                self.sync_renderer();
            }
            None => self.pending.push(PendingOp::Play),
        }
    }

    /// Continue from the current frame.
    pub fn resume(&mut self) {
        match self.clock.as_mut() {
            Some(clock) => clock.resume(),
            None => self.pending.push(PendingOp::Resume),
        }
    }

    /// Stop advancing; `resume` continues from here.
    pub fn pause(&mut self) {
        match self.clock.as_mut() {
            Some(clock) => clock.pause(),
            None => self.pending.push(PendingOp::Pause),
        }
    }

    /// Stop advancing and fire the end notification. The frame stays where
    /// it was.
    pub fn cancel(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.cancel();
        }
        self.fire_end();
    }

    /// Finish playback now and fire the end notification.
    pub fn end(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.end();
        }
        self.fire_end();
    }

    /// Advance by host elapsed time, re-evaluating the graph when the frame
    /// moved. Fires end listeners if this tick finished playback.
    pub fn tick(&mut self, elapsed: Duration) -> TickOutcome {
        let Some(clock) = self.clock.as_mut() else {
            return TickOutcome::default();
        };
        let outcome = clock.tick(elapsed);
        if outcome.updated {
            self.sync_renderer();
        }
        if outcome.ended {
            self.fire_end();
        }
        outcome
    }

    /// The current frame; the range start while detached.
    pub fn frame(&self) -> f32 {
        self.clock.as_ref().map_or(0.0, AnimationClock::frame)
    }

    /// Normalized progress of the current frame.
    pub fn progress(&self) -> f32 {
        self.clock.as_ref().map_or(0.0, AnimationClock::progress)
    }

    /// Playback duration of the attached composition, in milliseconds.
    pub fn duration_ms(&self) -> f32 {
        self.composition().map_or(0.0, |c| c.duration_ms())
    }

    /// Jump to an absolute frame.
    pub fn set_frame(&mut self, frame: f32) {
        match self.clock.as_mut() {
            Some(clock) => {
                if clock.set_frame(frame) {
                    self.sync_renderer();
                }
            }
            None => self.pending.push(PendingOp::Frame(frame)),
        }
    }

    /// Jump to a progress fraction of the authored range.
    pub fn set_progress(&mut self, progress: f32) {
        match self.clock.as_mut() {
            Some(clock) => {
                if clock.set_progress(progress) {
                    self.sync_renderer();
                }
            }
            None => self.pending.push(PendingOp::Progress(progress)),
        }
    }

    /// Playback speed; negative plays backwards.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the playback speed.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        if let Some(clock) = self.clock.as_mut() {
            clock.set_speed(speed);
        }
    }

    /// Loop behavior at the playable bounds.
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    /// Set the loop behavior.
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat_mode = mode;
        if let Some(clock) = self.clock.as_mut() {
            clock.set_repeat_mode(mode);
        }
    }

    /// How many loop events may fire before playback ends; `None` loops
    /// forever.
    pub fn repeat_count(&self) -> Option<u32> {
        self.repeat_count
    }

    /// Bound the number of loop events.
    pub fn set_repeat_count(&mut self, count: Option<u32>) {
        self.repeat_count = count;
        if let Some(clock) = self.clock.as_mut() {
            clock.set_repeat_count(count);
        }
    }

    /// Report whole frames stepped at the authored rate instead of
    /// sub-frame interpolated ones.
    pub fn set_use_composition_frame_rate(&mut self, enabled: bool) {
        self.use_composition_frame_rate = enabled;
        if let Some(clock) = self.clock.as_mut() {
            clock.set_use_composition_frame_rate(enabled);
        }
    }

    /// Set the lower playable bound by absolute frame.
    pub fn set_min_frame(&mut self, min: f32) -> AnimyteResult<()> {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.set_min_frame(min)?;
                self.sync_renderer();
                Ok(())
            }
            None => {
                self.pending.push(PendingOp::MinFrame(min));
                Ok(())
            }
        }
    }

    /// Set the upper playable bound by absolute frame.
    pub fn set_max_frame(&mut self, max: f32) -> AnimyteResult<()> {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.set_max_frame(max)?;
                self.sync_renderer();
                Ok(())
            }
            None => {
                self.pending.push(PendingOp::MaxFrame(max));
                Ok(())
            }
        }
    }

    /// Set both playable bounds by absolute frame.
    pub fn set_min_and_max_frame(&mut self, min: f32, max: f32) -> AnimyteResult<()> {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.set_min_and_max_frame(min, max)?;
                self.sync_renderer();
                Ok(())
            }
            None => {
                self.pending.push(PendingOp::MinAndMaxFrame(min, max));
                Ok(())
            }
        }
    }

    /// Set the lower playable bound by progress fraction.
    pub fn set_min_progress(&mut self, progress: f32) -> AnimyteResult<()> {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.set_min_progress(progress)?;
                self.sync_renderer();
                Ok(())
            }
            None => {
                self.pending.push(PendingOp::MinProgress(progress));
                Ok(())
            }
        }
    }

    /// Set the upper playable bound by progress fraction.
    pub fn set_max_progress(&mut self, progress: f32) -> AnimyteResult<()> {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.set_max_progress(progress)?;
                self.sync_renderer();
                Ok(())
            }
            None => {
                self.pending.push(PendingOp::MaxProgress(progress));
                Ok(())
            }
        }
    }

    /// Set both playable bounds by progress fraction.
    pub fn set_min_and_max_progress(&mut self, min: f32, max: f32) -> AnimyteResult<()> {
        match self.clock.as_mut() {
            Some(clock) => {
                clock.set_min_and_max_progress(min, max)?;
                self.sync_renderer();
                Ok(())
            }
            None => {
                self.pending.push(PendingOp::MinAndMaxProgress(min, max));
                Ok(())
            }
        }
    }

    /// Set both playable bounds from a named marker's span. The lookup is
    /// exact and case-sensitive; an unknown name is a configuration error.
    pub fn set_min_and_max_frame_by_marker(&mut self, name: &str) -> AnimyteResult<()> {
        let (Some(renderer), Some(clock)) = (self.renderer.as_ref(), self.clock.as_mut()) else {
            self.pending.push(PendingOp::MarkerBounds(name.to_owned()));
            return Ok(());
        };
        let marker = renderer.composition().marker(name).ok_or_else(|| {
            AnimyteError::configuration(format!("no marker named '{name}' in composition"))
        })?;
        clock.set_min_and_max_frame(marker.start_frame, marker.end_frame())?;
        self.sync_renderer();
        Ok(())
    }

    /// Playable lower bound, if attached.
    pub fn min_frame(&self) -> Option<f32> {
        self.clock.as_ref().map(AnimationClock::min_frame)
    }

    /// Playable upper bound, if attached.
    pub fn max_frame(&self) -> Option<f32> {
        self.clock.as_ref().map(AnimationClock::max_frame)
    }

    // ----- rendering -----

    /// With safe mode on, a fault while drawing one frame yields an empty
    /// frame instead of propagating. Off by default.
    pub fn set_safe_mode(&mut self, enabled: bool) {
        self.safe_mode = enabled;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_safe_mode(enabled);
        }
    }

    /// The renderer for the attached composition.
    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    /// Mutable renderer access, for performance tracking toggles.
    pub fn renderer_mut(&mut self) -> Option<&mut Renderer> {
        self.renderer.as_mut()
    }

    /// The current frame's draw commands. A configuration error while
    /// detached.
    pub fn display_list(&mut self) -> AnimyteResult<&DisplayList> {
        match self.renderer.as_mut() {
            Some(renderer) => Ok(renderer.display_list()),
            None => Err(AnimyteError::configuration(
                "no composition attached to player",
            )),
        }
    }

    /// Draw the current frame onto `surface`.
    pub fn render(&mut self, surface: &mut dyn DrawSurface) -> AnimyteResult<()> {
        match self.renderer.as_mut() {
            Some(renderer) => renderer.render(surface),
            None => Err(AnimyteError::configuration(
                "no composition attached to player",
            )),
        }
    }

    // ----- value overrides -----

    fn apply_override(
        &mut self,
        path: &KeyPath,
        mut apply: impl FnMut(OverrideTarget<'_>) -> bool,
    ) -> usize {
        let Some(renderer) = self.renderer.as_mut() else {
            return 0;
        };
        let mut count = 0;
        keypath::resolve(renderer.graph_mut().stack_mut(), path, &mut |target| {
            if apply(target) {
                count += 1;
            }
        });
        if count > 0 {
            renderer.mark_stale();
        }
        count
    }

    /// Override the position of every transform the path resolves to.
    /// Returns how many nodes took the override. Transforms whose position
    /// is split into x/y tracks are skipped.
    pub fn override_position(
        &mut self,
        path: &KeyPath,
        value: PropertyOverride<Point>,
    ) -> usize {
        self.apply_override(path, |target| match target {
            OverrideTarget::Transform(transform) => {
                let cb = Arc::clone(&value);
                transform.set_position_callback(Some(Box::new(move |info| cb(info))))
            }
            _ => false,
        })
    }

    /// Override the scale of every transform the path resolves to.
    pub fn override_scale(&mut self, path: &KeyPath, value: PropertyOverride<Vec2>) -> usize {
        self.apply_override(path, |target| match target {
            OverrideTarget::Transform(transform) => {
                let cb = Arc::clone(&value);
                transform.set_scale_callback(Some(Box::new(move |info| cb(info))));
                true
            }
            _ => false,
        })
    }

    /// Override the rotation of every transform the path resolves to.
    pub fn override_rotation(&mut self, path: &KeyPath, value: PropertyOverride<f32>) -> usize {
        self.apply_override(path, |target| match target {
            OverrideTarget::Transform(transform) => {
                let cb = Arc::clone(&value);
                transform.set_rotation_callback(Some(Box::new(move |info| cb(info))));
                true
            }
            _ => false,
        })
    }

    /// Override the opacity percent of every transform the path resolves to.
    pub fn override_opacity(&mut self, path: &KeyPath, value: PropertyOverride<f32>) -> usize {
        self.apply_override(path, |target| match target {
            OverrideTarget::Transform(transform) => {
                let cb = Arc::clone(&value);
                transform.set_opacity_callback(Some(Box::new(move |info| cb(info))));
                true
            }
            _ => false,
        })
    }

    /// Override the color of every solid fill and stroke the path resolves
    /// to.
    pub fn override_color(&mut self, path: &KeyPath, value: PropertyOverride<Rgba>) -> usize {
        self.apply_override(path, |target| match target {
            OverrideTarget::Fill(fill) => {
                let cb = Arc::clone(&value);
                fill.set_color_callback(Some(Box::new(move |info| cb(info))));
                true
            }
            OverrideTarget::Stroke(stroke) => {
                let cb = Arc::clone(&value);
                stroke.set_color_callback(Some(Box::new(move |info| cb(info))));
                true
            }
            OverrideTarget::Transform(_) => false,
        })
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("attached", &self.renderer.is_some())
            .field("state", &self.state())
            .field("pending", &self.pending.len())
            .field("end_listeners", &self.end_listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/player.rs"]
mod tests;
