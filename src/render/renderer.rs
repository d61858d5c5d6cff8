//! Frame renderer: owns the evaluated graph for one composition, records a
//! display list per frame, and replays it onto a surface.
//!
//! Recording is lazy. `set_progress` only marks the frame stale when
//! something resolved actually changed, so a paused player replaying the
//! same frame costs one list replay and zero evaluation.

use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::animation::color::ColorMixing;
use crate::composition::model::Composition;
use crate::foundation::error::AnimyteResult;
use crate::layer::CompositionGraph;
use crate::perf::PerformanceTracker;
use crate::render::display_list::DisplayList;
use crate::render::surface::{replay, DrawSurface};

/// Renders one composition's frames onto [`DrawSurface`]s.
#[derive(Debug)]
pub struct Renderer {
    graph: CompositionGraph,
    list: DisplayList,
    stale: bool,
    safe_mode: bool,
    faulted: bool,
    tracker: PerformanceTracker,
}

impl Renderer {
    #[tracing::instrument(skip(composition))]
    /// Instantiate the evaluation graph for `composition`.
    pub fn new(composition: Arc<Composition>, mixing: ColorMixing) -> AnimyteResult<Self> {
        Ok(Self {
            graph: CompositionGraph::build(composition, mixing)?,
            list: DisplayList::new(),
            stale: true,
            safe_mode: false,
            faulted: false,
            tracker: PerformanceTracker::new(),
        })
    }

    /// The composition this renderer draws.
    pub fn composition(&self) -> &Arc<Composition> {
        self.graph.composition()
    }

    /// Drive the graph to a normalized progress. Returns whether the next
    /// frame differs from the last recorded one.
    pub fn set_progress(&mut self, progress: f32) -> bool {
        let changed = self.graph.set_progress(progress);
        self.stale |= changed;
        changed
    }

    /// With safe mode on, a fault while drawing one frame logs once and
    /// yields an empty frame instead of propagating. Off by default.
    pub fn set_safe_mode(&mut self, enabled: bool) {
        self.safe_mode = enabled;
    }

    /// Turn per-layer render-time tracking on or off.
    pub fn set_performance_tracking(&mut self, enabled: bool) {
        self.tracker.set_enabled(enabled);
    }

    /// Recorded render-time means.
    pub fn performance_tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    /// Mutable access to the tracker, for listeners and resets.
    pub fn performance_tracker_mut(&mut self) -> &mut PerformanceTracker {
        &mut self.tracker
    }

    /// The current frame's draw commands, re-recording first if the graph
    /// moved since the last record.
    pub fn display_list(&mut self) -> &DisplayList {
        if self.stale {
            self.record();
        }
        &self.list
    }

    #[tracing::instrument(skip(self, surface))]
    /// Draw the current frame onto `surface`.
    pub fn render(&mut self, surface: &mut dyn DrawSurface) -> AnimyteResult<()> {
        let started = Instant::now();
        if self.stale {
            self.record();
        }
        match replay(surface, &self.list, self.graph.composition()) {
            Ok(()) => {
                self.tracker
                    .record_frame_time(started.elapsed().as_secs_f32() * 1000.0);
                Ok(())
            }
            Err(error) if self.safe_mode => {
                if !self.faulted {
                    warn!(%error, "frame draw faulted; safe mode yields an empty frame");
                    self.faulted = true;
                }
                surface.begin_frame(self.graph.composition().canvas)?;
                surface.end_frame()
            }
            Err(error) => Err(error),
        }
    }

    fn record(&mut self) {
        self.list.clear();
        if self.tracker.enabled() {
            self.graph.draw_tracked(&mut self.list, &mut self.tracker);
        } else {
            self.graph.draw(&mut self.list);
        }
        self.stale = false;
    }

    /// Force the next `render`/`display_list` call to re-record, after an
    /// out-of-band change such as a value override.
    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    pub(crate) fn graph_mut(&mut self) -> &mut CompositionGraph {
        &mut self.graph
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
