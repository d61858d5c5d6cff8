//! Render-time bookkeeping: running means per layer and a tracker the
//! renderer feeds when profiling is enabled.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// Running mean over a stream of samples, without storing them.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanCalculator {
    sum: f32,
    count: u32,
}

impl MeanCalculator {
    /// An empty calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample into the mean.
    pub fn add(&mut self, sample: f32) {
        self.sum += sample;
        self.count += 1;
    }

    /// The mean of every sample so far; `0.0` before the first.
    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f32
    }
}

/// Callback invoked with the total draw time of each rendered frame.
pub type FrameListener = Box<dyn Fn(f32)>;

/// Per-layer render-time means, fed by the renderer while tracking is
/// enabled. Recording is a no-op while disabled, so the tracker can stay
/// wired in without costing anything.
#[derive(Default)]
pub struct PerformanceTracker {
    enabled: bool,
    layer_times: HashMap<String, MeanCalculator>,
    frame: MeanCalculator,
    listeners: Vec<FrameListener>,
}

impl PerformanceTracker {
    /// A disabled tracker with no recorded times.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn recording on or off.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether recording is on.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Fold one layer draw duration into that layer's running mean.
    pub fn record_layer_time(&mut self, layer: &str, millis: f32) {
        if !self.enabled {
            return;
        }
        self.layer_times
            .entry(layer.to_owned())
            .or_default()
            .add(millis);
    }

    /// Fold one whole-frame draw duration in and notify frame listeners.
    pub fn record_frame_time(&mut self, millis: f32) {
        if !self.enabled {
            return;
        }
        self.frame.add(millis);
        for listener in &self.listeners {
            listener(millis);
        }
    }

    /// Mean whole-frame draw time so far.
    pub fn frame_mean(&self) -> f32 {
        self.frame.mean()
    }

    /// Register a callback for every recorded frame time.
    pub fn add_frame_listener(&mut self, listener: FrameListener) {
        self.listeners.push(listener);
    }

    /// Drop every registered frame listener.
    pub fn clear_frame_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Forget every recorded time, keeping the enabled state.
    pub fn clear_render_times(&mut self) {
        self.layer_times.clear();
        self.frame = MeanCalculator::new();
    }

    /// Mean render time per layer, slowest first.
    pub fn sorted_render_times(&self) -> Vec<(String, f32)> {
        let mut times: Vec<(String, f32)> = self
            .layer_times
            .iter()
            .map(|(name, calc)| (name.clone(), calc.mean()))
            .collect();
        times.sort_by(|a, b| b.1.total_cmp(&a.1));
        times
    }

    /// Log the per-layer means at debug level, slowest first.
    pub fn log_render_times(&self) {
        if !self.enabled {
            return;
        }
        debug!("render times:");
        for (name, mean) in self.sorted_render_times() {
            debug!("  {name:>30}: {mean:.2}ms");
        }
    }
}

impl fmt::Debug for PerformanceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceTracker")
            .field("enabled", &self.enabled)
            .field("layer_times", &self.layer_times)
            .field("frame", &self.frame)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/unit/perf.rs"]
mod tests;
