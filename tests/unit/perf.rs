use super::*;

use std::cell::Cell;
use std::rc::Rc;

#[test]
fn an_empty_mean_is_zero() {
    assert_eq!(MeanCalculator::new().mean(), 0.0);
}

#[test]
fn the_mean_of_two_numbers_is_their_midpoint() {
    let mut mean = MeanCalculator::new();
    mean.add(2.0);
    mean.add(4.0);
    assert_eq!(mean.mean(), 3.0);
}

#[test]
fn the_mean_of_one_through_twenty() {
    let mut mean = MeanCalculator::new();
    for i in 1..=20 {
        mean.add(i as f32);
    }
    assert_eq!(mean.mean(), 10.5);
}

#[test]
fn opposite_samples_cancel() {
    let mut mean = MeanCalculator::new();
    mean.add(1e9);
    mean.add(-1e9);
    assert_eq!(mean.mean(), 0.0);
}

#[test]
fn disabled_trackers_record_nothing() {
    let mut tracker = PerformanceTracker::new();
    tracker.record_layer_time("hero", 4.0);
    tracker.record_frame_time(4.0);
    assert!(tracker.sorted_render_times().is_empty());
    assert_eq!(tracker.frame_mean(), 0.0);
}

#[test]
fn render_times_sort_slowest_first() {
    let mut tracker = PerformanceTracker::new();
    tracker.set_enabled(true);
    tracker.record_layer_time("quick", 1.0);
    tracker.record_layer_time("slow", 8.0);
    tracker.record_layer_time("slow", 4.0);

    let times = tracker.sorted_render_times();
    assert_eq!(times.len(), 2);
    assert_eq!(times[0], ("slow".to_owned(), 6.0));
    assert_eq!(times[1], ("quick".to_owned(), 1.0));
}

#[test]
fn frame_listeners_hear_every_recorded_frame() {
    let mut tracker = PerformanceTracker::new();
    tracker.set_enabled(true);
    let total = Rc::new(Cell::new(0.0f32));
    let sink = Rc::clone(&total);
    tracker.add_frame_listener(Box::new(move |millis| {
        sink.set(sink.get() + millis);
    }));

    tracker.record_frame_time(2.0);
    tracker.record_frame_time(3.0);
    assert_eq!(total.get(), 5.0);
    assert_eq!(tracker.frame_mean(), 2.5);
}

#[test]
fn clearing_times_keeps_the_enabled_state() {
    let mut tracker = PerformanceTracker::new();
    tracker.set_enabled(true);
    tracker.record_layer_time("hero", 4.0);
    tracker.clear_render_times();
    assert!(tracker.enabled());
    assert!(tracker.sorted_render_times().is_empty());
}
