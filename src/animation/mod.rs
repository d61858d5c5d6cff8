//! Keyframe evaluation: easing curves, keyframe tracks, value animators,
//! color mixing, and the transform matrix builder.

pub mod bezier;
pub mod color;
pub mod keyframe;
pub mod transform;
pub mod value;
