//! Playback: the frame clock that advances with host time and the player
//! facade that couples a clock to a renderer.

pub mod clock;
pub mod player;
