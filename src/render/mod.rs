//! Frame recording and replay: the display list a frame evaluates into, the
//! surface trait embedders implement to rasterize it, and the renderer that
//! drives a composition graph through both.

pub mod display_list;
pub mod renderer;
pub mod surface;
