//! Animyte evaluates declarative keyframe animations (bodymovin-style JSON
//! documents) into draw commands for an external 2D surface.
//!
//! A document turns into pixels in four stages, the last of which belongs
//! to the embedder:
//!
//! 1. **Parse**: JSON becomes a [`Composition`], an immutable, shareable
//!    data model of layers, shape items, keyframe tracks, assets, and
//!    markers.
//! 2. **Instantiate**: each [`Player`] (or bare [`Renderer`]) builds its
//!    own evaluation graph from the composition, holding all per-instance
//!    animator state.
//! 3. **Evaluate**: a normalized progress drives every animated value and
//!    the frame records into a [`DisplayList`] of resolved draw commands.
//! 4. **Rasterize**: the embedder replays the list against its own
//!    [`DrawSurface`] implementation.
//!
//! Evaluation is deterministic (the same document and progress always
//! record the same display list), performs no IO, and parses tolerantly:
//! unknown layer kinds, effects, and fields become composition warnings
//! rather than faults in the render loop.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod cache;
mod composition;
mod content;
mod document;
mod foundation;
mod keypath;
mod layer;
mod loader;
mod perf;
mod playback;
mod render;

pub use animation::bezier::CubicEase;
pub use animation::color::{ColorAnimator, ColorMixing, GradientAnimator, GradientColor};
pub use animation::keyframe::{Easing, Keyframe};
pub use animation::transform::{PositionTrack, TransformAnimator, TransformParts};
pub use animation::value::{AnimatedValue, FrameInfo, Interpolate, ValueCallback};
pub use cache::{CompositionCache, DEFAULT_CACHE_CAPACITY};
pub use composition::model::{
    Asset, BlendMode, Character, CharacterId, Composition, DashElement, DashKind, EffectModel,
    EllipseModel, FillModel, FillRule, Font, GradientFillModel, GradientKind, GradientStrokeModel,
    GroupModel, ImageAsset, Justify, LayerKind, LayerModel, LineCap, LineJoin, Marker, MaskMode,
    MaskModel, MatteType, MergeMode, MergeModel, PathModel, PolystarModel, PositionModel,
    PrecompAsset, RectangleModel, RepeaterComposite, RepeaterModel, RoundedCornersModel,
    ShapeModel, StarType, StrokeModel, TextDocument, Track, TransformModel, TrimMode, TrimModel,
};
pub use content::shape_data::ShapeData;
pub use foundation::core::{Affine, BezPath, Canvas, FrameRange, Point, Rect, Rgba, Shape, Vec2};
pub use foundation::error::{AnimyteError, AnimyteResult};
pub use keypath::{KeyPath, PropertyOverride};
pub use loader::{CompositionLoader, ListenerHandle, LoadListener, LoadResult};
pub use perf::{FrameListener, MeanCalculator, PerformanceTracker};
pub use playback::clock::{AnimationClock, ClockState, RepeatMode, TickOutcome};
pub use playback::player::{EndListener, Player};
pub use render::display_list::{DisplayList, DrawCommand, Geometry, LayerEffect, Paint, StrokeStyle};
pub use render::renderer::Renderer;
pub use render::surface::{DrawSurface, replay};
