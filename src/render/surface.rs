//! The surface trait a rasterizer implements to consume recorded frames.
//!
//! The engine stays rasterizer-agnostic: it records [`DisplayList`]s and
//! replays them against this trait. An implementation maps each call onto
//! its own canvas model; the reference shape is an offscreen-capable 2D
//! canvas with save/restore layers for mattes, clips, and blend groups.

use kurbo::{Affine, BezPath};

use crate::composition::model::{
    Asset, BlendMode, Composition, FillRule, ImageAsset, MatteType, MergeMode,
};
use crate::foundation::core::Canvas;
use crate::foundation::error::AnimyteResult;
use crate::render::display_list::{
    DisplayList, DrawCommand, LayerEffect, Paint, StrokeStyle, concat_paths,
};

/// Receiver for replayed draw commands.
///
/// Layer and clip calls nest: every [`push_layer`](DrawSurface::push_layer)
/// is balanced by a [`pop_layer`](DrawSurface::pop_layer), every
/// [`push_clip`](DrawSurface::push_clip) by a
/// [`pop_clip`](DrawSurface::pop_clip), and a
/// [`begin_matte`](DrawSurface::begin_matte) arrives between a push/pop pair
/// to mark where matte source content starts.
pub trait DrawSurface {
    /// Prepare for a frame of the given canvas size. Called once per replay,
    /// before any draw call.
    fn begin_frame(&mut self, canvas: Canvas) -> AnimyteResult<()> {
        let _ = canvas;
        Ok(())
    }

    /// Fill a path under an affine transform.
    fn fill_path(
        &mut self,
        path: &BezPath,
        transform: Affine,
        paint: &Paint,
        rule: FillRule,
        alpha: u8,
    ) -> AnimyteResult<()>;

    /// Stroke a path under an affine transform.
    fn stroke_path(
        &mut self,
        path: &BezPath,
        transform: Affine,
        style: &StrokeStyle,
        paint: &Paint,
        alpha: u8,
    ) -> AnimyteResult<()>;

    /// Fill merge-path operands folded left to right with a boolean
    /// operator. The default concatenates the operands and fills the
    /// aggregate; surfaces with native path booleans should override it.
    fn fill_merged(
        &mut self,
        operands: &[BezPath],
        mode: MergeMode,
        transform: Affine,
        paint: &Paint,
        rule: FillRule,
        alpha: u8,
    ) -> AnimyteResult<()> {
        let _ = mode;
        self.fill_path(&concat_paths(operands), transform, paint, rule, alpha)
    }

    /// Stroke the combined outline of merge-path operands. Same fallback
    /// contract as [`fill_merged`](DrawSurface::fill_merged).
    fn stroke_merged(
        &mut self,
        operands: &[BezPath],
        mode: MergeMode,
        transform: Affine,
        style: &StrokeStyle,
        paint: &Paint,
        alpha: u8,
    ) -> AnimyteResult<()> {
        let _ = mode;
        self.stroke_path(&concat_paths(operands), transform, style, paint, alpha)
    }

    /// Blit an image asset under an affine transform. Pixel lookup is the
    /// embedder's business; the asset carries the file reference and
    /// intrinsic size.
    fn draw_image(
        &mut self,
        image: &ImageAsset,
        transform: Affine,
        alpha: u8,
    ) -> AnimyteResult<()>;

    /// Open an offscreen group composited on close with `alpha`, `blend`,
    /// and `effects`.
    fn push_layer(
        &mut self,
        alpha: u8,
        blend: BlendMode,
        effects: &[LayerEffect],
    ) -> AnimyteResult<()>;

    /// Mark the start of matte source content inside the open group. On the
    /// closing pop, content recorded before this call composites gated by
    /// the source per `mode`.
    fn begin_matte(&mut self, mode: MatteType) -> AnimyteResult<()>;

    /// Close the innermost open group.
    fn pop_layer(&mut self) -> AnimyteResult<()>;

    /// Clip subsequent draws to `path` (or its complement when `inverted`),
    /// modulated by `alpha`.
    fn push_clip(
        &mut self,
        path: &BezPath,
        transform: Affine,
        inverted: bool,
        alpha: u8,
    ) -> AnimyteResult<()>;

    /// Remove the innermost clip.
    fn pop_clip(&mut self) -> AnimyteResult<()>;

    /// Finish the frame. Called once per replay, after the last draw call.
    fn end_frame(&mut self) -> AnimyteResult<()> {
        Ok(())
    }
}

/// Replay a recorded frame onto a surface. Image commands resolve their
/// asset reference against `composition`; references that went missing at
/// parse time were warned about there and are skipped here.
pub fn replay<S: DrawSurface + ?Sized>(
    surface: &mut S,
    list: &DisplayList,
    composition: &Composition,
) -> AnimyteResult<()> {
    surface.begin_frame(composition.canvas)?;
    for command in list.commands() {
        match command {
            DrawCommand::Fill {
                path,
                transform,
                paint,
                rule,
                alpha,
            } => surface.fill_path(path, *transform, paint, *rule, *alpha)?,
            DrawCommand::Stroke {
                path,
                transform,
                style,
                paint,
                alpha,
            } => surface.stroke_path(path, *transform, style, paint, *alpha)?,
            DrawCommand::FillMerged {
                operands,
                mode,
                transform,
                paint,
                rule,
                alpha,
            } => surface.fill_merged(operands, *mode, *transform, paint, *rule, *alpha)?,
            DrawCommand::StrokeMerged {
                operands,
                mode,
                transform,
                style,
                paint,
                alpha,
            } => surface.stroke_merged(operands, *mode, *transform, style, paint, *alpha)?,
            DrawCommand::Image {
                asset,
                transform,
                alpha,
            } => {
                if let Some(Asset::Image(image)) = composition.asset(asset) {
                    surface.draw_image(image, *transform, *alpha)?;
                }
            }
            DrawCommand::PushLayer {
                alpha,
                blend,
                effects,
            } => surface.push_layer(*alpha, *blend, effects)?,
            DrawCommand::BeginMatte { mode } => surface.begin_matte(*mode)?,
            DrawCommand::PopLayer => surface.pop_layer()?,
            DrawCommand::PushClip {
                path,
                transform,
                inverted,
                alpha,
            } => surface.push_clip(path, *transform, *inverted, *alpha)?,
            DrawCommand::PopClip => surface.pop_clip()?,
        }
    }
    surface.end_frame()
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
