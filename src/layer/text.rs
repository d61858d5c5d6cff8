//! Text layer resolution against embedded glyph outlines.
//!
//! Documents hold-step between keyframes and carry their own styling, so a
//! frame resolves to one [`TextDocument`] which is laid out here character
//! by character. Only glyphs embedded in the composition (`chars`) can be
//! drawn; text set in a font without embedded outlines is skipped with a
//! warning, since rasterizing platform fonts is the embedder's business.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Affine;
use tracing::warn;

use crate::animation::color::ColorMixing;
use crate::animation::value::AnimatedValue;
use crate::composition::model::{
    CharacterId, Composition, FillRule, Font, Justify, LineCap, LineJoin, TextDocument, Track,
};
use crate::content::{animated, build_content, ContentGroup};
use crate::foundation::error::AnimyteResult;
use crate::render::display_list::{DisplayList, DrawCommand, Paint, StrokeStyle};

/// Runtime state of one text layer.
#[derive(Debug)]
pub(crate) struct TextContent {
    documents: AnimatedValue<TextDocument>,
    composition: Arc<Composition>,
    mixing: ColorMixing,
    glyphs: HashMap<CharacterId, ContentGroup>,
    warned: bool,
}

impl TextContent {
    pub(crate) fn new(
        documents: &Track<TextDocument>,
        composition: Arc<Composition>,
        mixing: ColorMixing,
    ) -> AnimyteResult<Self> {
        Ok(Self {
            documents: animated(documents)?,
            composition,
            mixing,
            glyphs: HashMap::new(),
            warned: false,
        })
    }

    pub(crate) fn set_progress(&mut self, progress: f32) -> bool {
        self.documents.set_progress(progress)
    }

    pub(crate) fn draw(&mut self, list: &mut DisplayList, matrix: Affine, alpha: u8) {
        let document = self.documents.value();
        let Some(font) = self.composition.font(&document.font).cloned() else {
            if !self.warned {
                warn!(font = %document.font, "text layer uses an undeclared font");
                self.warned = true;
            }
            return;
        };

        let line_height = f64::from(document.line_height);
        for (line_index, line) in document.text.split('\r').enumerate() {
            let width = self.line_width(line, &font, &document);
            let mut x = match document.justify {
                Justify::Left => 0.0,
                Justify::Center => -width / 2.0,
                Justify::Right => -width,
            };
            let y = line_index as f64 * line_height;
            for ch in line.chars() {
                let id = CharacterId {
                    ch,
                    family: font.family.clone(),
                    style: font.style.clone(),
                };
                let Some(character) = self.composition.character(&id) else {
                    if !self.warned {
                        warn!(
                            character = %ch,
                            font = %document.font,
                            "no embedded outline for character; text skipped"
                        );
                        self.warned = true;
                    }
                    continue;
                };
                let step = advance(&document, character.width, character.size);
                let scale = glyph_scale(&document, character.size);
                if scale <= 0.0 {
                    x += step;
                    continue;
                }
                let glyph = match self.glyphs.entry(id) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(slot) => match build_content(&character.shapes, self.mixing) {
                        Ok(group) => slot.insert(group),
                        Err(error) => {
                            warn!(character = %ch, %error, "glyph outline failed to build");
                            continue;
                        }
                    },
                };
                let path = glyph.combined_path();
                let placement = matrix * Affine::translate((x, y)) * Affine::scale(scale);
                list.push(DrawCommand::Fill {
                    path: path.clone(),
                    transform: placement,
                    paint: Paint::Solid(document.fill),
                    rule: FillRule::NonZero,
                    alpha,
                });
                if let Some(stroke) = document.stroke {
                    list.push(DrawCommand::Stroke {
                        path,
                        transform: placement,
                        // The glyph transform rescales the stroke too, so the
                        // width is authored back into glyph space.
                        style: StrokeStyle {
                            width: f64::from(document.stroke_width) / scale,
                            cap: LineCap::Butt,
                            join: LineJoin::Miter,
                            miter_limit: 4.0,
                            dashes: Vec::new(),
                            dash_offset: 0.0,
                        },
                        paint: Paint::Solid(stroke),
                        alpha,
                    });
                }
                x += step;
            }
        }
    }

    /// Advance width of a whole line, for justification.
    fn line_width(&self, line: &str, font: &Font, document: &TextDocument) -> f64 {
        line.chars()
            .filter_map(|ch| {
                let id = CharacterId {
                    ch,
                    family: font.family.clone(),
                    style: font.style.clone(),
                };
                self.composition
                    .character(&id)
                    .map(|character| advance(document, character.width, character.size))
            })
            .sum()
    }
}

/// Document size over the em size the outlines were authored at.
fn glyph_scale(document: &TextDocument, em_size: f32) -> f64 {
    if em_size == 0.0 {
        return 1.0;
    }
    f64::from(document.size / em_size)
}

/// Glyph advance plus tracking, in document units. Tracking is authored in
/// thousandths of the em size.
fn advance(document: &TextDocument, width: f32, em_size: f32) -> f64 {
    let tracking = f64::from(document.tracking / 1000.0 * document.size);
    f64::from(width) * glyph_scale(document, em_size) + tracking
}

#[cfg(test)]
#[path = "../../tests/unit/layer/text.rs"]
mod tests;
