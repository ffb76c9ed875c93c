//! TrueType/OpenType face: exact advances for measurement and glyph outlines for drawing.
//!
//! Outlines come out of `ttf-parser` in font design units (y-up) and are turned
//! into `tiny-skia` paths. Callers scale and flip them with `glyph_transform`.

use tiny_skia::{Path, PathBuilder, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::layout::font_metrics::TextMeasure;
use crate::layout::LayoutError;

/// Records `ttf-parser` outline commands into a `tiny-skia` path.
struct GlyphOutlineBuilder {
    builder: PathBuilder,
}

impl OutlineBuilder for GlyphOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Maps design units to canvas pixels with the pen at (`x`, `baseline`).
/// The Y axis is flipped to match the canvas' Y-down coordinates.
#[inline]
pub fn glyph_transform(scale: f32, x: f32, baseline: f32) -> Transform {
    Transform::from_row(scale, 0.0, 0.0, -scale, x, baseline)
}

/// A parsed font borrowing its bytes from the caller.
pub struct FontFace<'a> {
    face: Face<'a>,
    units_per_em: f32,
}

impl<'a> FontFace<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, LayoutError> {
        let face = Face::parse(data, 0).map_err(|e| LayoutError::Font(e.to_string()))?;
        let units_per_em = face.units_per_em() as f32;
        if units_per_em <= 0.0 {
            return Err(LayoutError::Font("units_per_em is zero".to_string()));
        }
        Ok(Self { face, units_per_em })
    }

    /// Design units → pixels at `points`.
    pub fn scale(&self, points: f32) -> f32 {
        points / self.units_per_em
    }

    /// Glyph for `c`, falling back to `.notdef` (glyph 0) when the font lacks it.
    pub fn glyph(&self, c: char) -> GlyphId {
        self.face.glyph_index(c).unwrap_or(GlyphId(0))
    }

    /// Horizontal advance of a glyph, in design units.
    pub fn advance(&self, glyph: GlyphId) -> f32 {
        self.face.glyph_hor_advance(glyph).unwrap_or(0) as f32
    }

    /// Outline of a glyph, in design units. `None` for empty glyphs such as space.
    pub fn outline(&self, glyph: GlyphId) -> Option<Path> {
        let mut builder = GlyphOutlineBuilder {
            builder: PathBuilder::new(),
        };
        self.face.outline_glyph(glyph, &mut builder)?;
        builder.builder.finish()
    }
}

impl TextMeasure for FontFace<'_> {
    fn line_height(&self, points: f32) -> f32 {
        let units = self.face.ascender() as f32 - self.face.descender() as f32
            + self.face.line_gap() as f32;
        units * self.scale(points)
    }

    fn string_width(&self, text: &str, points: f32) -> f32 {
        let units: f32 = text.chars().map(|c| self.advance(self.glyph(c))).sum();
        units * self.scale(points)
    }
}
