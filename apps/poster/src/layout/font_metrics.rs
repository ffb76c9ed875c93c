//! Text measurement seam for the layout engine.
//!
//! `TextMeasure` is what the fit search and word wrap need from a font: the height
//! of one line and the advance width of a run of text, both at a given point size.
//! `FontFace` (layout/font.rs) implements it from a TrueType/OpenType file.

/// Font measurement at a given point size. One point maps to one canvas pixel.
pub trait TextMeasure {
    /// Height of a single unwrapped line of text.
    fn line_height(&self, points: f32) -> f32;

    /// Advance width of `text` laid out on one line.
    fn string_width(&self, text: &str, points: f32) -> f32;
}
