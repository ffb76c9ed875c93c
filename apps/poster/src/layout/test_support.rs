//! Shared fixtures for layout tests.

use crate::layout::font::FontFace;
use crate::layout::font_metrics::TextMeasure;

/// DejaVu Sans Condensed Bold (Bitstream Vera license, see tests/fixtures).
pub const FIXTURE_FONT: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/DejaVuSansCondensed-Bold.ttf"
));

pub fn fixture_face() -> FontFace<'static> {
    FontFace::parse(FIXTURE_FONT).unwrap()
}

/// Every glyph is half an em wide, spaces a quarter; lines are 1.2 em.
pub struct HalfEm;

impl TextMeasure for HalfEm {
    fn line_height(&self, points: f32) -> f32 {
        1.2 * points
    }

    fn string_width(&self, text: &str, points: f32) -> f32 {
        text.chars()
            .map(|c| if c == ' ' { 0.25 } else { 0.5 })
            .sum::<f32>()
            * points
    }
}
