// Text Layout Engine
// Implements: text measurement, greedy word wrap, the font fit search, card rendering.
// The fit search is CPU-only and bounded by `min_points`; it runs inline.

use thiserror::Error;

pub mod fit;
pub mod font;
pub mod font_metrics;
pub mod render;
pub mod wrap;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export what main, config and the pipeline consume.
pub use font::FontFace;
pub use render::{CanvasConfig, CardRenderer, TitleRenderer};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Failed to parse font: {0}")]
    Font(String),

    #[error("Cannot lay out empty text")]
    EmptyText,

    #[error("Font size fell to {points}pt, below the {min_points}pt minimum")]
    FontTooSmall { points: f32, min_points: f32 },

    #[error("Invalid canvas: {0}")]
    Canvas(String),
}
