//! Card renderer: draws a title as white, centred, auto-fitted text on a bordered black square.

use image::RgbaImage;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::debug;

use crate::layout::fit::{fit_font_size, FitParams, FontFit};
use crate::layout::font::{glyph_transform, FontFace};
use crate::layout::font_metrics::TextMeasure;
use crate::layout::wrap::wrap_text;
use crate::layout::LayoutError;

/// Canvas geometry and fit-search settings. All lengths are in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Inset of the border; text sits a further `padding` inside it.
    pub padding: f32,
    pub border_width: f32,
    pub line_height: f32,
    pub initial_points: f32,
    pub min_points: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 612,
            height: 612,
            padding: 16.0,
            border_width: 8.0,
            line_height: 1.75,
            initial_points: 40.0,
            min_points: 4.0,
        }
    }
}

impl CanvasConfig {
    /// The rectangle text is laid out in: `2 × padding` in from every edge.
    pub fn text_area(&self) -> Result<Rect, LayoutError> {
        let inset = 2.0 * self.padding;
        Rect::from_xywh(
            inset,
            inset,
            self.width as f32 - 2.0 * inset,
            self.height as f32 - 2.0 * inset,
        )
        .ok_or_else(|| {
            LayoutError::Canvas(format!(
                "padding {} leaves no text area on a {}x{} canvas",
                self.padding, self.width, self.height
            ))
        })
    }

    pub fn fit_params(&self) -> FitParams {
        FitParams {
            initial_points: self.initial_points,
            min_points: self.min_points,
            line_height: self.line_height,
        }
    }
}

/// Renders a title into a finished card. `CardRenderer` is the production
/// implementation; the pipeline only sees this trait.
pub trait TitleRenderer: Send + Sync {
    fn render_title(&self, text: &str) -> Result<RenderedCard, LayoutError>;
}

/// A rendered card and the fit that produced it.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub image: RgbaImage,
    pub fit: FontFit,
}

pub struct CardRenderer<'f> {
    font: FontFace<'f>,
    canvas: CanvasConfig,
}

impl<'f> CardRenderer<'f> {
    pub fn new(font: FontFace<'f>, canvas: CanvasConfig) -> Self {
        Self { font, canvas }
    }

    /// Lays out and draws `text`.
    pub fn render(&self, text: &str) -> Result<RenderedCard, LayoutError> {
        let area = self.canvas.text_area()?;
        let fit = fit_font_size(
            &self.font,
            text,
            area.width(),
            area.height(),
            &self.canvas.fit_params(),
        )?;

        let mut pixmap = draw_frame(&self.canvas)?;

        let offset = (area.height() - fit.measured_height) / 2.0;
        let lines = wrap_text(&self.font, text, fit.points, area.width());
        let line_height = self.font.line_height(fit.points);
        let center_x = area.left() + area.width() / 2.0;
        let mut top = area.top() + offset;

        debug!(
            points = fit.points,
            lines = lines.len(),
            offset,
            "Rendering card text"
        );

        let paint = white_paint();
        for line in &lines {
            let line_width = self.font.string_width(line, fit.points);
            let baseline = top + line_height;
            self.draw_line(&mut pixmap, line, fit.points, center_x - line_width / 2.0, baseline, &paint);
            top += line_height * self.canvas.line_height;
        }

        Ok(RenderedCard {
            image: pixmap_to_rgba(&pixmap)?,
            fit,
        })
    }

    fn draw_line(
        &self,
        pixmap: &mut Pixmap,
        line: &str,
        points: f32,
        start_x: f32,
        baseline: f32,
        paint: &Paint<'_>,
    ) {
        let scale = self.font.scale(points);
        let mut pen_x = start_x;

        for c in line.chars() {
            let glyph = self.font.glyph(c);
            if let Some(path) = self.font.outline(glyph) {
                pixmap.fill_path(
                    &path,
                    paint,
                    FillRule::Winding,
                    glyph_transform(scale, pen_x, baseline),
                    None,
                );
            }
            pen_x += self.font.advance(glyph) * scale;
        }
    }
}

impl TitleRenderer for CardRenderer<'_> {
    fn render_title(&self, text: &str) -> Result<RenderedCard, LayoutError> {
        self.render(text)
    }
}

fn white_paint() -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::WHITE);
    paint.anti_alias = true;
    paint
}

/// Black canvas with the white border rectangle stroked at `padding`.
pub fn draw_frame(canvas: &CanvasConfig) -> Result<Pixmap, LayoutError> {
    let mut pixmap = Pixmap::new(canvas.width, canvas.height).ok_or_else(|| {
        LayoutError::Canvas(format!("cannot allocate {}x{}", canvas.width, canvas.height))
    })?;
    pixmap.fill(Color::BLACK);

    let p = canvas.padding;
    let border = Rect::from_xywh(
        p,
        p,
        canvas.width as f32 - 2.0 * p,
        canvas.height as f32 - 2.0 * p,
    )
    .ok_or_else(|| LayoutError::Canvas(format!("padding {p} leaves no room for a border")))?;

    let stroke = Stroke {
        width: canvas.border_width,
        ..Stroke::default()
    };
    pixmap.stroke_path(
        &PathBuilder::from_rect(border),
        &white_paint(),
        &stroke,
        Transform::identity(),
        None,
    );

    Ok(pixmap)
}

/// Converts tiny-skia's premultiplied pixels into a straight-alpha RGBA image.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Result<RgbaImage, LayoutError> {
    let mut data = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| LayoutError::Canvas("pixel buffer size mismatch".to_string()))
}
