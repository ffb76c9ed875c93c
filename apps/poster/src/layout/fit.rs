//! Font fit search: finds the point size at which wrapped text fills a box.
//!
//! # Algorithm
//! Start at `initial_points`. At each size, wrap the text to the box width and
//! compute `error = line_height × multiplier × lines − box_height`. While the
//! error is positive, shrink by `max(min(error, 1000) / 1000 × 5, 0.001)`.
//!
//! When the error first drops to ≤ 0 the search commits to the size tried *before*
//! that one, not the size that fitted. Cards therefore carry slightly larger text
//! than strictly fits; this is the established look and is kept as is.
//! The reported `measured_height` is the one measured at the fitting size and is
//! what the renderer centres with.

use tracing::{debug, trace};

use crate::layout::font_metrics::TextMeasure;
use crate::layout::wrap::count_lines;
use crate::layout::LayoutError;

/// Errors above this many pixels all shrink at full speed.
const STEP_ERROR_CAP: f32 = 1000.0;
/// Shrink at full speed, in points per iteration.
const STEP_SPEED: f32 = 5.0;
/// Smallest shrink per iteration; guarantees progress.
const MIN_STEP: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub initial_points: f32,
    /// The search fails with `FontTooSmall` once the size goes below this.
    pub min_points: f32,
    /// Line pitch as a multiple of the font's line height.
    pub line_height: f32,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            initial_points: 40.0,
            min_points: 4.0,
            line_height: 1.75,
        }
    }
}

/// Measurements taken at one step of the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontFitState {
    pub point_size: f32,
    pub wrapped_line_count: usize,
    pub measured_height: f32,
}

/// Outcome of a successful search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontFit {
    /// Committed size: the last size tried before the first fit.
    pub points: f32,
    /// Wrapped height at the size that fitted.
    pub measured_height: f32,
    /// Wrapped line count at the size that fitted.
    pub line_count: usize,
    pub iterations: u32,
}

/// One shrink step: proportional to the clamped error, never below `MIN_STEP`.
pub fn adjust_points(error: f32, points: f32) -> f32 {
    points - ((error.min(STEP_ERROR_CAP) / STEP_ERROR_CAP) * STEP_SPEED).max(MIN_STEP)
}

fn measure_at(
    measure: &dyn TextMeasure,
    text: &str,
    points: f32,
    width: f32,
    line_height: f32,
) -> FontFitState {
    let wrapped_line_count = count_lines(measure, text, points, width);
    let measured_height = measure.line_height(points) * line_height * wrapped_line_count as f32;
    FontFitState {
        point_size: points,
        wrapped_line_count,
        measured_height,
    }
}

/// Runs the shrink search for `text` inside a `width` × `height` box.
pub fn fit_font_size(
    measure: &dyn TextMeasure,
    text: &str,
    width: f32,
    height: f32,
    params: &FitParams,
) -> Result<FontFit, LayoutError> {
    if text.trim().is_empty() {
        return Err(LayoutError::EmptyText);
    }

    let mut points = params.initial_points;
    let mut previous = points;
    let mut iterations = 0u32;

    loop {
        if points < params.min_points || points <= 0.0 {
            return Err(LayoutError::FontTooSmall {
                points,
                min_points: params.min_points,
            });
        }
        iterations += 1;

        let state = measure_at(measure, text, points, width, params.line_height);
        let error = state.measured_height - height;
        trace!(?state, error, "fit step");

        if error <= 0.0 {
            debug!(
                points = previous,
                fitted_at = points,
                lines = state.wrapped_line_count,
                iterations,
                "Font fit found"
            );
            return Ok(FontFit {
                points: previous,
                measured_height: state.measured_height,
                line_count: state.wrapped_line_count,
                iterations,
            });
        }

        previous = points;
        points = adjust_points(error, points);
    }
}
