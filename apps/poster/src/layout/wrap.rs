//! Greedy word wrap.
//!
//! Paragraphs are split on `\n`; words on whitespace. A word that is wider than
//! the line on its own still gets a line to itself and is never broken.
//! Blank paragraphs produce no line.

use crate::layout::font_metrics::TextMeasure;

/// Wraps `text` into lines no wider than `max_width` at `points`.
pub fn wrap_text(measure: &dyn TextMeasure, text: &str, points: f32, max_width: f32) -> Vec<String> {
    let space_w = measure.string_width(" ", points);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in paragraph.split_whitespace() {
            let word_w = measure.string_width(word, points);

            if current.is_empty() {
                current.push_str(word);
                current_width = word_w;
            } else if current_width + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_w;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += space_w + word_w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Number of lines `wrap_text` would produce, without building them.
pub fn count_lines(measure: &dyn TextMeasure, text: &str, points: f32, max_width: f32) -> usize {
    let space_w = measure.string_width(" ", points);
    let mut count = 0usize;

    for paragraph in text.split('\n') {
        let mut current_width: Option<f32> = None;

        for word in paragraph.split_whitespace() {
            let word_w = measure.string_width(word, points);
            current_width = Some(match current_width {
                None => {
                    count += 1;
                    word_w
                }
                Some(w) if w + space_w + word_w > max_width => {
                    count += 1;
                    word_w
                }
                Some(w) => w + space_w + word_w,
            });
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::{fixture_face, HalfEm};

    /// Every character is 1 unit wide at 1pt.
    struct Monospace;

    impl TextMeasure for Monospace {
        fn line_height(&self, points: f32) -> f32 {
            points
        }

        fn string_width(&self, text: &str, points: f32) -> f32 {
            text.chars().count() as f32 * points
        }
    }

    #[test]
    fn test_fits_on_one_line() {
        assert_eq!(wrap_text(&Monospace, "keep it", 1.0, 7.0), vec!["keep it"]);
    }

    #[test]
    fn test_breaks_when_next_word_overflows() {
        assert_eq!(
            wrap_text(&Monospace, "keep your receipts", 1.0, 9.0),
            vec!["keep your", "receipts"]
        );
    }

    #[test]
    fn test_overlong_word_gets_own_line() {
        assert_eq!(
            wrap_text(&Monospace, "a supercalifragilistic b", 1.0, 5.0),
            vec!["a", "supercalifragilistic", "b"]
        );
    }

    #[test]
    fn test_newlines_start_new_paragraphs_and_blank_ones_vanish() {
        assert_eq!(
            wrap_text(&Monospace, "one\n\ntwo", 1.0, 100.0),
            vec!["one", "two"]
        );
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(
            wrap_text(&Monospace, "  lots   of\tspace ", 1.0, 100.0),
            vec!["lots of space"]
        );
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(wrap_text(&Monospace, "", 1.0, 10.0).is_empty());
        assert_eq!(count_lines(&Monospace, "   ", 1.0, 10.0), 0);
    }

    #[test]
    fn test_count_matches_wrap() {
        let text = "LPT: If you need to get rid of a wasp nest, spray it at night \
                    when they are all home and sleepy.\nThen leave.";
        let face = fixture_face();
        for points in [8.0, 16.0, 24.0, 40.0] {
            let lines = wrap_text(&face, text, points, 548.0);
            assert_eq!(
                lines.len(),
                count_lines(&face, text, points, 548.0),
                "mismatch at {points}pt"
            );
        }
    }

    #[test]
    fn test_smaller_points_never_need_more_lines() {
        let text = "word ".repeat(60);
        let mut previous = usize::MAX;
        for points in [40.0, 32.0, 24.0, 16.0, 8.0] {
            let n = count_lines(&HalfEm, &text, points, 548.0);
            assert!(n <= previous, "{n} lines at {points}pt, {previous} before");
            previous = n;
        }
    }
}
