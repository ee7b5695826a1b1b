//! Pixel-width word wrapping
//!
//! Greedy fill: segments from a [`LineSegmenter`] are appended to the
//! current line while the line stays within the pixel budget. Every
//! accepted segment adds the font's kerning after it, the same spacing
//! the game inserts between rendered runs.
//!
//! Whitespace at a break is dropped: trailing whitespace is trimmed off
//! a finished line and a whitespace-only segment is not carried to the
//! start of the next one. A segment wider than the budget on its own is
//! placed alone on a line.

pub mod segmenter;

use crate::error::MissingGlyphError;
use crate::font::CharacterWidthTable;

pub use segmenter::{LineSegmenter, Segment, UnicodeLineSegmenter};

/// Word wrap engine bound to a segmenter and a locale
pub struct WordWrapEngine<S: LineSegmenter> {
    segmenter: S,
    locale: String,
}

impl<S: LineSegmenter> WordWrapEngine<S> {
    pub fn new(segmenter: S, locale: impl Into<String>) -> Self {
        Self {
            segmenter,
            locale: locale.into(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Wrap `text` into lines no wider than `max_width` pixels.
    ///
    /// Fails without producing any lines if a character of `text` has no
    /// entry in `widths`.
    pub fn wrap(
        &self,
        text: &str,
        widths: &CharacterWidthTable,
        kerning: i32,
        max_width: u32,
    ) -> Result<Vec<String>, MissingGlyphError> {
        let segments = self.segmenter.segments(text, &self.locale);

        // Measure everything first so a missing glyph fails before any layout
        let measured = segments
            .iter()
            .map(|segment| {
                let slice = segment.text(text);
                widths
                    .measure(slice)
                    .map(|width| (slice, width))
                    .map_err(|character| MissingGlyphError {
                        character,
                        text: text.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let max_width = i64::from(max_width);
        let kerning = i64::from(kerning);
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut line_width = 0i64;
        let mut index = 0;

        while index < measured.len() {
            let (segment, width) = measured[index];

            if line.is_empty() {
                if !lines.is_empty() && segment.trim().is_empty() {
                    // Whitespace left over from the previous break
                    index += 1;
                    continue;
                }
                if width > max_width {
                    // Too wide even for an empty line: give it a line of its own
                    finish_line(&mut lines, segment);
                    index += 1;
                    continue;
                }
            }

            if line_width + width <= max_width {
                line.push_str(segment);
                line_width += width + kerning;
                index += 1;
            } else {
                // Retry the same segment on a fresh line
                finish_line(&mut lines, &line);
                line.clear();
                line_width = 0;
            }
        }

        if lines.is_empty() || !line.trim().is_empty() {
            lines.push(line.trim_end().to_string());
        }
        Ok(lines)
    }
}

fn finish_line(lines: &mut Vec<String>, line: &str) {
    let trimmed = line.trim_end();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Segmenter returning fixed pieces, to pin down break positions
    struct Pieces(Vec<&'static str>);

    impl LineSegmenter for Pieces {
        fn segments(&self, text: &str, _locale: &str) -> Vec<Segment> {
            let mut start = 0;
            let segments = self
                .0
                .iter()
                .map(|piece| {
                    let segment = Segment::new(start, start + piece.len());
                    start += piece.len();
                    segment
                })
                .collect();
            assert_eq!(start, text.len(), "pieces must cover the text");
            segments
        }
    }

    fn uniform(text: &str, width: u32) -> CharacterWidthTable {
        text.chars().map(|c| (c, width)).collect()
    }

    fn unicode() -> WordWrapEngine<UnicodeLineSegmenter> {
        WordWrapEngine::new(UnicodeLineSegmenter, "en")
    }

    #[test]
    fn test_hello_world() {
        let engine = WordWrapEngine::new(Pieces(vec!["hello", " ", "world"]), "en");
        let widths = uniform("helo wrd", 10);
        let lines = engine.wrap("hello world", &widths, 2, 55).unwrap();
        assert_eq!(lines, vec!["hello", "world"]);
    }

    #[test]
    fn test_hello_world_unicode_segments() {
        let widths = uniform("helo wrd", 10);
        let lines = unicode().wrap("hello world", &widths, 2, 55).unwrap();
        assert_eq!(lines, vec!["hello", "world"]);
    }

    #[test]
    fn test_fits_on_one_line() {
        let widths = uniform("helo wrd", 10);
        let lines = unicode().wrap("hello world", &widths, 2, 200).unwrap();
        assert_eq!(lines, vec!["hello world"]);
    }

    #[test]
    fn test_greedy_fill() {
        // "aa " = 3, "bb " = 3, "cc" = 2, kerning 1: 3+1+3 = 7 fits in 7
        let widths = uniform("abc ", 1);
        let lines = unicode().wrap("aa bb cc", &widths, 1, 7).unwrap();
        assert_eq!(lines, vec!["aa bb", "cc"]);
    }

    #[test]
    fn test_oversized_segment_alone() {
        let widths = uniform("abcdefghij ", 10);
        let lines = unicode().wrap("ab abcdefghij cd", &widths, 0, 50).unwrap();
        assert_eq!(lines, vec!["ab", "abcdefghij", "cd"]);
    }

    #[test]
    fn test_oversized_first_and_last() {
        let widths = uniform("xyz ", 10);
        let lines = unicode().wrap("xxxxxxx", &widths, 0, 30).unwrap();
        assert_eq!(lines, vec!["xxxxxxx"]);
        let lines = unicode().wrap("y zzzzzzz", &widths, 0, 30).unwrap();
        assert_eq!(lines, vec!["y", "zzzzzzz"]);
    }

    #[test]
    fn test_missing_glyph() {
        let widths = uniform("helo ", 10);
        let err = unicode().wrap("hello world", &widths, 2, 55).unwrap_err();
        assert_eq!(err.character, 'w');
        assert_eq!(err.text, "hello world");
    }

    #[test]
    fn test_missing_glyph_in_later_segment_fails_whole_text() {
        let widths = uniform("a ", 10);
        assert!(unicode().wrap("a a a a a a ab", &widths, 0, 20).is_err());
    }

    #[test]
    fn test_cjk_breaks_between_characters() {
        let text = "今日は晴れです。";
        let widths = uniform(text, 16);
        let lines = unicode().wrap(text, &widths, 0, 48).unwrap();
        assert_eq!(lines, vec!["今日は", "晴れで", "す。"]);
    }

    #[test]
    fn test_no_characters_lost() {
        let text = "The quick brown fox jumps over the lazy dog, again and again.";
        let widths = uniform(text, 7);
        for max_width in [10, 40, 77, 120, 500] {
            let lines = unicode().wrap(text, &widths, 1, max_width).unwrap();
            let joined: String = lines.concat().chars().filter(|c| !c.is_whitespace()).collect();
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(joined, original, "max_width {}", max_width);
        }
    }

    #[test]
    fn test_lines_fit_budget() {
        let text = "The quick brown fox jumps over the lazy dog, again and again.";
        let widths = uniform(text, 7);
        let lines = unicode().wrap(text, &widths, 2, 120).unwrap();
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(widths.measure(line).unwrap() <= 120, "{:?}", line);
        }
    }

    #[test]
    fn test_idempotent_on_wrapped_line() {
        let text = "The quick brown fox jumps over the lazy dog.";
        let widths = uniform(text, 5);
        let engine = unicode();
        for line in engine.wrap(text, &widths, 1, 100).unwrap() {
            assert_eq!(engine.wrap(&line, &widths, 1, 100).unwrap(), vec![line.clone()]);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Determinism matters for reproducible catalogs.";
        let widths = uniform(text, 6);
        let engine = unicode();
        let first = engine.wrap(text, &widths, 1, 90).unwrap();
        for _ in 0..5 {
            assert_eq!(engine.wrap(text, &widths, 1, 90).unwrap(), first);
        }
    }

    #[test]
    fn test_empty_text() {
        let widths = CharacterWidthTable::default();
        assert_eq!(unicode().wrap("", &widths, 1, 10).unwrap(), vec![String::new()]);
    }
}
