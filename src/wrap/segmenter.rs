//! Line break segmentation
//!
//! A segmenter splits text at legal line break opportunities. The wrap
//! engine only ever breaks between segments, so a segmenter decides
//! which positions are linguistically acceptable (never before closing
//! punctuation, between CJK ideographs, after spaces, ...).

use unicode_linebreak::linebreaks;

/// Half-open byte span `[start, end)` of a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice of `text` covered by this segment
    #[inline]
    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

/// Source of legal break positions
///
/// Returned segments must be contiguous, non-empty, lie on char
/// boundaries and cover `text` from start to end.
pub trait LineSegmenter {
    fn segments(&self, text: &str, locale: &str) -> Vec<Segment>;
}

/// UAX #14 line breaking
///
/// The default rules are not tailored per locale; they already forbid
/// breaks before closing punctuation and allow breaks between CJK
/// ideographs, which covers the languages shipped with the game.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeLineSegmenter;

impl LineSegmenter for UnicodeLineSegmenter {
    fn segments(&self, text: &str, _locale: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut start = 0;
        for (offset, _) in linebreaks(text) {
            if offset > start {
                segments.push(Segment::new(start, offset));
                start = offset;
            }
        }
        // linebreaks() always reports end of text; keep coverage total regardless
        if start < text.len() {
            segments.push(Segment::new(start, text.len()));
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split<'t>(text: &'t str) -> Vec<&'t str> {
        UnicodeLineSegmenter
            .segments(text, "en")
            .iter()
            .map(|s| s.text(text))
            .collect()
    }

    #[test]
    fn test_latin_words() {
        assert_eq!(split("hello world"), vec!["hello ", "world"]);
        assert_eq!(split("one two  three"), vec!["one ", "two  ", "three"]);
    }

    #[test]
    fn test_no_break_before_closing_punctuation() {
        assert_eq!(split("wait (what)!"), vec!["wait ", "(what)!"]);
    }

    #[test]
    fn test_cjk() {
        assert_eq!(split("日本語。"), vec!["日", "本", "語。"]);
    }

    #[test]
    fn test_empty() {
        assert!(split("").is_empty());
    }

    #[test]
    fn test_segments_cover_text() {
        let text = "Frogatto's “quest” — über-long, 你好！";
        let segments = UnicodeLineSegmenter.segments(text, "en");
        let mut pos = 0;
        for segment in &segments {
            assert_eq!(segment.start, pos);
            assert!(segment.end > segment.start);
            pos = segment.end;
        }
        assert_eq!(pos, text.len());
    }
}
