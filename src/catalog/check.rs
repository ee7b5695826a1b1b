//! Rendered width check
//!
//! Measures every translated line as the game draws it and reports the
//! ones that overflow the dialog box. Unlike wrapping, a missing glyph is
//! only a warning here.

use log::warn;

use crate::font::CharacterWidthTable;

use super::Catalog;

/// A msgstr line wider than the limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverWidthLine {
    /// Catalog line where the entry starts
    pub line_number: usize,
    /// Source references of the entry
    pub reference: String,
    pub text: String,
    /// Rendered width in pixels
    pub width: i64,
}

/// Collect every msgstr line whose rendered width exceeds `max_width`
pub fn check_catalog(
    catalog: &Catalog,
    widths: &CharacterWidthTable,
    kerning: i32,
    max_width: u32,
) -> Vec<OverWidthLine> {
    let mut found = Vec::new();

    for entry in catalog.entries() {
        if entry.is_obsolete() || entry.msgstr().is_empty() {
            continue;
        }
        for line in entry.msgstr().split('\n') {
            let (width, missing) = widths.measure_rendered(line, kerning);
            if !missing.is_empty() {
                warn!(
                    "Line {}: no glyph for {:?} in '{}'",
                    entry.line_number(),
                    missing,
                    line
                );
            }
            if width > i64::from(max_width) {
                found.push(OverWidthLine {
                    line_number: entry.line_number(),
                    reference: entry.references().collect::<Vec<_>>().join(" "),
                    text: line.to_string(),
                    width,
                });
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_over_width_lines() {
        let widths: CharacterWidthTable = "abcdef ".chars().map(|c| (c, 4)).collect();
        let catalog = Catalog::parse(concat!(
            "#: data/a.cfg:1\nmsgid \"x\"\nmsgstr \"abc def\\nab\"\n\n",
            "#: data/b.cfg:2\nmsgid \"y\"\nmsgstr \"abcdefabcdef\"\n\n",
            "msgid \"z\"\nmsgstr \"\"\n",
        ))
        .unwrap();

        // "abc def": 7 glyphs * 4 + 6 * 1 kerning = 34
        let report = check_catalog(&catalog, &widths, 1, 34);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].reference, "data/b.cfg:2");
        assert_eq!(report[0].text, "abcdefabcdef");
        assert_eq!(report[0].width, 59);

        let report = check_catalog(&catalog, &widths, 1, 33);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].text, "abc def");
        assert_eq!(report[0].line_number, 1);
    }

    #[test]
    fn test_missing_glyphs_are_not_fatal() {
        let widths: CharacterWidthTable = [('a', 10)].into_iter().collect();
        let catalog = Catalog::parse("msgid \"x\"\nmsgstr \"a?a\"\n").unwrap();
        let report = check_catalog(&catalog, &widths, 2, 21);
        assert_eq!(report[0].width, 22);
    }
}
