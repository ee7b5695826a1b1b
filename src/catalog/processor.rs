//! Catalog rewrapping
//!
//! Decides which entries are eligible and rewrites their msgstr through
//! the word wrap engine. Everything else passes through untouched.

use log::{debug, info};

use crate::constants::{MARKUP_CHARS, SKIP_COMMENT_MARKERS};
use crate::error::MissingGlyphError;
use crate::font::{CharacterWidthTable, FontConfig};
use crate::wrap::{LineSegmenter, WordWrapEngine};

use super::{Catalog, TranslationEntry};

/// Why an entry is left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty msgid (header) or empty msgstr (untranslated)
    Untranslated,
    /// Commented out with `#~`
    Obsolete,
    /// Has plural forms
    Plural,
    /// Comment names a file that must not be rewrapped
    ExcludedSource(&'static str),
    /// msgstr holds `{markup}`
    Markup,
    /// msgstr already contains line breaks
    HasLineBreaks,
}

/// Returns the reason `entry` must not be rewrapped, or `None` if it is eligible
pub fn skip_reason(entry: &TranslationEntry) -> Option<SkipReason> {
    if entry.msgid().is_empty() || entry.msgstr().is_empty() {
        return Some(SkipReason::Untranslated);
    }
    if entry.is_obsolete() {
        return Some(SkipReason::Obsolete);
    }
    if entry.is_plural() {
        return Some(SkipReason::Plural);
    }
    if let Some(marker) = SKIP_COMMENT_MARKERS
        .into_iter()
        .find(|marker| entry.comment().contains(marker))
    {
        return Some(SkipReason::ExcludedSource(marker));
    }
    let msgstr = entry.msgstr();
    if msgstr.contains(MARKUP_CHARS) {
        return Some(SkipReason::Markup);
    }
    // A decoded newline, or a literal `\n` written as `\\n`
    if msgstr.contains('\n') || msgstr.contains("\\n") {
        return Some(SkipReason::HasLineBreaks);
    }
    None
}

/// Summary of a processing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Entries passed to the wrap engine
    pub eligible: usize,
    /// Entries whose msgstr changed
    pub rewritten: usize,
    /// Entries that now span more than one line
    pub multi_line: usize,
    /// Entries left untouched by the filter
    pub skipped: usize,
}

/// Rewraps eligible catalog entries for one font
pub struct CatalogProcessor<'a, S: LineSegmenter> {
    engine: &'a WordWrapEngine<S>,
    widths: CharacterWidthTable,
    kerning: i32,
    max_width: u32,
}

impl<'a, S: LineSegmenter> CatalogProcessor<'a, S> {
    pub fn new(engine: &'a WordWrapEngine<S>, font: &FontConfig, max_width: u32) -> Self {
        Self {
            engine,
            widths: font.width_table(),
            kerning: font.kerning,
            max_width,
        }
    }

    pub fn widths(&self) -> &CharacterWidthTable {
        &self.widths
    }

    /// Rewrap every eligible entry of `catalog` in place.
    ///
    /// Stops at the first missing glyph. The catalog may then be partly
    /// rewritten in memory and must not be saved.
    pub fn process(&self, catalog: &mut Catalog) -> Result<ProcessReport, MissingGlyphError> {
        let mut report = ProcessReport::default();

        for entry in catalog.entries_mut() {
            if let Some(reason) = skip_reason(entry) {
                match entry.msgctxt() {
                    Some(context) => debug!(
                        "Skipping entry at line {} (context '{}'): {:?}",
                        entry.line_number(),
                        context,
                        reason
                    ),
                    None => debug!("Skipping entry at line {}: {:?}", entry.line_number(), reason),
                }
                report.skipped += 1;
                continue;
            }
            report.eligible += 1;

            let lines = self
                .engine
                .wrap(entry.msgstr(), &self.widths, self.kerning, self.max_width)?;
            let wrapped = lines.join("\n");

            if lines.len() > 1 {
                info!("Word-wrapped:\n{}", wrapped);
                report.multi_line += 1;
            }
            if wrapped != entry.msgstr() {
                entry.set_msgstr(&wrapped);
                report.rewritten += 1;
            }
        }

        info!(
            "Processed catalog for '{}': {} eligible, {} rewritten, {} multi-line, {} skipped",
            self.engine.locale(),
            report.eligible,
            report.rewritten,
            report.multi_line,
            report.skipped
        );
        Ok(report)
    }
}
