//! gettext catalog handling
//!
//! A catalog is kept as the raw lines it was read from, grouped into
//! entries at blank lines or where a new entry starts right after a
//! msgstr. Parsed fields are extracted for filtering, but
//! serialization writes the raw lines back, so an entry that is not
//! rewritten comes out byte-for-byte identical. Rewriting a msgstr only
//! replaces the lines of that msgstr field.

pub mod check;
pub mod merge;
pub mod processor;

use std::ops::Range;
use std::path::Path;

use log::debug;

use crate::error::CatalogError;

pub use check::{check_catalog, OverWidthLine};
pub use merge::{CatalogMerger, Msgmerge};
pub use processor::{CatalogProcessor, ProcessReport, SkipReason};

/// Translation catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Raw lines of the header entry (empty msgid), if the file has one
    header: Vec<String>,
    entries: Vec<TranslationEntry>,
}

/// One catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationEntry {
    /// Raw lines including line endings and trailing blank lines
    lines: Vec<String>,
    /// 1-based line number of the first raw line
    line_number: usize,
    /// All `#` comment lines, newline separated
    comment: String,
    msgctxt: Option<String>,
    msgid: String,
    msgid_plural: Option<String>,
    /// Decoded msgstr (empty for plural entries)
    msgstr: String,
    /// Raw line range of the `msgstr` field and its continuations
    msgstr_lines: Option<Range<usize>>,
    obsolete: bool,
}

impl TranslationEntry {
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn msgctxt(&self) -> Option<&str> {
        self.msgctxt.as_deref()
    }

    pub fn msgid(&self) -> &str {
        &self.msgid
    }

    pub fn msgstr(&self) -> &str {
        &self.msgstr
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }

    /// Entry commented out with `#~`
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// Source references (`#:` comments)
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.comment
            .lines()
            .filter_map(|line| line.strip_prefix("#:"))
            .map(str::trim)
    }

    /// Replace the msgstr, rewriting only the lines of that field.
    /// Entries without a `msgstr` line are left untouched.
    pub fn set_msgstr(&mut self, value: &str) {
        let Some(span) = self.msgstr_lines.clone() else {
            return;
        };
        let ending = line_ending(&self.lines[span.end - 1]);
        let line = format!("msgstr \"{}\"{}", escape(value), ending);
        self.lines.splice(span.clone(), std::iter::once(line));
        self.msgstr_lines = Some(span.start..span.start + 1);
        self.msgstr = value.to_string();
    }

    fn write_to(&self, out: &mut String) {
        for line in &self.lines {
            out.push_str(line);
        }
    }
}

impl Catalog {
    /// Read a catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Write the catalog to `path`
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_text())
    }

    /// Parse catalog text
    pub fn parse(text: &str) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();
        for block in split_blocks(text) {
            let entry = parse_entry(block)?;
            if catalog.header.is_empty()
                && catalog.entries.is_empty()
                && entry.msgid.is_empty()
                && entry.msgctxt.is_none()
                && !entry.obsolete
                && entry.msgstr_lines.is_some()
            {
                catalog.header = entry.lines;
                continue;
            }
            catalog.entries.push(entry);
        }
        debug!("Parsed catalog: {} entries", catalog.entries.len());
        Ok(catalog)
    }

    /// Serialize back to text
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in &self.header {
            out.push_str(line);
        }
        for entry in &self.entries {
            entry.write_to(&mut out);
        }
        out
    }

    #[cfg(test)]
    pub fn header(&self) -> String {
        self.header.concat()
    }

    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [TranslationEntry] {
        &mut self.entries
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Raw lines of one entry and the 1-based line number of its first line
struct Block<'a> {
    lines: Vec<&'a str>,
    first_line: usize,
}

/// Group lines into entries. Blank lines stay attached to the entry they
/// follow; blank lines at the top of the file go with the first entry.
///
/// An entry also ends without a blank line when a comment, `msgctxt` or
/// `msgid` follows a `msgstr` of the current entry.
fn split_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current = Block {
        lines: Vec::new(),
        first_line: 1,
    };
    let mut has_content = false;
    let mut in_trailer = false;
    let mut seen_msgstr = false;

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let trimmed = line.trim();
        let keyword = trimmed
            .strip_prefix("#~")
            .map_or(trimmed, str::trim_start);
        let starts_entry = trimmed.starts_with('#')
            || keyword.starts_with("msgctxt")
            || (keyword.starts_with("msgid") && !keyword.starts_with("msgid_plural"));

        if trimmed.is_empty() {
            if has_content {
                in_trailer = true;
            }
        } else if in_trailer || (seen_msgstr && starts_entry) {
            blocks.push(std::mem::replace(
                &mut current,
                Block {
                    lines: Vec::new(),
                    first_line: index + 1,
                },
            ));
            in_trailer = false;
            seen_msgstr = false;
        } else {
            has_content = true;
        }

        if keyword.starts_with("msgstr") {
            seen_msgstr = true;
        }
        current.lines.push(line);
    }
    if !current.lines.is_empty() {
        blocks.push(current);
    }
    blocks
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Ctxt,
    Id,
    IdPlural,
    Str,
    StrPlural,
}

fn parse_entry(block: Block<'_>) -> Result<TranslationEntry, CatalogError> {
    let mut entry = TranslationEntry {
        line_number: block.first_line,
        ..Default::default()
    };
    let mut comments = Vec::new();
    let mut field = Field::None;

    for (index, raw) in block.lines.iter().enumerate() {
        let line_number = block.first_line + index;
        let malformed = |reason: String| CatalogError::Malformed {
            line: line_number,
            reason,
        };
        let line = raw.trim();

        if line.is_empty() {
            continue;
        }
        if line.starts_with("#~") {
            entry.obsolete = true;
            comments.push(line);
            continue;
        }
        if line.starts_with('#') {
            comments.push(line);
            continue;
        }
        if entry.obsolete {
            return Err(malformed("active field inside an obsolete entry".into()));
        }

        let (next, value) = if let Some(rest) = line.strip_prefix("msgctxt") {
            (Field::Ctxt, rest)
        } else if let Some(rest) = line.strip_prefix("msgid_plural") {
            (Field::IdPlural, rest)
        } else if let Some(rest) = line.strip_prefix("msgid") {
            (Field::Id, rest)
        } else if let Some(rest) = line.strip_prefix("msgstr[") {
            let rest = rest
                .split_once(']')
                .map(|(_, value)| value)
                .ok_or_else(|| malformed("unterminated msgstr index".into()))?;
            (Field::StrPlural, rest)
        } else if let Some(rest) = line.strip_prefix("msgstr") {
            (Field::Str, rest)
        } else if line.starts_with('"') {
            (field, line)
        } else {
            return Err(malformed(format!("unexpected line: {}", line)));
        };

        let decoded = parse_quoted(value.trim()).map_err(malformed)?;
        let starts_field = !line.starts_with('"');
        match next {
            Field::None => {
                return Err(malformed("string continuation without a field".into()));
            }
            Field::Ctxt => entry.msgctxt.get_or_insert_with(String::new).push_str(&decoded),
            Field::Id => entry.msgid.push_str(&decoded),
            Field::IdPlural => entry
                .msgid_plural
                .get_or_insert_with(String::new)
                .push_str(&decoded),
            Field::Str => {
                entry.msgstr.push_str(&decoded);
                entry.msgstr_lines = match (&entry.msgstr_lines, starts_field) {
                    (Some(span), false) => Some(span.start..index + 1),
                    _ => Some(index..index + 1),
                };
            }
            // Plural translations are carried opaquely
            Field::StrPlural => {}
        }
        field = next;
    }

    entry.comment = comments.join("\n");
    entry.lines = block.lines.iter().map(|line| line.to_string()).collect();
    Ok(entry)
}

/// Decode a `"..."` literal
fn parse_quoted(literal: &str) -> Result<String, String> {
    let inner = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| format!("expected quoted string, found {}", literal))?;
    // An odd run of trailing backslashes escapes the closing quote
    let trailing = inner.chars().rev().take_while(|&ch| ch == '\\').count();
    if trailing % 2 == 1 {
        return Err(format!("unterminated string: {}", literal));
    }
    unescape(inner)
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Decode the C escape sequences gettext accepts inside a string,
/// including octal (`\101`) and hex (`\x41`) bytes.
pub fn unescape(value: &str) -> Result<String, String> {
    let mut out = Vec::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {}
            '"' => return Err(format!("unescaped quote in \"{}\"", value)),
            _ => {
                let mut buf = [0; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                continue;
            }
        }
        let byte = match chars.next() {
            Some('n') => b'\n',
            Some('t') => b'\t',
            Some('r') => b'\r',
            Some('a') => 0x07,
            Some('b') => 0x08,
            Some('f') => 0x0c,
            Some('v') => 0x0b,
            Some(ch @ ('\\' | '"' | '\'' | '?')) => ch as u8,
            Some('x') => {
                let mut code = 0u32;
                let mut digits = 0;
                while let Some(digit) = chars.peek().and_then(|ch| ch.to_digit(16)) {
                    chars.next();
                    code = (code << 4) | digit;
                    digits += 1;
                    if code > 0xff {
                        return Err(format!("hex escape out of range in \"{}\"", value));
                    }
                }
                if digits == 0 {
                    return Err(format!("\\x without hex digits in \"{}\"", value));
                }
                code as u8
            }
            Some(first @ '0'..='7') => {
                let mut code = first as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek().and_then(|ch| ch.to_digit(8)) {
                        Some(digit) => {
                            chars.next();
                            code = code * 8 + digit;
                        }
                        None => break,
                    }
                }
                u8::try_from(code)
                    .map_err(|_| format!("octal escape out of range in \"{}\"", value))?
            }
            Some(other) => {
                return Err(format!("invalid escape \\{} in \"{}\"", other, value));
            }
            None => return Err(format!("string ends with a backslash: \"{}\"", value)),
        };
        out.push(byte);
    }
    String::from_utf8(out).map_err(|_| format!("escapes do not form UTF-8 in \"{}\"", value))
}

/// Encode a value for a `"..."` literal
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0b' => out.push_str("\\v"),
            '\x0c' => out.push_str("\\f"),
            c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
