//! Glyph metrics of a bitmap dialog font
//!
//! A font config declares glyph groups in file order. Every group gives
//! one metrics box to all of its characters; the width table is built by
//! replaying the groups so a later declaration overwrites an earlier one.

use std::collections::HashMap;

use log::debug;

/// Parsed font configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    /// Extra pixels between rendered segments
    pub kerning: i32,
    /// Font identifier used by the game
    pub id: String,
    /// Texture path, relative to the game's image directory
    pub texture: String,
    /// Texture padding between glyph cells
    pub padding: i32,
    /// Glyph groups in declaration order
    pub groups: Vec<GlyphGroup>,
}

/// One or more characters sharing layout metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphGroup {
    /// Glyph box given as inclusive texture coordinates
    Rect {
        chars: Vec<char>,
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
        pad: Option<i32>,
    },
    /// Glyph given only by its advance width
    Width {
        chars: Vec<char>,
        width: i32,
        pad: Option<i32>,
    },
}

impl GlyphGroup {
    /// Characters covered by this group
    pub fn chars(&self) -> &[char] {
        match self {
            Self::Rect { chars, .. } | Self::Width { chars, .. } => chars,
        }
    }

    /// Pixel width applied to every character of the group.
    /// A rect group computes this once from its box, not per character.
    pub fn width(&self) -> i32 {
        match self {
            Self::Rect { left, right, .. } => right - left + 1,
            Self::Width { width, .. } => *width,
        }
    }

    /// Pixel height (rect groups only)
    pub fn height(&self) -> Option<i32> {
        match self {
            Self::Rect { top, bottom, .. } => Some(bottom - top + 1),
            Self::Width { .. } => None,
        }
    }

    /// Per-group padding override
    pub fn pad(&self) -> Option<i32> {
        match self {
            Self::Rect { pad, .. } | Self::Width { pad, .. } => *pad,
        }
    }
}

impl FontConfig {
    /// Tallest glyph box among rect groups
    pub fn line_height(&self) -> Option<i32> {
        self.groups.iter().filter_map(GlyphGroup::height).max()
    }

    /// Build the character width table, last group winning for a repeated character
    pub fn width_table(&self) -> CharacterWidthTable {
        let mut widths = HashMap::new();
        for group in &self.groups {
            let width = group.width().max(0) as u32;
            for &ch in group.chars() {
                if let Some(previous) = widths.insert(ch, width) {
                    debug!(
                        "Glyph {:?} redefined in font '{}': width {} -> {}",
                        ch, self.id, previous, width
                    );
                }
            }
        }
        CharacterWidthTable { widths }
    }
}

/// Character to pixel width mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterWidthTable {
    widths: HashMap<char, u32>,
}

impl CharacterWidthTable {
    /// Width of one character
    #[inline]
    pub fn get(&self, ch: char) -> Option<u32> {
        self.widths.get(&ch).copied()
    }

    /// Number of distinct characters
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Sum of glyph widths of `text`, without kerning.
    /// Err carries the first character that has no glyph.
    pub fn measure(&self, text: &str) -> Result<i64, char> {
        text.chars().try_fold(0i64, |total, ch| {
            self.get(ch).map(|w| total + i64::from(w)).ok_or(ch)
        })
    }

    /// Width of `text` as the game renders it: every glyph advances by
    /// its width plus `kerning`, minus the trailing kerning.
    /// Characters without a glyph count as 0 and are returned.
    pub fn measure_rendered(&self, text: &str, kerning: i32) -> (i64, Vec<char>) {
        let mut total = 0i64;
        let mut count = 0i64;
        let mut missing = Vec::new();
        for ch in text.chars() {
            match self.get(ch) {
                Some(w) => {
                    total += i64::from(w);
                    count += 1;
                }
                None => {
                    if !missing.contains(&ch) {
                        missing.push(ch);
                    }
                }
            }
        }
        if count > 1 {
            total += i64::from(kerning) * (count - 1);
        }
        (total, missing)
    }
}

impl FromIterator<(char, u32)> for CharacterWidthTable {
    fn from_iter<I: IntoIterator<Item = (char, u32)>>(iter: I) -> Self {
        Self {
            widths: iter.into_iter().collect(),
        }
    }
}
