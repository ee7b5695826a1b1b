//! Bitmap dialog font metrics
//!
//! Handles:
//! - Font config parsing (object notation with glyph groups)
//! - Glyph width/height derivation
//! - Character width table for layout

pub mod metrics;
pub mod parser;

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

pub use metrics::{CharacterWidthTable, FontConfig, GlyphGroup};

/// Read and parse a font config file
pub fn load_font_config(path: &Path) -> Result<FontConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read font config: {}", path.display()))?;
    let font = parser::parse(&text)
        .with_context(|| format!("Failed to parse font config: {}", path.display()))?;
    info!(
        "Font '{}' loaded from {}: texture {}, {} glyph groups, kerning {}, line height {}",
        font.id,
        path.display(),
        font.texture,
        font.groups.len(),
        font.kerning,
        font.line_height().map_or_else(|| "n/a".to_string(), |h| h.to_string())
    );
    Ok(font)
}
