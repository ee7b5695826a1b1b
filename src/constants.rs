//! Global constants for glyphwrap
//!
//! Consolidates font defaults, catalog markers and file naming
//! conventions to eliminate magic values throughout the codebase.

// ============================================================================
// Font Defaults
// ============================================================================

/// Kerning used when a font config omits `kerning`
pub const DEFAULT_KERNING: i32 = 1;

/// Texture padding used when a font config omits `pad`
pub const DEFAULT_PADDING: i32 = 2;

// ============================================================================
// Layout
// ============================================================================

/// Maximum dialog line width in pixels
pub const DEFAULT_MAX_LINE_WIDTH: u32 = 350;

// ============================================================================
// Catalog Filtering
// ============================================================================

/// Comment substrings marking entries that must never be rewrapped
/// (changelog text, mod metadata, title screen layout)
pub const SKIP_COMMENT_MARKERS: [&str; 3] = ["METADATA", "CHANGELOG", "titlescreen"];

/// Characters marking formula/markup text in a msgstr
pub const MARKUP_CHARS: [char; 2] = ['{', '}'];

// ============================================================================
// File Naming
// ============================================================================

/// Base name of dialog font configs (`dialog_font.<lang>.cfg`)
pub const FONT_CONFIG_STEM: &str = "dialog_font";

/// Font config extension
pub const FONT_CONFIG_EXT: &str = "cfg";

/// Catalog extension
pub const CATALOG_EXT: &str = "po";

/// Suffix of the rewrapped, not yet merged catalog
pub const WRAPPED_SUFFIX: &str = "wrapped";

/// Suffix of the merge output before it replaces the catalog
pub const MERGED_SUFFIX: &str = "part";

/// Default merge template inside the catalog directory
pub const DEFAULT_TEMPLATE: &str = "frogatto.pot";

/// Default external merge program
pub const DEFAULT_MERGE_PROGRAM: &str = "msgmerge";
