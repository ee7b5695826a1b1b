//! glyphwrap - word-wrap gettext catalogs for bitmap dialog fonts
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌────────────────────┐
//! │ font config  │──▶│ character widths   │
//! └──────────────┘   └─────────┬──────────┘
//!                              ▼
//! ┌──────────────┐   ┌────────────────────┐   ┌──────────────┐
//! │ <lang>.po    │──▶│ catalog processor  │◀──│ line breaker │
//! └──────────────┘   │  (word wrap)       │   └──────────────┘
//!                    └─────────┬──────────┘
//!                              ▼
//!                    <lang>.po.wrapped ──▶ msgmerge ──▶ <lang>.po
//! ```

mod catalog;
mod config;
mod constants;
mod error;
mod font;
mod wrap;

use anyhow::{anyhow, bail, Context, Result};
use log::{error, info};

use catalog::{Catalog, CatalogMerger, CatalogProcessor, Msgmerge, ProcessReport};
use config::{Config, RunPaths};
use wrap::{UnicodeLineSegmenter, WordWrapEngine};

// ============================================================================
// Command Line
// ============================================================================

/// Parsed command line
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    language: Option<String>,
    check: bool,
    no_merge: bool,
    max_width: Option<u32>,
    init_config: bool,
    force: bool,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    for arg in args {
        match arg.as_str() {
            "--check" => options.check = true,
            "--no-merge" => options.no_merge = true,
            "--init-config" => options.init_config = true,
            "-f" | "--force" => options.force = true,
            other if other.starts_with("--max-width=") => {
                let value = &other["--max-width=".len()..];
                let width = value
                    .parse()
                    .with_context(|| format!("Invalid --max-width value: {}", value))?;
                options.max_width = Some(width);
            }
            other if other.starts_with('-') => bail!("Unknown option: {}", other),
            language => {
                if let Some(previous) = &options.language {
                    bail!("Only one language may be given (got {} and {})", previous, language);
                }
                options.language = Some(language.to_string());
            }
        }
    }
    Ok(options)
}

fn print_help() {
    println!(
        r#"glyphwrap {} - word-wrap gettext catalogs for bitmap dialog fonts

USAGE:
    glyphwrap [OPTIONS] <LANGUAGE>

ARGS:
    <LANGUAGE>              Catalog base name, e.g. zh_CN for po/zh_CN.po

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    --check                 Report lines wider than the limit, change nothing
    --no-merge              Replace the catalog without running msgmerge
    --max-width=PIXELS      Override the maximum line width
    --init-config           Write ./glyphwrap.toml with default settings
    -f, --force             Overwrite an existing config file

FILES:
    data/dialog_font.<LANGUAGE>.cfg   Font metrics (falls back to data/dialog_font.cfg)
    po/<LANGUAGE>.po                  Catalog to rewrap
    po/frogatto.pot                   Merge template

CONFIG FILE:
    ./glyphwrap.toml or ~/.config/glyphwrap/config.toml
    (override with GLYPHWRAP_CONFIG)

Entries with {{markup}}, existing line breaks, or comments mentioning
METADATA, CHANGELOG or titlescreen are never rewrapped.
"#,
        env!("CARGO_PKG_VERSION")
    );
}

// ============================================================================
// Pipeline
// ============================================================================

/// Rewrap the catalog of `language` and merge it against the template.
///
/// The catalog file is replaced only after every step succeeded. On a
/// merge failure the rewrapped catalog is left next to the original.
fn rewrap<M: CatalogMerger>(
    paths: &RunPaths,
    language: &str,
    max_width: u32,
    merger: Option<&M>,
) -> Result<ProcessReport> {
    if !paths.catalog.exists() {
        bail!("{} does not exist", paths.catalog.display());
    }

    let font = font::load_font_config(&paths.font_config)?;
    let mut catalog = Catalog::load(&paths.catalog)?;

    let engine = WordWrapEngine::new(UnicodeLineSegmenter, language);
    let processor = CatalogProcessor::new(&engine, &font, max_width);
    info!(
        "{} glyphs available, max line width {}px",
        processor.widths().len(),
        max_width
    );
    let report = processor.process(&mut catalog).with_context(|| {
        format!(
            "Cannot wrap {}. If this language uses generated glyphs, regenerate {}",
            paths.catalog.display(),
            paths.font_config.display()
        )
    })?;

    catalog
        .save(&paths.wrapped)
        .with_context(|| format!("Failed to write {}", paths.wrapped.display()))?;

    match merger {
        Some(merger) => {
            let merged = merger
                .merge(&paths.wrapped, &paths.template, &paths.merged)
                .with_context(|| {
                    format!(
                        "Catalog merge failed; rewrapped catalog kept at {}",
                        paths.wrapped.display()
                    )
                })?;
            std::fs::rename(&merged, &paths.catalog)
                .with_context(|| format!("Failed to replace {}", paths.catalog.display()))?;
            std::fs::remove_file(&paths.wrapped)
                .with_context(|| format!("Failed to remove {}", paths.wrapped.display()))?;
        }
        None => {
            std::fs::rename(&paths.wrapped, &paths.catalog)
                .with_context(|| format!("Failed to replace {}", paths.catalog.display()))?;
        }
    }

    info!("Updated {}", paths.catalog.display());
    Ok(report)
}

/// Print every over-width line and return how many were found
fn check(paths: &RunPaths, max_width: u32) -> Result<usize> {
    let font = font::load_font_config(&paths.font_config)?;
    let catalog = Catalog::load(&paths.catalog)?;
    let found = catalog::check_catalog(&catalog, &font.width_table(), font.kerning, max_width);

    for line in &found {
        println!("{} pixels:", line.width);
        println!("  #: {} (line {})", line.reference, line.line_number);
        println!("  {}", line.text);
        println!();
    }
    Ok(found.len())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Check command line arguments
    let args: Vec<String> = std::env::args().skip(1).collect();

    // --help
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("glyphwrap {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let options = parse_args(&args)?;

    // Config file generation mode
    if options.init_config {
        let path = std::path::Path::new("glyphwrap.toml");
        if path.exists() && !options.force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        Config::write_default_config(path)?;
        println!("Config file generated: {}", path.display());
        return Ok(());
    }

    let language = options
        .language
        .ok_or_else(|| anyhow!("Missing LANGUAGE argument (see --help)"))?;

    // Load config file
    let cfg = Config::load();
    let max_width = options.max_width.unwrap_or(cfg.wrap.max_line_width);
    let paths = cfg.run_paths(&language);

    if options.check {
        if !paths.catalog.exists() {
            bail!("{} does not exist", paths.catalog.display());
        }
        let found = check(&paths, max_width)?;
        if found > 0 {
            error!("{} line(s) wider than {}px", found, max_width);
            std::process::exit(1);
        }
        info!("All lines fit in {}px", max_width);
        return Ok(());
    }

    let merger = Msgmerge::new(cfg.merge.program.clone(), cfg.merge_timeout());
    let merger = (!options.no_merge).then_some(&merger);
    if let Err(e) = rewrap(&paths, &language, max_width, merger) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use std::fs;
    use std::path::{Path, PathBuf};

    const FONT: &str = r#"{
        id: "dialog",
        texture: "gui/dialog_font.png",
        kerning: 2,
        chars: [
            {chars: "abcdefghijklmnopqrstuvwxyz ", width: 10},
            {chars: "!", rect: [0,0,3,15]},
        ],
    }"#;

    const CATALOG: &str = "msgid \"\"\nmsgstr \"\"\n\"Language: fr\\n\"\n\n\
#: data/dialog.cfg:3\nmsgid \"Hi\"\nmsgstr \"hello world\"\n\n\
#. CHANGELOG\nmsgid \"Log\"\nmsgstr \"hello world\"\n";

    const WRAPPED: &str = "msgid \"\"\nmsgstr \"\"\n\"Language: fr\\n\"\n\n\
#: data/dialog.cfg:3\nmsgid \"Hi\"\nmsgstr \"hello\\nworld\"\n\n\
#. CHANGELOG\nmsgid \"Log\"\nmsgstr \"hello world\"\n";

    /// Copies the updated catalog to the output
    struct CopyMerger;

    impl CatalogMerger for CopyMerger {
        fn merge(&self, updated: &Path, _template: &Path, output: &Path) -> Result<PathBuf, MergeError> {
            fs::copy(updated, output)?;
            Ok(output.to_path_buf())
        }
    }

    struct FailingMerger;

    impl CatalogMerger for FailingMerger {
        fn merge(&self, _: &Path, _: &Path, _: &Path) -> Result<PathBuf, MergeError> {
            Err(MergeError::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom")))
        }
    }

    fn setup(font: &str, catalog: &str) -> (tempfile::TempDir, RunPaths) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.data_dir = dir.path().join("data");
        config.paths.po_dir = dir.path().join("po");
        fs::create_dir_all(&config.paths.data_dir).unwrap();
        fs::create_dir_all(&config.paths.po_dir).unwrap();
        fs::write(config.paths.data_dir.join("dialog_font.cfg"), font).unwrap();
        fs::write(config.paths.po_dir.join("fr.po"), catalog).unwrap();
        let paths = config.run_paths("fr");
        (dir, paths)
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&["zh_CN", "--no-merge", "--max-width=280"])).unwrap();
        assert_eq!(options.language.as_deref(), Some("zh_CN"));
        assert!(options.no_merge);
        assert_eq!(options.max_width, Some(280));

        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["fr", "de"])).is_err());
        assert!(parse_args(&args(&["--max-width=wide"])).is_err());
    }

    #[test]
    fn test_rewrap_with_merge() {
        let (_dir, paths) = setup(FONT, CATALOG);
        let report = rewrap(&paths, "fr", 55, Some(&CopyMerger)).unwrap();
        assert_eq!(report.rewritten, 1);
        assert_eq!(fs::read_to_string(&paths.catalog).unwrap(), WRAPPED);
        assert!(!paths.wrapped.exists());
        assert!(!paths.merged.exists());
    }

    #[test]
    fn test_rewrap_without_merge() {
        let (_dir, paths) = setup(FONT, CATALOG);
        rewrap::<CopyMerger>(&paths, "fr", 55, None).unwrap();
        assert_eq!(fs::read_to_string(&paths.catalog).unwrap(), WRAPPED);
        assert!(!paths.wrapped.exists());
    }

    #[test]
    fn test_merge_failure_keeps_both_catalogs() {
        let (_dir, paths) = setup(FONT, CATALOG);
        let err = rewrap(&paths, "fr", 55, Some(&FailingMerger)).unwrap_err();
        assert!(format!("{:#}", err).contains("boom"));
        assert_eq!(fs::read_to_string(&paths.catalog).unwrap(), CATALOG);
        assert_eq!(fs::read_to_string(&paths.wrapped).unwrap(), WRAPPED);
    }

    #[test]
    fn test_missing_glyph_writes_nothing() {
        let catalog = "msgid \"Hi\"\nmsgstr \"héllo\"\n";
        let (_dir, paths) = setup(FONT, catalog);
        let err = rewrap(&paths, "fr", 55, Some(&CopyMerger)).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("'é'"), "{}", message);
        assert!(message.contains("héllo"), "{}", message);
        assert_eq!(fs::read_to_string(&paths.catalog).unwrap(), catalog);
        assert!(!paths.wrapped.exists());
    }

    #[test]
    fn test_missing_catalog() {
        let (_dir, paths) = setup(FONT, CATALOG);
        fs::remove_file(&paths.catalog).unwrap();
        let err = rewrap(&paths, "fr", 55, Some(&CopyMerger)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_bad_font_config_writes_nothing() {
        let (_dir, paths) = setup("{id: \"dialog\", chars: []}", CATALOG);
        let err = rewrap(&paths, "fr", 55, Some(&CopyMerger)).unwrap_err();
        assert!(format!("{:#}", err).contains("texture"));
        assert_eq!(fs::read_to_string(&paths.catalog).unwrap(), CATALOG);
        assert!(!paths.wrapped.exists());
    }

    #[test]
    fn test_check() {
        let (_dir, paths) = setup(FONT, CATALOG);
        // "hello world": 11 glyphs * 10 + 10 * 2 kerning = 130
        assert_eq!(check(&paths, 130).unwrap(), 0);
        assert_eq!(check(&paths, 129).unwrap(), 2);
    }
}
