//! Configuration file management
//!
//! Loads TOML configuration files and provides run settings.
//! Default config path: ./glyphwrap.toml, then ~/.config/glyphwrap/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CATALOG_EXT, DEFAULT_MAX_LINE_WIDTH, DEFAULT_MERGE_PROGRAM, DEFAULT_TEMPLATE,
    FONT_CONFIG_EXT, FONT_CONFIG_STEM, MERGED_SUFFIX, WRAPPED_SUFFIX,
};

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path settings
    pub paths: PathConfig,
    /// Wrap settings
    pub wrap: WrapConfig,
    /// Merge settings
    pub merge: MergeConfig,
}

/// Path settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory holding dialog_font*.cfg
    pub data_dir: PathBuf,
    /// Directory holding the .po catalogs and the template
    pub po_dir: PathBuf,
    /// Merge template file name inside po_dir
    pub template: String,
}

/// Wrap settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapConfig {
    /// Maximum line width in pixels
    pub max_line_width: u32,
}

/// Merge settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Merge program, invoked as `PROGRAM UPDATED TEMPLATE -o OUTPUT`
    pub program: String,
    /// Seconds to wait for the merge (0 = no limit)
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathConfig::default(),
            wrap: WrapConfig::default(),
            merge: MergeConfig::default(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            po_dir: PathBuf::from("po"),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            max_line_width: DEFAULT_MAX_LINE_WIDTH,
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_MERGE_PROGRAM.to_string(),
            timeout_secs: 0,
        }
    }
}

/// Files used by one run for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Font config (per-language, or the shared fallback)
    pub font_config: PathBuf,
    /// Catalog being rewrapped
    pub catalog: PathBuf,
    /// Merge template
    pub template: PathBuf,
    /// Rewrapped catalog before merging
    pub wrapped: PathBuf,
    /// Merge output before it replaces the catalog
    pub merged: PathBuf,
}

impl Config {
    /// Local config file name, looked up in the working directory
    const LOCAL_CONFIG_NAME: &'static str = "glyphwrap.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. GLYPHWRAP_CONFIG environment variable
        if let Ok(path) = std::env::var("GLYPHWRAP_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
            warn!("GLYPHWRAP_CONFIG points to missing file: {}", path);
        }

        // 2. ./glyphwrap.toml
        let local = Path::new(Self::LOCAL_CONFIG_NAME);
        if local.exists() {
            return Some(local.to_path_buf());
        }

        // 3. User config: ~/.config/glyphwrap/config.toml
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                return Some(config_path);
            }
        }

        None
    }

    /// Load configuration with priority:
    /// 1. GLYPHWRAP_CONFIG environment variable
    /// 2. ./glyphwrap.toml
    /// 3. ~/.config/glyphwrap/config.toml (user config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the default config to `path` (for template generation)
    pub fn write_default_config(path: &Path) -> Result<()> {
        let body = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;
        let content = format!(
            "# glyphwrap configuration\n# Paths are relative to the directory glyphwrap runs in.\n\n{}",
            body
        );
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Merge timeout, None when unlimited
    pub fn merge_timeout(&self) -> Option<Duration> {
        (self.merge.timeout_secs > 0).then(|| Duration::from_secs(self.merge.timeout_secs))
    }

    /// Derive the files for `language`.
    ///
    /// The font config is `dialog_font.<language>.cfg` when that file
    /// exists, otherwise the shared `dialog_font.cfg`.
    pub fn run_paths(&self, language: &str) -> RunPaths {
        let localized = self.paths.data_dir.join(format!(
            "{}.{}.{}",
            FONT_CONFIG_STEM, language, FONT_CONFIG_EXT
        ));
        let font_config = if localized.exists() {
            localized
        } else {
            self.paths
                .data_dir
                .join(format!("{}.{}", FONT_CONFIG_STEM, FONT_CONFIG_EXT))
        };

        let catalog_name = format!("{}.{}", language, CATALOG_EXT);
        RunPaths {
            font_config,
            catalog: self.paths.po_dir.join(&catalog_name),
            template: self.paths.po_dir.join(&self.paths.template),
            wrapped: self
                .paths
                .po_dir
                .join(format!("{}.{}", catalog_name, WRAPPED_SUFFIX)),
            merged: self
                .paths
                .po_dir
                .join(format!("{}.{}", catalog_name, MERGED_SUFFIX)),
        }
    }
}

/// User config path (~/.config/glyphwrap/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("glyphwrap").join("config.toml"))
}
