// SPDX-License-Identifier: MPL-2.0
//! This module handles the gallery's tuning knobs, loaded from a
//! `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[scan]` - Path fragments excluded from traversal
//! - `[thumbnails]` - Thumbnail box size, batch size, SVG scaling
//! - `[search]` - Search debounce window
//!
//! Every field is optional; missing fields fall back to [`defaults`]. Values
//! outside their allowed range are clamped when resolved into
//! [`GallerySettings`].
//!
//! # Examples
//!
//! ```no_run
//! use flutter_asset_gallery::config;
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (config, _warning) = config::load();
//!
//! // Resolve it into controller settings
//! let settings = config.gallery_settings();
//! assert!(settings.batch_size >= 1);
//! ```

pub mod defaults;
pub mod paths;

pub use defaults::*;

use crate::directory_scanner::ExcludedPaths;
use crate::error::Result;
use crate::gallery::GallerySettings;
use crate::media::thumbnail::SvgScale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Traversal settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    /// Substrings that prune any path containing them.
    #[serde(
        default = "default_excluded_fragments",
        skip_serializing_if = "Option::is_none"
    )]
    pub excluded_fragments: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            excluded_fragments: default_excluded_fragments(),
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThumbnailConfig {
    /// Edge of the square box thumbnails are fitted into, in pixels.
    #[serde(
        default = "default_thumbnail_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u32>,

    /// Number of thumbnails decoded concurrently and published together.
    #[serde(default = "default_batch_size", skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// How SVG files are scaled into the box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_scale: Option<SvgScale>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: default_thumbnail_size(),
            batch_size: default_batch_size(),
            svg_scale: Some(SvgScale::default()),
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Delay after the last keystroke before filtering, in milliseconds.
    #[serde(
        default = "default_debounce_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub debounce_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Gallery configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub thumbnails: ThumbnailConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Resolves the configuration into the settings consumed by
    /// [`crate::gallery::GalleryController`], clamping out-of-range values.
    #[must_use]
    pub fn gallery_settings(&self) -> GallerySettings {
        let excluded = match &self.scan.excluded_fragments {
            Some(fragments) => ExcludedPaths::new(fragments.iter().cloned()),
            None => ExcludedPaths::default(),
        };

        let thumbnail_size = self
            .thumbnails
            .size
            .unwrap_or(DEFAULT_THUMBNAIL_SIZE)
            .clamp(MIN_THUMBNAIL_SIZE, MAX_THUMBNAIL_SIZE);

        let batch_size = self
            .thumbnails
            .batch_size
            .unwrap_or(DEFAULT_BATCH_SIZE)
            .clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);

        let debounce_ms = self
            .search
            .debounce_ms
            .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS)
            .min(MAX_SEARCH_DEBOUNCE_MS);

        GallerySettings {
            excluded,
            thumbnail_size,
            batch_size,
            debounce: Duration::from_millis(debounce_ms),
            svg_scale: self.thumbnails.svg_scale.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_excluded_fragments() -> Option<Vec<String>> {
    Some(
        DEFAULT_EXCLUDED_FRAGMENTS
            .iter()
            .map(|fragment| fragment.to_string())
            .collect(),
    )
}

fn default_thumbnail_size() -> Option<u32> {
    Some(DEFAULT_THUMBNAIL_SIZE)
}

fn default_batch_size() -> Option<usize> {
    Some(DEFAULT_BATCH_SIZE)
}

fn default_debounce_ms() -> Option<u64> {
    Some(DEFAULT_SEARCH_DEBOUNCE_MS)
}

// =============================================================================
// Settings File I/O
// =============================================================================

/// Location of `settings.toml` inside the resolved config directory.
fn settings_file(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::config_dir_with_override(base_dir).map(|dir| dir.join(CONFIG_FILE))
}

/// Loads the configuration from the default path.
///
/// Returns the configuration plus an optional warning key. A missing file is
/// not an error; an unreadable or invalid one falls back to defaults with the
/// `config-load-error` warning.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    let Some(path) = settings_file(base_dir).filter(|path| path.exists()) else {
        return (Config::default(), None);
    };

    load_from_path(&path).map_or_else(
        |err| {
            tracing::warn!(path = %path.display(), error = %err, "falling back to default config");
            (Config::default(), Some("config-load-error".to_string()))
        },
        |config| (config, None),
    )
}

/// Parses the configuration stored at `path`.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
///
/// Does nothing when no config directory can be resolved.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    match settings_file(base_dir) {
        Some(path) => save_to_path(config, &path),
        None => Ok(()),
    }
}

/// Writes the configuration to `path`, creating parent directories.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
