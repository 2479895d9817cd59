// SPDX-License-Identifier: MPL-2.0
//! Config directory resolution.
//!
//! # Resolution Order
//!
//! 1. **Explicit override** - parameter to [`config_dir_with_override`] (for tests
//!    and hosts that keep plugin settings next to their own)
//! 2. **Environment variable** (`FLUTTER_ASSET_GALLERY_CONFIG_DIR`)
//! 3. **Platform default** - via `dirs` crate

use std::path::PathBuf;

/// Application name used for directory naming.
const APP_NAME: &str = "FlutterAssetGallery";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "FLUTTER_ASSET_GALLERY_CONFIG_DIR";

/// Returns the config directory path.
///
/// - Linux: `~/.config/FlutterAssetGallery/`
/// - macOS: `~/Library/Application Support/FlutterAssetGallery/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\FlutterAssetGallery\`
///
/// Returns `None` if the config directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    config_dir_with_override(None)
}

/// Returns the config directory path with an optional override.
///
/// The override wins over the environment variable, which wins over the
/// platform default. An empty environment variable is ignored.
pub fn config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_DIR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}
