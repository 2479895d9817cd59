// SPDX-License-Identifier: MPL-2.0
//! Bundled-asset matching against the patterns declared under `flutter.assets`.
//!
//! Patterns are kept exactly as written in the manifest. Flutter treats an
//! entry ending in `/` as "every file in that directory", and anything else as
//! a single file. An exact entry also matches paths below it, mirroring how the
//! gallery has always resolved declarations such as `assets/logo.png`.
//!
//! # Example
//!
//! ```
//! use flutter_asset_gallery::manifest::AssetManifest;
//!
//! let manifest = AssetManifest::new(vec!["assets/icons/".into(), "assets/logo.png".into()]);
//!
//! assert!(manifest.is_bundled("assets/icons/add.png"));
//! assert!(manifest.is_bundled("assets/logo.png"));
//! assert!(!manifest.is_bundled("assets/logo.png.bak"));
//! ```

use serde::{Deserialize, Serialize};

/// The literal asset declarations of one package.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    patterns: Vec<String>,
}

impl AssetManifest {
    /// Wraps the declared patterns without normalizing or deduplicating them.
    #[must_use]
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// Returns the declared patterns in manifest order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns `true` if no asset is declared.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns `true` if `relative_path` (relative to the package directory,
    /// `/`-separated) is covered by at least one declared pattern.
    #[must_use]
    pub fn is_bundled(&self, relative_path: &str) -> bool {
        is_bundled(&self.patterns, relative_path)
    }
}

/// Returns `true` if any of `patterns` matches `relative_path`.
///
/// Comparison is byte-exact: no case folding, no `.`/`..` resolution.
#[must_use]
pub fn is_bundled<S: AsRef<str>>(patterns: &[S], relative_path: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| pattern_matches(pattern.as_ref(), relative_path))
}

fn pattern_matches(pattern: &str, relative_path: &str) -> bool {
    if pattern.ends_with('/') {
        return relative_path.starts_with(pattern);
    }

    match relative_path.strip_prefix(pattern) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}
