// SPDX-License-Identifier: MPL-2.0
//! Search filtering over the cached image list.
//!
//! Criteria are combined with AND logic: a file is shown when it matches the
//! search text *and*, if the bundled-only flag is set, is declared as an asset
//! in the package manifest. Filtering is pure; it never touches the disk.
//!
//! # Example
//!
//! ```
//! use flutter_asset_gallery::gallery::SearchState;
//!
//! let search = SearchState {
//!     query: "  Logo ".to_string(),
//!     bundled_only: false,
//! };
//!
//! assert_eq!(search.normalized_query(), "logo");
//! assert!(search.is_active());
//! ```

use crate::directory_scanner::ImageFile;
use crate::manifest::AssetManifest;
use std::fmt;

/// The user's current search input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchState {
    /// Raw search text as typed.
    pub query: String,
    /// Show only files declared under `flutter.assets`.
    pub bundled_only: bool,
}

impl SearchState {
    /// Search text trimmed and lowercased, as used for matching.
    #[must_use]
    pub fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }

    /// Returns `true` if any criterion narrows the list.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.bundled_only || !self.query.trim().is_empty()
    }

    /// Returns the files matching every active criterion, in input order.
    #[must_use]
    pub fn apply(&self, files: &[ImageFile], assets: &AssetManifest) -> Vec<ImageFile> {
        let query = self.normalized_query();
        files
            .iter()
            .filter(|file| matches_query(file, &query))
            .filter(|file| !self.bundled_only || assets.is_bundled(&file.relative_path))
            .cloned()
            .collect()
    }

    /// Explains an empty result for this search.
    #[must_use]
    pub fn empty_reason(&self) -> EmptyReason {
        match (self.query.trim().is_empty(), self.bundled_only) {
            (true, true) => EmptyReason::NoBundledImages,
            (true, false) => EmptyReason::NoImages,
            (false, _) => EmptyReason::NoMatches,
        }
    }
}

/// Case-insensitive containment in the name or the relative path.
///
/// `query` must already be normalized.
fn matches_query(file: &ImageFile, query: &str) -> bool {
    query.is_empty()
        || file.name.to_lowercase().contains(query)
        || file.relative_path.to_lowercase().contains(query)
}

/// Why a filter pass produced nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The package has no image files at all.
    NoImages,
    /// No image file is declared in the manifest.
    NoBundledImages,
    /// The search text matched nothing.
    NoMatches,
}

impl EmptyReason {
    /// Message shown in place of the list.
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::NoImages => "No images found",
            EmptyReason::NoBundledImages => "No bundled images found in pubspec.yaml",
            EmptyReason::NoMatches => "No matching images found",
        }
    }
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn image(relative_path: &str) -> ImageFile {
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path)
            .to_string();
        let extension = name.rsplit('.').next().unwrap_or_default().to_string();
        ImageFile {
            path: PathBuf::from("/pkg").join(relative_path),
            name,
            extension,
            relative_path: relative_path.to_string(),
        }
    }

    fn files() -> Vec<ImageFile> {
        vec![
            image("assets/icons/cat.png"),
            image("assets/Category/dog.png"),
            image("assets/logo.svg"),
            image("test/fixtures/cat_fixture.png"),
        ]
    }

    fn paths(files: &[ImageFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    #[test]
    fn empty_search_keeps_everything() {
        let search = SearchState::default();
        assert!(!search.is_active());
        assert_eq!(search.apply(&files(), &AssetManifest::default()).len(), 4);
    }

    #[test]
    fn query_matches_name_or_relative_path_case_insensitively() {
        let search = SearchState {
            query: " CAT ".to_string(),
            bundled_only: false,
        };
        let result = search.apply(&files(), &AssetManifest::default());
        assert_eq!(
            paths(&result),
            vec![
                "assets/icons/cat.png",
                "assets/Category/dog.png",
                "test/fixtures/cat_fixture.png"
            ]
        );
    }

    #[test]
    fn bundled_only_uses_manifest_patterns() {
        let search = SearchState {
            query: String::new(),
            bundled_only: true,
        };
        let assets = AssetManifest::new(vec!["assets/icons/".into(), "assets/logo.svg".into()]);
        let result = search.apply(&files(), &assets);
        assert_eq!(paths(&result), vec!["assets/icons/cat.png", "assets/logo.svg"]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let search = SearchState {
            query: "cat".to_string(),
            bundled_only: true,
        };
        let assets = AssetManifest::new(vec!["assets/".into()]);
        let result = search.apply(&files(), &assets);
        assert_eq!(
            paths(&result),
            vec!["assets/icons/cat.png", "assets/Category/dog.png"]
        );
    }

    #[test]
    fn bundled_only_without_declarations_shows_nothing() {
        let search = SearchState {
            query: String::new(),
            bundled_only: true,
        };
        assert!(search.apply(&files(), &AssetManifest::default()).is_empty());
        assert_eq!(search.empty_reason(), EmptyReason::NoBundledImages);
    }

    #[test]
    fn empty_reason_follows_search_state() {
        assert_eq!(SearchState::default().empty_reason(), EmptyReason::NoImages);
        let search = SearchState {
            query: "zebra".into(),
            bundled_only: true,
        };
        assert_eq!(search.empty_reason(), EmptyReason::NoMatches);
        assert_eq!(search.empty_reason().to_string(), "No matching images found");
    }
}
