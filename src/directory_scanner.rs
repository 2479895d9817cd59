// SPDX-License-Identifier: MPL-2.0
//! Directory scanner module for finding image assets inside a package.
//!
//! This module walks a directory recursively, prunes excluded subtrees,
//! keeps files with a supported image extension and sorts them by file name.
//! The same pruning rule is shared with [`crate::package_discovery`].

use crate::config::DEFAULT_EXCLUDED_FRAGMENTS;
use crate::media;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Substrings whose presence in a path prunes that subtree from traversal.
///
/// Matching is plain substring containment on the `/`-separated path string,
/// not path-segment aware: `/build/` excludes `pkg/build/x.png` but not
/// `pkg/build_tools/x.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedPaths {
    fragments: Vec<String>,
}

impl ExcludedPaths {
    /// Creates a rule set from the given fragments.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    /// A rule set that excludes nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Returns the configured fragments.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Returns `true` if `path` contains any excluded fragment.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.fragments
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }

    /// Walker predicate: directories are tested with a trailing `/` so the
    /// directory node itself is pruned, not only its children.
    fn allows(&self, entry: &DirEntry) -> bool {
        let mut path = slash_path(entry.path());
        if entry.file_type().is_dir() && !path.ends_with('/') {
            path.push('/');
        }
        !self.is_excluded(&path)
    }
}

impl Default for ExcludedPaths {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_FRAGMENTS.iter().copied())
    }
}

/// An image file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name including extension.
    pub name: String,
    /// Extension as written on disk (not lowercased).
    pub extension: String,
    /// Path relative to the scanned directory, `/`-separated.
    pub relative_path: String,
}

impl ImageFile {
    fn from_entry(entry: &DirEntry, root: &Path) -> Option<Self> {
        let path = entry.path();
        let extension = path.extension()?.to_str()?;
        if !media::is_image_extension(extension) {
            return None;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);

        Some(Self {
            path: path.to_path_buf(),
            name: entry.file_name().to_string_lossy().into_owned(),
            extension: extension.to_string(),
            relative_path: slash_path(relative),
        })
    }

    /// Returns `true` if the file goes through the vector (SVG) decode path.
    pub fn is_vector(&self) -> bool {
        self.extension.eq_ignore_ascii_case("svg")
    }
}

/// Recursively collects the image files under `directory`.
///
/// Excluded subtrees are not descended into and unreadable nodes are skipped.
/// The result is sorted by file name (case-sensitive, stable).
pub fn collect_images(directory: &Path, excluded: &ExcludedPaths) -> Vec<ImageFile> {
    let mut images: Vec<ImageFile> = walk_files(directory, excluded)
        .filter_map(|entry| ImageFile::from_entry(&entry, directory))
        .collect();

    images.sort_by(|a, b| a.name.cmp(&b.name));
    images
}

/// Iterates over every regular file under `root` that survives pruning.
///
/// Entries are visited in file-name order so repeated walks agree. Symlinks
/// to files are kept; symlinked directories are not descended into.
pub(crate) fn walk_files<'a>(
    root: &Path,
    excluded: &'a ExcludedPaths,
) -> impl Iterator<Item = DirEntry> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| excluded.allows(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable node");
                None
            }
        })
        .filter(is_file_or_file_link)
}

fn is_file_or_file_link(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

/// Renders a path with `/` separators on every platform.
pub(crate) fn slash_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
