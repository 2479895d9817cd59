// SPDX-License-Identifier: MPL-2.0
//! Flutter package discovery.
//!
//! Walks the project roots looking for `pubspec.yaml` files and turns each
//! parseable manifest into a [`Package`]. Manifests that cannot be read or
//! parsed are skipped silently: a half-written `pubspec.yaml` in one package
//! must not hide the others.

use crate::directory_scanner::{walk_files, ExcludedPaths};
use crate::manifest::{AssetManifest, Pubspec, MANIFEST_FILE_NAME};
use std::path::{Path, PathBuf};

/// A Flutter package found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package name from the manifest.
    pub name: String,
    /// Directory containing the manifest.
    pub directory: PathBuf,
    /// Path of the `pubspec.yaml` itself.
    pub manifest_file: PathBuf,
    /// Declared asset patterns.
    pub bundled_assets: AssetManifest,
}

impl Package {
    /// Builds a package from the manifest at `manifest_file`.
    ///
    /// Returns `None` if the manifest cannot be read or parsed, or has no
    /// parent directory.
    pub fn from_manifest(manifest_file: &Path) -> Option<Self> {
        let directory = manifest_file.parent()?.to_path_buf();

        match Pubspec::from_path(manifest_file) {
            Ok(pubspec) => Some(Self {
                name: pubspec.name,
                directory,
                manifest_file: manifest_file.to_path_buf(),
                bundled_assets: pubspec.assets,
            }),
            Err(err) => {
                tracing::debug!(
                    manifest = %manifest_file.display(),
                    error = %err,
                    "skipping package"
                );
                None
            }
        }
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Discovers every package under `roots`.
///
/// The result is stable-sorted by name (case-sensitive), so packages sharing a
/// name keep the order in which they were encountered.
pub fn discover_packages<P: AsRef<Path>>(roots: &[P], excluded: &ExcludedPaths) -> Vec<Package> {
    let mut packages: Vec<Package> = roots
        .iter()
        .flat_map(|root| walk_files(root.as_ref(), excluded))
        .filter(|entry| entry.file_name() == MANIFEST_FILE_NAME)
        .filter_map(|entry| Package::from_manifest(entry.path()))
        .collect();

    packages.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::info!(count = packages.len(), "discovered flutter packages");
    packages
}
