// SPDX-License-Identifier: MPL-2.0
//! `pubspec.yaml` parsing.
//!
//! Only two pieces of a Flutter manifest matter to the gallery: the package
//! `name` and the asset declarations under `flutter.assets`. The document is
//! parsed into a dynamic YAML value and each of these fields is extracted
//! explicitly, so that an unexpected shape in an unrelated section (or a
//! non-string entry in the asset list) never rejects the whole manifest.

pub mod assets;

pub use assets::{is_bundled, AssetManifest};

use crate::error::{ManifestError, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// File name identifying a Flutter package directory.
pub const MANIFEST_FILE_NAME: &str = "pubspec.yaml";

/// The parts of a `pubspec.yaml` the gallery cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pubspec {
    pub name: String,
    pub assets: AssetManifest,
}

impl Pubspec {
    /// Reads and parses the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Io`] if the file cannot be read and
    /// [`crate::error::Error::Manifest`] if its content is rejected by
    /// [`parse_pubspec`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(parse_pubspec(&text)?)
    }
}

/// Parses manifest text.
///
/// # Errors
///
/// - [`ManifestError::Malformed`] if the text is not YAML or its top level is
///   a scalar or a sequence.
/// - [`ManifestError::MissingName`] if the document is empty or has no string
///   `name`.
pub fn parse_pubspec(text: &str) -> std::result::Result<Pubspec, ManifestError> {
    let document: Value = serde_yaml::from_str(text)?;

    let root = match document {
        Value::Mapping(map) => map,
        Value::Null => return Err(ManifestError::MissingName),
        other => {
            return Err(ManifestError::Malformed(format!(
                "expected a mapping at the top level, found {}",
                kind_of(&other)
            )))
        }
    };

    let name = root
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ManifestError::MissingName)?
        .to_string();

    Ok(Pubspec {
        name,
        assets: AssetManifest::new(asset_patterns(&root)),
    })
}

/// Extracts `flutter.assets` as strings, dropping anything else.
fn asset_patterns(root: &Mapping) -> Vec<String> {
    root.get("flutter")
        .and_then(Value::as_mapping)
        .and_then(|flutter| flutter.get("assets"))
        .and_then(Value::as_sequence)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
