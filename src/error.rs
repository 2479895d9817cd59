// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Io(String),
    Svg(String),
    Image(String),
    Config(String),
    Manifest(ManifestError),
}

/// Reasons a `pubspec.yaml` could not be turned into a package.
///
/// These never reach the user: package discovery treats them as
/// "skip this package".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// The document is not valid YAML, or its top level is not a mapping.
    Malformed(String),

    /// The document has no string `name` key.
    MissingName,
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestError::Malformed(reason) => write!(f, "Malformed manifest: {}", reason),
            ManifestError::MissingName => write!(f, "Manifest has no package name"),
        }
    }
}

impl std::error::Error for ManifestError {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Svg(e) => write!(f, "SVG Error: {}", e),
            Error::Image(e) => write!(f, "Image Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Manifest(e) => write!(f, "Manifest Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<ManifestError> for Error {
    fn from(err: ManifestError) -> Self {
        Error::Manifest(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<serde_yaml::Error> for ManifestError {
    fn from(err: serde_yaml::Error) -> Self {
        ManifestError::Malformed(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
