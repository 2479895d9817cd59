// SPDX-License-Identifier: MPL-2.0
//! Image decoding and thumbnail generation for gallery items.

pub mod image;
pub mod thumbnail;

pub use extensions::IMAGE_EXTENSIONS;
pub use image::ImageData;
pub use thumbnail::{load_thumbnail, SvgScale, Thumbnail, ThumbnailLoader};

use std::path::Path;

/// Supported asset extensions
pub mod extensions {
    /// Image file extensions listed by the gallery (compared case-insensitively).
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "svg"];

    /// Extensions decoded through the vector path.
    pub const VECTOR_EXTENSIONS: &[&str] = &["svg"];
}

/// How a file is turned into pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Raster,
    Vector,
}

/// Returns `true` if `extension` (without the dot) is a listed image type.
pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Detects the decode path for a file from its extension.
///
/// Returns `None` for files the gallery does not list.
pub fn detect_image_kind<P: AsRef<Path>>(path: P) -> Option<ImageKind> {
    let extension = path.as_ref().extension()?.to_str()?;
    if !is_image_extension(extension) {
        return None;
    }

    if extensions::VECTOR_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
    {
        Some(ImageKind::Vector)
    } else {
        Some(ImageKind::Raster)
    }
}
