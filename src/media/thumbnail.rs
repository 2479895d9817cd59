// SPDX-License-Identifier: MPL-2.0
//! Thumbnail generation.
//!
//! [`ThumbnailLoader::load`] never fails: when a file cannot be read or
//! decoded it returns a [`Thumbnail::Placeholder`] of the requested box size so
//! that one broken asset never aborts a batch.
//!
//! # Scaling
//!
//! Raster images are fitted into the box preserving their aspect ratio and are
//! never enlarged. SVG files follow [`SvgScale`]: by default they render at
//! their intrinsic size, as the gallery always has; `Fit` applies the raster
//! rule to the intrinsic size instead.

use crate::error::Result;
use crate::media::image::{decode_raster, ImageData, SvgDocument};
use crate::media::{detect_image_kind, ImageKind};
use image_rs::imageops::FilterType;
use image_rs::GenericImageView;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Marker carried by placeholder thumbnails.
pub const PLACEHOLDER_MESSAGE: &str = "Error loading image";

/// How SVG files are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SvgScale {
    /// Render at the document's intrinsic size (scale factor 1.0).
    #[default]
    Native,
    /// Fit the intrinsic size into the thumbnail box, never enlarging.
    Fit,
}

/// A thumbnail ready for the view.
#[derive(Debug, Clone)]
pub enum Thumbnail {
    /// The file decoded successfully.
    Decoded(ImageData),
    /// The file could not be decoded; `image` is a generated box-sized tile.
    Placeholder {
        image: ImageData,
        message: &'static str,
    },
}

impl Thumbnail {
    /// The bitmap to draw, whichever variant this is.
    pub fn image(&self) -> &ImageData {
        match self {
            Thumbnail::Decoded(image) => image,
            Thumbnail::Placeholder { image, .. } => image,
        }
    }

    /// Returns `true` for placeholders.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Thumbnail::Placeholder { .. })
    }
}

/// Produces thumbnails fitted into a `max_width × max_height` box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailLoader {
    max_width: u32,
    max_height: u32,
    svg_scale: SvgScale,
}

impl ThumbnailLoader {
    #[must_use]
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            svg_scale: SvgScale::default(),
        }
    }

    /// Sets how SVG files are sized.
    #[must_use]
    pub fn with_svg_scale(mut self, svg_scale: SvgScale) -> Self {
        self.svg_scale = svg_scale;
        self
    }

    /// Loads a thumbnail for `path`, falling back to a placeholder.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Thumbnail {
        let path = path.as_ref();
        match self.try_load(path) {
            Ok(image) => Thumbnail::Decoded(image),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "thumbnail decode failed");
                Thumbnail::Placeholder {
                    image: placeholder_image(self.max_width, self.max_height),
                    message: PLACEHOLDER_MESSAGE,
                }
            }
        }
    }

    fn try_load(&self, path: &Path) -> Result<ImageData> {
        let bytes = fs::read(path)?;
        match detect_image_kind(path) {
            Some(ImageKind::Vector) => self.load_vector(&bytes),
            Some(ImageKind::Raster) | None => self.load_raster(&bytes),
        }
    }

    fn load_vector(&self, bytes: &[u8]) -> Result<ImageData> {
        let document = SvgDocument::parse(bytes)?;
        let (width, height) = document.size();
        let (width, height) = match self.svg_scale {
            SvgScale::Native => (width, height),
            SvgScale::Fit => target_size(width, height, self.max_width, self.max_height),
        };
        document.render(width, height)
    }

    fn load_raster(&self, bytes: &[u8]) -> Result<ImageData> {
        let img = decode_raster(bytes)?;
        let (original_width, original_height) = img.dimensions();
        let (width, height) =
            target_size(original_width, original_height, self.max_width, self.max_height);
        if (width, height) == (original_width, original_height) {
            return Ok(ImageData::from_dynamic(&img));
        }
        let scaled = img.resize_exact(width, height, FilterType::Lanczos3);
        Ok(ImageData::from_dynamic(&scaled))
    }
}

/// Loads a thumbnail with the default SVG policy.
pub fn load_thumbnail<P: AsRef<Path>>(path: P, max_width: u32, max_height: u32) -> Thumbnail {
    ThumbnailLoader::new(max_width, max_height).load(path)
}

/// Computes the size of an image fitted into a box.
///
/// - A zero source dimension yields the box itself.
/// - A source that already fits is returned unchanged (no upscaling).
/// - Otherwise both sides are multiplied by
///   `min(max_width / width, max_height / height)` and rounded, with a floor
///   of one pixel.
#[must_use]
pub fn target_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max_width, max_height);
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let width_ratio = f64::from(max_width) / f64::from(width);
    let height_ratio = f64::from(max_height) / f64::from(height);
    let ratio = width_ratio.min(height_ratio);

    let scaled = |side: u32| ((f64::from(side) * ratio).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Draws the error tile: a light square with a red frame and cross.
fn placeholder_image(width: u32, height: u32) -> ImageData {
    let (width, height) = (width.max(1), height.max(1));
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return ImageData::from_rgba(width, height, vec![0; (width * height * 4) as usize]);
    };
    pixmap.fill(Color::from_rgba8(240, 240, 240, 255));

    let (w, h) = (width as f32, height as f32);
    let inset = 1.0;
    let mut builder = PathBuilder::new();
    builder.move_to(inset, inset);
    builder.line_to(w - inset, inset);
    builder.line_to(w - inset, h - inset);
    builder.line_to(inset, h - inset);
    builder.close();
    builder.move_to(inset, inset);
    builder.line_to(w - inset, h - inset);
    builder.move_to(w - inset, inset);
    builder.line_to(inset, h - inset);

    if let Some(path) = builder.finish() {
        let mut paint = Paint::default();
        paint.set_color_rgba8(200, 40, 40, 255);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    ImageData::from_pixmap(&pixmap)
}
