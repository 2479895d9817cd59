// SPDX-License-Identifier: MPL-2.0
//! Raster and SVG decoding into RGBA bitmaps.

use crate::config::MAX_SVG_PIXMAP_BYTES;
use crate::error::{Error, Result};
use iced::widget::image;
use image_rs::{DynamicImage, GenericImageView};
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

/// A decoded bitmap ready for display.
///
/// The pixels live only inside the render handle; dropping the last clone
/// releases them.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub handle: image::Handle,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    /// Creates a new `ImageData` from straight RGBA pixels.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            handle: image::Handle::from_rgba(width, height, pixels),
            width,
            height,
        }
    }

    /// Converts a decoded raster image.
    #[must_use]
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let (width, height) = img.dimensions();
        Self::from_rgba(width, height, img.to_rgba8().into_vec())
    }

    /// Converts a rendered pixmap, undoing tiny-skia's premultiplied alpha.
    #[must_use]
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let mut pixels = Vec::with_capacity(pixmap.data().len());
        for pixel in pixmap.pixels() {
            let color = pixel.demultiply();
            pixels.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        Self::from_rgba(pixmap.width(), pixmap.height(), pixels)
    }

    /// Straight (non-premultiplied) RGBA bytes held by the handle.
    pub fn rgba_bytes(&self) -> &[u8] {
        match &self.handle {
            image::Handle::Rgba { pixels, .. } => &pixels[..],
            _ => &[],
        }
    }
}

/// Decodes a raster image (PNG, JPEG, GIF, BMP) from memory.
///
/// # Errors
///
/// Returns [`Error::Image`] if the bytes are not a supported raster format, or
/// if the decoded image has a zero dimension.
pub fn decode_raster(bytes: &[u8]) -> Result<DynamicImage> {
    let img = image_rs::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::Image("Image has empty dimensions".into()));
    }
    Ok(img)
}

/// A parsed SVG document with a known intrinsic pixel size.
pub struct SvgDocument {
    tree: usvg::Tree,
    width: u32,
    height: u32,
}

impl SvgDocument {
    /// Parses SVG source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Svg`] if parsing fails or the intrinsic size is empty.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
            .map_err(|e| Error::Svg(e.to_string()))?;

        let size = tree.size().to_int_size();
        let (width, height) = (size.width(), size.height());
        if width == 0 || height == 0 {
            return Err(Error::Svg("SVG has empty dimensions".into()));
        }

        Ok(Self {
            tree,
            width,
            height,
        })
    }

    /// Intrinsic size in pixels, rounded up.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Rasterizes the document into a `width × height` bitmap, stretching the
    /// intrinsic size onto it. Rendering at [`Self::size`] is a 1:1 render.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Svg`] if the pixmap would exceed
    /// [`MAX_SVG_PIXMAP_BYTES`] or cannot be allocated.
    pub fn render(&self, width: u32, height: u32) -> Result<ImageData> {
        let bytes = u64::from(width) * u64::from(height) * 4;
        if bytes > MAX_SVG_PIXMAP_BYTES {
            return Err(Error::Svg(format!(
                "SVG render size {width}x{height} exceeds the pixmap limit"
            )));
        }

        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::Svg("Failed to allocate SVG pixmap".into()))?;

        let transform = if (width, height) == self.size() {
            Transform::default()
        } else {
            let intrinsic = self.tree.size();
            Transform::from_scale(
                width as f32 / intrinsic.width(),
                height as f32 / intrinsic.height(),
            )
        };

        resvg::render(&self.tree, transform, &mut pixmap.as_mut());

        Ok(ImageData::from_pixmap(&pixmap))
    }
}
