// SPDX-License-Identifier: MPL-2.0
//! `flutter_asset_gallery` browses the image assets of Flutter packages.
//!
//! It discovers packages by their `pubspec.yaml`, lists every image file in a
//! package, decodes thumbnails in the background and filters them by name or
//! by whether the manifest bundles them. Hosts drive a
//! [`gallery::GalleryController`] and render the events it publishes.

pub mod config;
pub mod directory_scanner;
pub mod error;
pub mod gallery;
pub mod manifest;
pub mod media;
pub mod package_discovery;
