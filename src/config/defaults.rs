// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the crate. Constants are organized by category.
//!
//! # Categories
//!
//! - **Scan**: Path fragments pruned from every traversal
//! - **Thumbnails**: Thumbnail box size, batch size and SVG pixmap limit
//! - **Search**: Debounce window for search input

// ==========================================================================
// Scan Defaults
// ==========================================================================

/// Path fragments whose presence in a path prunes that subtree.
///
/// Build outputs, the iOS native subproject and the plugin symlink farm that
/// `flutter pub get` creates all contain copies of package files.
pub const DEFAULT_EXCLUDED_FRAGMENTS: &[&str] = &["/build/", "/ios/", "/.plugin_symlinks/"];

// ==========================================================================
// Thumbnail Defaults
// ==========================================================================

/// Default thumbnail box edge in pixels (thumbnails are fitted into a square).
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 60;

/// Minimum thumbnail box edge.
pub const MIN_THUMBNAIL_SIZE: u32 = 16;

/// Maximum thumbnail box edge.
pub const MAX_THUMBNAIL_SIZE: u32 = 512;

/// Largest SVG pixmap the thumbnail loader will allocate, in bytes (RGBA).
///
/// Matches the `image` crate's default decoder allocation limit, so both
/// decode paths refuse the same sizes.
pub const MAX_SVG_PIXMAP_BYTES: u64 = 512 * 1024 * 1024;

/// Number of thumbnails decoded concurrently and published together.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Minimum batch size.
pub const MIN_BATCH_SIZE: usize = 1;

/// Maximum batch size.
pub const MAX_BATCH_SIZE: usize = 64;

// ==========================================================================
// Search Defaults
// ==========================================================================

/// Delay after the last keystroke before the search filter runs (in milliseconds).
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Maximum search debounce (in milliseconds). Zero disables debouncing.
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(MIN_THUMBNAIL_SIZE > 0);
    assert!(MAX_THUMBNAIL_SIZE >= MIN_THUMBNAIL_SIZE);
    assert!(DEFAULT_THUMBNAIL_SIZE >= MIN_THUMBNAIL_SIZE);
    assert!(DEFAULT_THUMBNAIL_SIZE <= MAX_THUMBNAIL_SIZE);

    assert!(MIN_BATCH_SIZE > 0);
    assert!(MAX_BATCH_SIZE >= MIN_BATCH_SIZE);
    assert!(DEFAULT_BATCH_SIZE >= MIN_BATCH_SIZE);
    assert!(DEFAULT_BATCH_SIZE <= MAX_BATCH_SIZE);

    assert!(DEFAULT_SEARCH_DEBOUNCE_MS <= MAX_SEARCH_DEBOUNCE_MS);
    assert!(
        (MAX_THUMBNAIL_SIZE as u64) * (MAX_THUMBNAIL_SIZE as u64) * 4 <= MAX_SVG_PIXMAP_BYTES
    );
};
