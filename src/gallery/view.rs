// SPDX-License-Identifier: MPL-2.0
//! A host-side model of the thumbnail list, built from [`GalleryEvent`]s.

use super::{EmptyReason, GalleryEvent, GalleryItem};

/// What the list area shows besides the items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    Blank,
    /// A scan is running; show a busy indicator.
    Loading,
    /// Items are displayed.
    Items,
    /// Nothing to show, with the reason.
    Empty(EmptyReason),
    /// A pass failed.
    Error(String),
}

/// Displayed items in publication order.
#[derive(Debug, Clone, Default)]
pub struct GalleryView {
    items: Vec<GalleryItem>,
    status: ViewStatus,
    query: Option<String>,
}

impl GalleryView {
    /// Applies one event.
    pub fn apply(&mut self, event: GalleryEvent) {
        match event {
            GalleryEvent::Cleared => {
                self.items.clear();
                self.status = ViewStatus::Blank;
            }
            GalleryEvent::Loading => self.status = ViewStatus::Loading,
            GalleryEvent::Filtered { query, .. } => self.query = Some(query),
            GalleryEvent::ItemsAdded(items) => {
                self.items.extend(items);
                self.status = ViewStatus::Items;
            }
            GalleryEvent::Empty(reason) => self.status = ViewStatus::Empty(reason),
            GalleryEvent::Error(message) => {
                self.items.clear();
                self.status = ViewStatus::Error(message);
            }
            GalleryEvent::Finished { .. } => {}
        }
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    /// Normalized query of the last filter pass.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Text to show in place of the list, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.status {
            ViewStatus::Empty(reason) => Some(reason.message()),
            ViewStatus::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
