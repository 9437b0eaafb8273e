//! Self-healing image carousel.
//!
//! Used for post and event galleries, yearbook page sets and the chat image
//! preview. A reference that fails to load is removed with
//! [`ImageCarousel::report_broken`]; the carousel closes once nothing is left.

use crate::models::MediaResolver;

/// Navigable sequence of image references.
///
/// `index < images.len()` holds whenever `images` is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCarousel {
    images: Vec<String>,
    index: usize,
}

impl ImageCarousel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the sequence and move to `start_index`, clamped into range.
    pub fn set_source(&mut self, images: Vec<String>, start_index: usize) {
        self.index = start_index.min(images.len().saturating_sub(1));
        self.images = images;
        tracing::debug!(
            "Carousel loaded {} image(s) at index {}",
            self.images.len(),
            self.index
        );
    }

    pub fn is_open(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Current index, or `None` when closed.
    pub fn current_index(&self) -> Option<usize> {
        self.is_open().then_some(self.index)
    }

    /// Reference at the current index.
    pub fn current(&self) -> Option<&str> {
        self.images.get(self.index).map(String::as_str)
    }

    /// Current reference resolved for rendering.
    pub fn current_resolved(&self, resolver: &MediaResolver) -> Option<String> {
        self.current().map(|r| resolver.resolve(r))
    }

    /// 1-based position and total, e.g. `(2, 5)` for "2 / 5".
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current_index().map(|i| (i + 1, self.images.len()))
    }

    /// Move forward, wrapping from the last image to the first.
    pub fn next(&mut self) {
        let len = self.images.len();
        if len > 1 {
            self.index = (self.index + 1) % len;
        }
    }

    /// Move back, wrapping from the first image to the last.
    pub fn prev(&mut self) {
        let len = self.images.len();
        if len > 1 {
            self.index = (self.index + len - 1) % len;
        }
    }

    /// Drop the reference at `index` after it failed to load.
    ///
    /// Keeps the viewer on the same image when an earlier one is removed,
    /// and on the following one when the current image is removed.
    pub fn report_broken(&mut self, index: usize) {
        if index >= self.images.len() {
            return;
        }

        let removed = self.images.remove(index);
        tracing::debug!("Removed broken image {}", removed);

        if self.images.is_empty() {
            self.index = 0;
            tracing::debug!("Carousel closed: no images left");
            return;
        }

        if index < self.index {
            self.index -= 1;
        }
        self.index = self.index.min(self.images.len() - 1);
    }

    pub fn close(&mut self) {
        self.images.clear();
        self.index = 0;
    }
}
