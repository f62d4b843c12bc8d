//! Adjacent preloader.
//!
//! Preloading fetches only what the first paint of a page needs, so it runs
//! over every neighbor rather than a bounded window.

use crate::AdjacentResources;
use scrollcast_core::PageId;
use tracing::debug;

/// Preloads the neighbors of the current page once per change of position.
pub struct AdjacentPreloader<G> {
    adjacent: G,
    last_position: Option<PageId>,
}

impl<G: AdjacentResources> AdjacentPreloader<G> {
    /// Create a preloader over the given neighbor lookup.
    pub fn new(adjacent: G) -> Self {
        Self {
            adjacent,
            last_position: None,
        }
    }

    /// Preload the neighbors of `position` in lookup order.
    ///
    /// Returns the number of pages preloaded. Repeated calls for the same
    /// position preload nothing.
    pub fn preload(&mut self, position: PageId) -> usize {
        if self.last_position == Some(position) {
            return 0;
        }
        self.last_position = Some(position);

        let neighbors = self.adjacent.neighbors_of(position);
        for resource in &neighbors {
            resource.preload();
        }

        debug!(%position, count = neighbors.len(), "Preloaded adjacent pages");
        neighbors.len()
    }

    /// Position of the most recent preload.
    pub fn last_position(&self) -> Option<PageId> {
        self.last_position
    }
}
