//! Scrollcast Prefetch - Warming up the pages around the viewer
//!
//! As the viewer scrolls through a story, the pages near the current one are
//! prepared ahead of time and released once they drift out of reach.
//!
//! Architecture:
//! - `Resource`: A page that can be prepared, unprepared and preloaded
//! - `AdjacentResources`: Graph lookup returning the neighbors of a page, nearest first
//! - `AdjacentPreparer`: Keeps a bounded window of neighbors prepared
//! - `AdjacentPreloader`: Preloads neighbors once per change of position

pub mod preloader;
pub mod preparer;

pub use preloader::AdjacentPreloader;
pub use preparer::{AdjacentPreparer, PrepareLimit};

use scrollcast_core::PageId;
use std::sync::Arc;

/// A page whose assets can be warmed up ahead of display.
///
/// Identity is the page id: two handles with the same id are the same page.
pub trait Resource: Send + Sync {
    /// Identity of this page.
    fn id(&self) -> PageId;

    /// Start warming up (e.g. begin loading media).
    fn prepare(&self);

    /// Release whatever `prepare` acquired.
    fn unprepare(&self);

    /// Fetch assets needed for the first paint.
    fn preload(&self);
}

/// Neighbor lookup in the story graph.
pub trait AdjacentResources: Send + Sync {
    /// Neighbors of `position`, nearest first.
    ///
    /// Unknown positions have no neighbors.
    fn neighbors_of(&self, position: PageId) -> Vec<Arc<dyn Resource>>;
}

impl<F> AdjacentResources for F
where
    F: Fn(PageId) -> Vec<Arc<dyn Resource>> + Send + Sync,
{
    fn neighbors_of(&self, position: PageId) -> Vec<Arc<dyn Resource>> {
        self(position)
    }
}
