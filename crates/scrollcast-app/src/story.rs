//! A linear story used to drive the walkthrough.

use scrollcast_core::{MediaId, PageId};
use scrollcast_prefetch::{AdjacentResources, Resource};
use std::sync::Arc;
use tracing::{debug, info};

/// A page that logs what is done to it.
pub struct StoryPage {
    id: PageId,
    background_audio: Option<MediaId>,
}

impl StoryPage {
    pub fn background_audio(&self) -> Option<MediaId> {
        self.background_audio
    }
}

impl Resource for StoryPage {
    fn id(&self) -> PageId {
        self.id
    }

    fn prepare(&self) {
        info!(page = %self.id, "Prepare");
    }

    fn unprepare(&self) {
        info!(page = %self.id, "Unprepare");
    }

    fn preload(&self) {
        debug!(page = %self.id, "Preload");
    }
}

/// Pages in reading order. Cloning shares the pages.
#[derive(Clone)]
pub struct Story {
    pages: Arc<Vec<Arc<StoryPage>>>,
}

impl Story {
    /// `len` pages where every run of `pages_per_track` pages shares one
    /// background track.
    pub fn linear(len: u64, pages_per_track: u64) -> Self {
        let pages_per_track = pages_per_track.max(1);
        let pages = (0..len)
            .map(|i| {
                Arc::new(StoryPage {
                    id: PageId(i),
                    background_audio: Some(MediaId(i / pages_per_track + 1)),
                })
            })
            .collect();
        Self {
            pages: Arc::new(pages),
        }
    }

    pub fn pages(&self) -> &[Arc<StoryPage>] {
        &self.pages
    }

    fn index_of(&self, position: PageId) -> Option<usize> {
        usize::try_from(position.0)
            .ok()
            .filter(|&i| i < self.pages.len())
    }
}

impl AdjacentResources for Story {
    /// Following and preceding pages, alternating, nearest first.
    fn neighbors_of(&self, position: PageId) -> Vec<Arc<dyn Resource>> {
        let Some(index) = self.index_of(position) else {
            return Vec::new();
        };

        let mut neighbors: Vec<Arc<dyn Resource>> = Vec::with_capacity(self.pages.len());
        for distance in 1..self.pages.len() {
            if let Some(page) = self.pages.get(index + distance) {
                neighbors.push(Arc::clone(page) as Arc<dyn Resource>);
            }
            if let Some(page) = index.checked_sub(distance).and_then(|i| self.pages.get(i)) {
                neighbors.push(Arc::clone(page) as Arc<dyn Resource>);
            }
        }
        neighbors
    }
}
