//! Adjacent preparer: keeps a bounded window of neighboring pages prepared.
//!
//! Each call reconciles the new window against the pages prepared by the
//! previous call: pages entering the window are prepared, pages leaving it
//! are unprepared, and pages staying in it are left alone.

use crate::{AdjacentResources, Resource};
use scrollcast_core::prefetch_budget::{
    DEFAULT_MAX_PREPARED_ADJACENT_PAGES, MAX_PREPARED_ADJACENT_PAGES_KEY,
};
use scrollcast_core::{PageId, SettingsStore};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

type PreparedPages = SmallVec<[Arc<dyn Resource>; DEFAULT_MAX_PREPARED_ADJACENT_PAGES]>;

/// Maximum number of neighbors kept prepared.
///
/// Resolved once at construction. Only debug mode consults the settings
/// store, and it does so on every call so that changed settings apply to the
/// next reconciliation.
#[derive(Clone)]
pub enum PrepareLimit {
    /// Fixed window size.
    Fixed(usize),
    /// Window size read from the settings store, falling back to `default`.
    Overridable {
        default: usize,
        settings: Arc<dyn SettingsStore>,
    },
}

impl PrepareLimit {
    /// Choose the limit source for the given construction parameters.
    pub fn resolve(settings: Option<Arc<dyn SettingsStore>>, debug_mode: bool) -> Self {
        match settings {
            Some(settings) if debug_mode => Self::Overridable {
                default: DEFAULT_MAX_PREPARED_ADJACENT_PAGES,
                settings,
            },
            _ => Self::Fixed(DEFAULT_MAX_PREPARED_ADJACENT_PAGES),
        }
    }

    /// Window size to use right now.
    pub fn effective(&self) -> usize {
        match self {
            Self::Fixed(limit) => *limit,
            Self::Overridable { default, settings } => {
                match settings.get_integer(MAX_PREPARED_ADJACENT_PAGES_KEY) {
                    None => *default,
                    Some(value) => usize::try_from(value).unwrap_or_else(|_| {
                        warn!(
                            key = MAX_PREPARED_ADJACENT_PAGES_KEY,
                            value, "Ignoring negative prepared page limit"
                        );
                        *default
                    }),
                }
            }
        }
    }
}

impl Default for PrepareLimit {
    fn default() -> Self {
        Self::Fixed(DEFAULT_MAX_PREPARED_ADJACENT_PAGES)
    }
}

impl fmt::Debug for PrepareLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(limit) => f.debug_tuple("Fixed").field(limit).finish(),
            Self::Overridable { default, .. } => f
                .debug_struct("Overridable")
                .field("default", default)
                .finish_non_exhaustive(),
        }
    }
}

/// Prepares the neighbors of the current page and unprepares the rest.
pub struct AdjacentPreparer<G> {
    adjacent: G,
    limit: PrepareLimit,
    /// Pages prepared and not yet unprepared, in window order.
    prepared: PreparedPages,
}

impl<G: AdjacentResources> AdjacentPreparer<G> {
    /// Create a preparer.
    ///
    /// `settings` is only consulted when `debug_mode` is set.
    pub fn new(adjacent: G, settings: Option<Arc<dyn SettingsStore>>, debug_mode: bool) -> Self {
        Self::with_limit(adjacent, PrepareLimit::resolve(settings, debug_mode))
    }

    /// Create a preparer with an explicit limit policy.
    pub fn with_limit(adjacent: G, limit: PrepareLimit) -> Self {
        Self {
            adjacent,
            limit,
            prepared: SmallVec::new(),
        }
    }

    /// Reconcile the prepared pages for the viewer now being at `position`.
    pub fn prepare_adjacent(&mut self, position: PageId) {
        let limit = self.limit.effective();

        // Duplicates collapse after truncation; the window never exceeds `limit`.
        let mut window = PreparedPages::new();
        for resource in self.adjacent.neighbors_of(position).into_iter().take(limit) {
            if !contains(&window, resource.id()) {
                window.push(resource);
            }
        }

        let mut prepared = 0usize;
        for resource in &window {
            if !contains(&self.prepared, resource.id()) {
                trace!(page = %resource.id(), "Preparing");
                resource.prepare();
                prepared += 1;
            }
        }

        let mut unprepared = 0usize;
        for resource in self.prepared.drain(..) {
            let id = resource.id();
            if contains(&window, id) {
                continue;
            }
            if id == position {
                // The current page stays prepared even outside the window.
                window.push(resource);
                continue;
            }
            trace!(page = %id, "Unpreparing");
            resource.unprepare();
            unprepared += 1;
        }

        debug!(
            %position,
            limit,
            window = window.len(),
            prepared,
            unprepared,
            "Reconciled adjacent pages"
        );

        self.prepared = window;
    }

    /// Ids of the pages currently prepared.
    pub fn prepared_ids(&self) -> Vec<PageId> {
        self.prepared.iter().map(|r| r.id()).collect()
    }

    /// Whether `page` is currently prepared.
    pub fn is_prepared(&self, page: PageId) -> bool {
        contains(&self.prepared, page)
    }

    /// Window size the next call would use.
    pub fn effective_limit(&self) -> usize {
        self.limit.effective()
    }
}

fn contains(pages: &[Arc<dyn Resource>], id: PageId) -> bool {
    pages.iter().any(|r| r.id() == id)
}
