//! Player pools.
//!
//! A pool owns one player per media file. The multi player only borrows
//! handles from it.

use crate::player::Player;
use parking_lot::Mutex;
use scrollcast_core::MediaId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Lookup of the player for a media file.
pub trait PlayerPool: Send + Sync {
    /// The player for `id`, or `None` if the media is unknown.
    ///
    /// Repeated lookups for the same id must return the same player.
    fn get(&self, id: MediaId) -> Option<Arc<dyn Player>>;
}

impl PlayerPool for HashMap<MediaId, Arc<dyn Player>> {
    fn get(&self, id: MediaId) -> Option<Arc<dyn Player>> {
        HashMap::get(self, &id).cloned()
    }
}

impl<T: PlayerPool + ?Sized> PlayerPool for Arc<T> {
    fn get(&self, id: MediaId) -> Option<Arc<dyn Player>> {
        (**self).get(id)
    }
}

type PlayerFactory = dyn Fn(MediaId) -> Option<Arc<dyn Player>> + Send + Sync;

/// Pool that creates players on first request and keeps them.
pub struct LazyPlayerPool {
    factory: Box<PlayerFactory>,
    players: Mutex<HashMap<MediaId, Arc<dyn Player>>>,
}

impl LazyPlayerPool {
    /// Create a pool backed by `factory`.
    ///
    /// The factory is called at most once per media id that it resolves.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(MediaId) -> Option<Arc<dyn Player>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Number of players created so far.
    pub fn len(&self) -> usize {
        self.players.lock().len()
    }

    /// Whether no player has been created yet.
    pub fn is_empty(&self) -> bool {
        self.players.lock().is_empty()
    }

    /// Whether a player for `id` has been created.
    pub fn contains(&self, id: MediaId) -> bool {
        self.players.lock().contains_key(&id)
    }
}

impl PlayerPool for LazyPlayerPool {
    fn get(&self, id: MediaId) -> Option<Arc<dyn Player>> {
        let mut players = self.players.lock();
        if let Some(player) = players.get(&id) {
            return Some(Arc::clone(player));
        }

        let player = (self.factory)(id)?;
        debug!(%id, "Created player");
        players.insert(id, Arc::clone(&player));
        Some(player)
    }
}
