//! Player without output.

use crate::player::{FadeOut, Player, PlayerEvent, PlayerListener};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A player that produces no sound.
///
/// It tracks its paused flag like a real player and completes fade-outs
/// immediately. Events are only reported when [`NullPlayer::trigger`] is
/// called, which makes it a stand-in for media that has not loaded yet.
pub struct NullPlayer {
    paused: AtomicBool,
    listeners: Mutex<Vec<PlayerListener>>,
}

impl NullPlayer {
    /// Create a paused null player.
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(true),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Report `event` to all listeners.
    pub fn trigger(&self, event: PlayerEvent) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl Default for NullPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for NullPlayer {
    fn play(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn play_and_fade_in(&self, _duration: Duration) {
        self.paused.store(false, Ordering::SeqCst);
    }

    fn fade_out_and_pause(&self, _duration: Duration) -> FadeOut {
        self.paused.store(true, Ordering::SeqCst);
        FadeOut::finished()
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    fn rewind(&self) {}

    fn paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn subscribe(&self, listener: PlayerListener) {
        self.listeners.lock().push(listener);
    }
}
