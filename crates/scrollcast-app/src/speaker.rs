//! Simulated audio output.
//!
//! A speaker stands in for a real audio element: it logs what it would play
//! and takes the fade duration in wall-clock time to fade out.

use parking_lot::Mutex;
use scrollcast_audio::{FadeOut, Player, PlayerEvent, PlayerListener};
use scrollcast_core::MediaId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::info;

pub struct Speaker {
    media: MediaId,
    paused: AtomicBool,
    listeners: Mutex<Vec<PlayerListener>>,
}

impl Speaker {
    pub fn new(media: MediaId) -> Self {
        Self {
            media,
            paused: AtomicBool::new(true),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn start(&self, how: &str) {
        info!(media = %self.media, "{}", how);
        self.paused.store(false, Ordering::SeqCst);
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener(PlayerEvent::Play);
        }
    }
}

impl Player for Speaker {
    fn play(&self) {
        self.start("Play");
    }

    fn play_and_fade_in(&self, duration: Duration) {
        self.start(&format!("Fade in over {:?}", duration));
    }

    fn fade_out_and_pause(&self, duration: Duration) -> FadeOut {
        info!(media = %self.media, "Fade out over {:?}", duration);
        self.paused.store(true, Ordering::SeqCst);

        let Ok(runtime) = Handle::try_current() else {
            return FadeOut::finished();
        };
        let (handle, fade_out) = FadeOut::pending();
        let media = self.media;
        runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            info!(%media, "Faded out");
            handle.finish();
        });
        fade_out
    }

    fn pause(&self) {
        info!(media = %self.media, "Pause");
        self.paused.store(true, Ordering::SeqCst);
    }

    fn rewind(&self) {
        info!(media = %self.media, "Rewind");
    }

    fn paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn subscribe(&self, listener: PlayerListener) {
        self.listeners.lock().push(listener);
    }
}
