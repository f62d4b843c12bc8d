//! Player abstraction.
//!
//! Players are owned by a pool and handed out as shared handles. All methods
//! take `&self`; implementations use interior mutability.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Events a player reports about its own playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    /// Playback started.
    Play,
    /// Playback reached the end of the media.
    Ended,
    /// Playback could not be started (e.g. autoplay was blocked).
    PlayFailed,
}

/// Callback receiving player events.
///
/// Players may invoke listeners synchronously from inside any method.
pub type PlayerListener = Arc<dyn Fn(PlayerEvent) + Send + Sync>;

/// A time-based media player.
pub trait Player: Send + Sync {
    /// Start playback at full volume.
    fn play(&self);

    /// Start playback, ramping the volume up over `duration`.
    fn play_and_fade_in(&self, duration: Duration);

    /// Ramp the volume down over `duration`, then pause.
    fn fade_out_and_pause(&self, duration: Duration) -> FadeOut;

    /// Pause immediately.
    fn pause(&self);

    /// Seek back to the beginning.
    fn rewind(&self);

    /// Whether the player is currently paused.
    fn paused(&self) -> bool;

    /// Register a listener for this player's events.
    fn subscribe(&self, listener: PlayerListener);
}

/// Completion of a fade-out started by [`Player::fade_out_and_pause`].
///
/// Continuations registered with [`FadeOut::then`] run on the thread that
/// finishes the paired [`FadeOutHandle`], so no async runtime is required.
pub struct FadeOut {
    completion: Option<Arc<Mutex<Completion>>>,
}

/// Completes the paired [`FadeOut`]. Dropping the handle completes it too.
///
/// Finishing runs the registered continuations synchronously. Do not hold
/// locks that a continuation may need while finishing.
pub struct FadeOutHandle {
    completion: Arc<Mutex<Completion>>,
}

type Continuation = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Completion {
    finished: bool,
    continuations: Vec<Continuation>,
}

impl FadeOut {
    /// A fade-out that has already completed.
    pub fn finished() -> Self {
        Self { completion: None }
    }

    /// A fade-out that completes once the returned handle is finished or dropped.
    pub fn pending() -> (FadeOutHandle, Self) {
        let completion = Arc::new(Mutex::new(Completion::default()));
        (
            FadeOutHandle {
                completion: Arc::clone(&completion),
            },
            Self {
                completion: Some(completion),
            },
        )
    }

    /// Check for completion without waiting.
    pub fn is_finished(&self) -> bool {
        self.completion
            .as_ref()
            .map_or(true, |completion| completion.lock().finished)
    }

    /// Run `continuation` once the fade-out has completed.
    ///
    /// Runs it right away on the calling thread if that is already the case.
    pub fn then<F>(self, continuation: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Some(completion) = self.completion {
            let mut completion = completion.lock();
            if !completion.finished {
                completion.continuations.push(Box::new(continuation));
                return;
            }
        }
        continuation();
    }

    /// Wait for the fade-out to complete.
    pub async fn wait(self) {
        let (tx, rx) = oneshot::channel();
        self.then(move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }
}

impl fmt::Debug for FadeOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FadeOut")
            .field("finished", &self.is_finished())
            .finish()
    }
}

impl FadeOutHandle {
    /// Mark the fade-out as complete.
    pub fn finish(self) {
        self.complete();
    }

    fn complete(&self) {
        let continuations = {
            let mut completion = self.completion.lock();
            if completion.finished {
                return;
            }
            completion.finished = true;
            std::mem::take(&mut completion.continuations)
        };
        for continuation in continuations {
            continuation();
        }
    }
}

impl Drop for FadeOutHandle {
    fn drop(&mut self) {
        self.complete();
    }
}

impl fmt::Debug for FadeOutHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FadeOutHandle").finish_non_exhaustive()
    }
}
