//! Multi player: hands playback over between the players of a pool.
//!
//! At most one media id is active. Switching to another id fades the previous
//! player out. Without cross-fading, the next player only starts once that
//! fade-out has completed, so the two never sound at the same time.
//!
//! Player events are forwarded only while the player's media is active. A
//! late `ended` from a player that has since been replaced is dropped.
//! Deferred starts follow the same rule: when the switch they belong to has
//! been superseded, they do nothing.
//!
//! A deferred start runs on whichever thread completes the fade-out. Switches
//! and deferred starts are serialized, so a start claimed on one thread is
//! issued before a switch on another thread can fade that player out again.

use crate::events::{EventBus, MultiPlayerEvent};
use crate::player::{FadeOut, Player, PlayerEvent};
use crate::pool::PlayerPool;
use crossbeam_channel::Receiver;
use parking_lot::{Mutex, ReentrantMutex};
use scrollcast_core::{MediaId, Result, ScrollcastError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, trace, warn};

/// Multi player configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPlayerOptions {
    /// Duration handed to players for fading in and out.
    #[serde(rename = "fade_duration_ms", with = "duration_ms")]
    pub fade_duration: Duration,
    /// Rewind on every call, and restart media that is already playing.
    #[serde(default)]
    pub play_from_beginning: bool,
    /// Rewind whenever the active media changes.
    #[serde(default)]
    pub rewind_on_change: bool,
    /// Start the next player without waiting for the previous fade-out.
    #[serde(default)]
    pub cross_fade: bool,
}

impl MultiPlayerOptions {
    /// Options with the given fade duration and all flags off.
    pub fn new(fade_duration: Duration) -> Self {
        Self {
            fade_duration,
            play_from_beginning: false,
            rewind_on_change: false,
            cross_fade: false,
        }
    }

    pub fn with_play_from_beginning(mut self, enabled: bool) -> Self {
        self.play_from_beginning = enabled;
        self
    }

    pub fn with_rewind_on_change(mut self, enabled: bool) -> Self {
        self.rewind_on_change = enabled;
        self
    }

    pub fn with_cross_fade(mut self, enabled: bool) -> Self {
        self.cross_fade = enabled;
        self
    }

    /// Parse options from JSON (`{"fade_duration_ms": 1000, ...}`).
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data)
            .map_err(|e| ScrollcastError::Serialization(format!("Invalid player options: {}", e)))
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// How a newly active player is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartMode {
    FadeIn,
    Play,
}

impl StartMode {
    fn start(self, player: &dyn Player, fade_duration: Duration) {
        match self {
            Self::FadeIn => player.play_and_fade_in(fade_duration),
            Self::Play => player.play(),
        }
    }
}

#[derive(Default)]
struct ActiveState {
    current_id: Option<MediaId>,
    current_player: Option<Arc<dyn Player>>,
    /// Incremented on every switch of the active media.
    generation: u64,
    /// Generation whose start is waiting for a fade-out.
    pending_start: Option<u64>,
    /// Media whose player events are already routed to this multi player.
    wired: HashSet<MediaId>,
}

/// State reachable from player listeners and deferred starts.
struct Shared {
    state: Mutex<ActiveState>,
    events: EventBus,
    /// Held across a switch and across a deferred start. Reentrant because a
    /// fade-out may complete, and run its start, inside a switch.
    transitions: ReentrantMutex<()>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(ActiveState::default()),
            events: EventBus::default(),
            transitions: ReentrantMutex::new(()),
        }
    }

    fn is_current(&self, id: MediaId) -> bool {
        self.state.lock().current_id == Some(id)
    }

    fn forward(&self, id: MediaId, event: PlayerEvent) {
        if !self.is_current(id) {
            trace!(%id, ?event, "Dropping event of inactive media");
            return;
        }
        self.events.emit(MultiPlayerEvent::from_player(id, event));
    }

    /// Claim the deferred start of `generation` if it is still wanted.
    fn take_pending_start(&self, id: MediaId, generation: u64) -> bool {
        let mut state = self.state.lock();
        if state.current_id == Some(id) && state.pending_start == Some(generation) {
            state.pending_start = None;
            true
        } else {
            false
        }
    }

    /// Start `player` if the switch of `generation` is still the latest.
    fn run_pending_start(
        &self,
        id: MediaId,
        generation: u64,
        player: &dyn Player,
        mode: StartMode,
        fade_duration: Duration,
    ) {
        let _transition = self.transitions.lock();
        if self.take_pending_start(id, generation) {
            debug!(%id, "Fade-out complete, starting next media");
            mode.start(player, fade_duration);
        } else {
            debug!(%id, "Dropping superseded start");
        }
    }
}

/// Plays one media at a time, fading between players of a pool.
pub struct MultiPlayer<P> {
    pool: P,
    options: MultiPlayerOptions,
    shared: Arc<Shared>,
    /// Completion signals of deferred starts not yet awaited by `settle`.
    deferred: Mutex<Vec<oneshot::Receiver<()>>>,
}

impl<P: PlayerPool> MultiPlayer<P> {
    /// Create a multi player over `pool`.
    pub fn new(pool: P, options: MultiPlayerOptions) -> Self {
        Self {
            pool,
            options,
            shared: Arc::new(Shared::new()),
            deferred: Mutex::new(Vec::new()),
        }
    }

    /// Make `id` the active media, fading it in.
    pub fn fade_to(&self, id: MediaId) -> Result<()> {
        self.change_current(id, StartMode::FadeIn)
    }

    /// Make `id` the active media, starting it at full volume.
    pub fn play(&self, id: MediaId) -> Result<()> {
        self.change_current(id, StartMode::Play)
    }

    /// Pause the active player. The active media stays the same.
    pub fn pause(&self) {
        let _transition = self.shared.transitions.lock();
        if let Some(player) = self.take_current_player() {
            player.pause();
        }
    }

    /// Continue the active player without fading.
    pub fn resume(&self) {
        let _transition = self.shared.transitions.lock();
        if let Some(player) = self.take_current_player() {
            player.play();
        }
    }

    /// Fade the active player out. The active media stays the same.
    pub fn fade_out_and_pause(&self) -> FadeOut {
        let _transition = self.shared.transitions.lock();
        match self.take_current_player() {
            Some(player) => player.fade_out_and_pause(self.options.fade_duration),
            None => FadeOut::finished(),
        }
    }

    /// The active media, if any.
    pub fn current_id(&self) -> Option<MediaId> {
        self.shared.state.lock().current_id
    }

    /// Whether the active player is playing.
    pub fn is_playing(&self) -> bool {
        let player = self.shared.state.lock().current_player.clone();
        player.is_some_and(|p| !p.paused())
    }

    /// Receive the events of the active media.
    pub fn subscribe(&self) -> Receiver<MultiPlayerEvent> {
        self.shared.events.subscribe()
    }

    /// The configuration this multi player was created with.
    pub fn options(&self) -> &MultiPlayerOptions {
        &self.options
    }

    /// Wait until every deferred start has run or been dropped.
    ///
    /// Only returns once the fade-outs those starts wait for have completed.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.deferred.lock());
            if pending.is_empty() {
                return;
            }
            for done in pending {
                // A dropped sender means the start was discarded unrun.
                let _ = done.await;
            }
        }
    }

    /// The active player, cancelling any start still waiting for a fade-out.
    fn take_current_player(&self) -> Option<Arc<dyn Player>> {
        let mut state = self.shared.state.lock();
        state.pending_start = None;
        state.current_player.clone()
    }

    fn change_current(&self, id: MediaId, mode: StartMode) -> Result<()> {
        let player = self.pool.get(id).ok_or_else(|| {
            warn!(%id, "No player for media");
            ScrollcastError::UnknownMedia(id)
        })?;
        let options = self.options;
        let _transition = self.shared.transitions.lock();

        // Players are only called after the state lock is released: they may
        // report events synchronously, and forwarding takes the lock.
        let (is_same, start_pending, previous, generation, needs_wiring) = {
            let mut state = self.shared.state.lock();
            let is_same = state.current_id == Some(id);
            let previous = if is_same {
                None
            } else {
                state.current_id = Some(id);
                state.generation += 1;
                state.pending_start = None;
                state.current_player.replace(Arc::clone(&player))
            };
            let needs_wiring = state.wired.insert(id);
            (
                is_same,
                state.pending_start.is_some(),
                previous,
                state.generation,
                needs_wiring,
            )
        };

        if needs_wiring {
            self.wire_events(id, &player);
        }

        if is_same && !options.play_from_beginning && !player.paused() {
            debug!(%id, "Media already playing");
            return Ok(());
        }

        if options.play_from_beginning || (options.rewind_on_change && !is_same) {
            debug!(%id, "Rewinding");
            player.rewind();
        }

        if is_same && start_pending {
            debug!(%id, "Start already waiting for fade-out");
            return Ok(());
        }

        let Some(previous) = previous else {
            mode.start(&*player, options.fade_duration);
            return Ok(());
        };

        info!(%id, cross_fade = options.cross_fade, "Switching media");
        let fade_out = previous.fade_out_and_pause(options.fade_duration);

        if options.cross_fade || fade_out.is_finished() {
            mode.start(&*player, options.fade_duration);
        } else {
            self.defer_start(id, player, mode, generation, fade_out);
        }
        Ok(())
    }

    /// Start `player` once `fade_out` completes, unless superseded by then.
    fn defer_start(
        &self,
        id: MediaId,
        player: Arc<dyn Player>,
        mode: StartMode,
        generation: u64,
        fade_out: FadeOut,
    ) {
        {
            let mut state = self.shared.state.lock();
            if state.generation != generation {
                return;
            }
            state.pending_start = Some(generation);
        }

        let (done_tx, done_rx) = oneshot::channel();
        {
            let mut deferred = self.deferred.lock();
            deferred.retain_mut(|done| matches!(done.try_recv(), Err(TryRecvError::Empty)));
            deferred.push(done_rx);
        }

        let shared = Arc::downgrade(&self.shared);
        let fade_duration = self.options.fade_duration;
        fade_out.then(move || {
            if let Some(shared) = shared.upgrade() {
                shared.run_pending_start(id, generation, &*player, mode, fade_duration);
            }
            let _ = done_tx.send(());
        });
    }

    fn wire_events(&self, id: MediaId, player: &Arc<dyn Player>) {
        let shared = Arc::downgrade(&self.shared);
        player.subscribe(Arc::new(move |event: PlayerEvent| {
            if let Some(shared) = shared.upgrade() {
                shared.forward(id, event);
            }
        }));
    }
}
