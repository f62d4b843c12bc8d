//! Scrollcast Audio - Handing playback over between media players
//!
//! Each page of a story may carry its own background audio or video. When
//! the viewer moves on, the active media is faded out and the next one faded
//! in without overlapping playback or stale events.
//!
//! Architecture:
//! - `Player`: A time-based media player with fade support
//! - `FadeOut`: Completion of a fade-out, awaited before sequential handoff
//! - `PlayerPool`: Lookup of the player for a media id (`LazyPlayerPool` memoizes)
//! - `NullPlayer`: Silent player that tracks its paused state
//! - `MultiPlayer`: Top-level orchestrator owning the active media

pub mod events;
pub mod multi_player;
pub mod null_player;
pub mod player;
pub mod pool;

pub use events::MultiPlayerEvent;
pub use multi_player::{MultiPlayer, MultiPlayerOptions};
pub use null_player::NullPlayer;
pub use player::{FadeOut, FadeOutHandle, Player, PlayerEvent, PlayerListener};
pub use pool::{LazyPlayerPool, PlayerPool};
