//! Events reported by the multi player.

use crate::player::PlayerEvent;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use scrollcast_core::MediaId;
use serde::Serialize;

/// Playback event of the currently active media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "event")]
pub enum MultiPlayerEvent {
    /// The active media started playing.
    #[serde(rename = "play")]
    Play { audio_file_id: MediaId },
    /// The active media played to its end.
    #[serde(rename = "ended")]
    Ended { audio_file_id: MediaId },
    /// The active media failed to start.
    #[serde(rename = "playfailed")]
    PlayFailed,
}

impl MultiPlayerEvent {
    /// Tag a player event with the media it belongs to.
    pub fn from_player(id: MediaId, event: PlayerEvent) -> Self {
        match event {
            PlayerEvent::Play => Self::Play { audio_file_id: id },
            PlayerEvent::Ended => Self::Ended { audio_file_id: id },
            PlayerEvent::PlayFailed => Self::PlayFailed,
        }
    }

    /// Event name as seen by consumers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play { .. } => "play",
            Self::Ended { .. } => "ended",
            Self::PlayFailed => "playfailed",
        }
    }
}

/// Fan-out of events to any number of subscribers.
#[derive(Default)]
pub(crate) struct EventBus {
    subscribers: Mutex<Vec<Sender<MultiPlayerEvent>>>,
}

impl EventBus {
    pub(crate) fn subscribe(&self) -> Receiver<MultiPlayerEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber, dropping disconnected ones.
    pub(crate) fn emit(&self, event: MultiPlayerEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event).is_ok());
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
