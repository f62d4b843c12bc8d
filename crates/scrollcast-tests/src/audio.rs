//! Integration tests for the audio subsystem.

use parking_lot::Mutex;
use scrollcast_audio::{
    FadeOut, LazyPlayerPool, MultiPlayer, MultiPlayerEvent, MultiPlayerOptions, NullPlayer,
    Player, PlayerEvent, PlayerListener,
};
use scrollcast_core::{MediaId, ScrollcastError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const FADE: Duration = Duration::from_millis(20);

// ── Helpers ────────────────────────────────────────────────────

/// Null players for media 1..=count, plus a lazy pool handing them out.
fn null_pool(count: u64) -> (HashMap<MediaId, Arc<NullPlayer>>, Arc<LazyPlayerPool>) {
    let players: HashMap<MediaId, Arc<NullPlayer>> = (1..=count)
        .map(|i| (MediaId(i), Arc::new(NullPlayer::new())))
        .collect();
    let lookup = players.clone();
    let pool = LazyPlayerPool::new(move |id| {
        lookup
            .get(&id)
            .map(|player| Arc::clone(player) as Arc<dyn Player>)
    });
    (players, Arc::new(pool))
}

type Timeline = Arc<Mutex<Vec<String>>>;

/// Player whose fade-outs complete after a real delay on the runtime.
struct TimedPlayer {
    name: &'static str,
    timeline: Timeline,
    paused: Mutex<bool>,
}

impl TimedPlayer {
    fn new(name: &'static str, timeline: &Timeline) -> Arc<Self> {
        Arc::new(Self {
            name,
            timeline: Arc::clone(timeline),
            paused: Mutex::new(true),
        })
    }

    fn log(&self, what: &str) {
        self.timeline.lock().push(format!("{} {}", self.name, what));
    }
}

impl Player for TimedPlayer {
    fn play(&self) {
        *self.paused.lock() = false;
        self.log("play");
    }

    fn play_and_fade_in(&self, _duration: Duration) {
        *self.paused.lock() = false;
        self.log("fade in");
    }

    fn fade_out_and_pause(&self, duration: Duration) -> FadeOut {
        self.log("fade out");
        let (handle, fade_out) = FadeOut::pending();
        let timeline = Arc::clone(&self.timeline);
        let name = self.name;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            timeline.lock().push(format!("{} faded", name));
            handle.finish();
        });
        *self.paused.lock() = true;
        fade_out
    }

    fn pause(&self) {
        *self.paused.lock() = true;
        self.log("pause");
    }

    fn rewind(&self) {
        self.log("rewind");
    }

    fn paused(&self) -> bool {
        *self.paused.lock()
    }

    fn subscribe(&self, _listener: PlayerListener) {}
}

fn timed_multi_player(
    timeline: &Timeline,
    options: MultiPlayerOptions,
) -> MultiPlayer<HashMap<MediaId, Arc<dyn Player>>> {
    let mut pool: HashMap<MediaId, Arc<dyn Player>> = HashMap::new();
    pool.insert(MediaId(1), TimedPlayer::new("a", timeline));
    pool.insert(MediaId(2), TimedPlayer::new("b", timeline));
    pool.insert(MediaId(3), TimedPlayer::new("c", timeline));
    MultiPlayer::new(pool, options)
}

fn position(timeline: &Timeline, entry: &str) -> Option<usize> {
    timeline.lock().iter().position(|e| e == entry)
}

// ── Pool and events ────────────────────────────────────────────

#[test]
fn lazy_pool_creates_players_on_demand() {
    let (_players, pool) = null_pool(3);
    let mp = MultiPlayer::new(Arc::clone(&pool), MultiPlayerOptions::new(FADE));

    assert!(pool.is_empty());
    mp.fade_to(MediaId(2)).unwrap();

    assert_eq!(pool.len(), 1);
    assert!(pool.contains(MediaId(2)));
    assert!(mp.is_playing());
}

#[test]
fn unknown_media_reports_error() {
    let (_players, pool) = null_pool(2);
    let mp = MultiPlayer::new(pool, MultiPlayerOptions::new(FADE));
    mp.fade_to(MediaId(1)).unwrap();

    let err = mp.fade_to(MediaId(7)).unwrap_err();

    assert!(matches!(err, ScrollcastError::UnknownMedia(MediaId(7))));
    assert_eq!(err.to_string(), "No player available for media media#7");
    assert_eq!(mp.current_id(), Some(MediaId(1)));
    assert!(mp.is_playing());
}

#[test]
fn events_follow_active_media() {
    let (players, pool) = null_pool(2);
    let mp = MultiPlayer::new(pool, MultiPlayerOptions::new(FADE));
    let events = mp.subscribe();

    mp.fade_to(MediaId(1)).unwrap();
    players[&MediaId(1)].trigger(PlayerEvent::Play);
    mp.fade_to(MediaId(2)).unwrap();
    players[&MediaId(1)].trigger(PlayerEvent::Ended);
    players[&MediaId(2)].trigger(PlayerEvent::Ended);

    let received: Vec<_> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            MultiPlayerEvent::Play {
                audio_file_id: MediaId(1)
            },
            MultiPlayerEvent::Ended {
                audio_file_id: MediaId(2)
            },
        ]
    );
}

#[test]
fn every_subscriber_receives_events() {
    let (players, pool) = null_pool(1);
    let mp = MultiPlayer::new(pool, MultiPlayerOptions::new(FADE));
    let first = mp.subscribe();
    let second = mp.subscribe();

    mp.play(MediaId(1)).unwrap();
    players[&MediaId(1)].trigger(PlayerEvent::PlayFailed);

    assert_eq!(first.try_recv().unwrap(), MultiPlayerEvent::PlayFailed);
    assert_eq!(second.try_recv().unwrap(), MultiPlayerEvent::PlayFailed);
}

#[test]
fn revisiting_media_keeps_single_listener() {
    let (players, pool) = null_pool(2);
    let mp = MultiPlayer::new(pool, MultiPlayerOptions::new(FADE));

    for id in [1, 2, 1, 2, 1] {
        mp.fade_to(MediaId(id)).unwrap();
    }

    assert_eq!(players[&MediaId(1)].listener_count(), 1);
    assert_eq!(players[&MediaId(2)].listener_count(), 1);
}

#[test]
fn events_serialize_for_consumers() {
    let (players, pool) = null_pool(1);
    let mp = MultiPlayer::new(pool, MultiPlayerOptions::new(FADE));
    let events = mp.subscribe();

    mp.play(MediaId(1)).unwrap();
    players[&MediaId(1)].trigger(PlayerEvent::Play);

    let event = events.try_recv().unwrap();
    assert_eq!(event.name(), "play");
    assert_eq!(
        serde_json::to_string(&event).unwrap(),
        r#"{"event":"play","audio_file_id":1}"#
    );
}

#[test]
fn pause_and_resume_keep_active_media() {
    let (players, pool) = null_pool(1);
    let mp = MultiPlayer::new(pool, MultiPlayerOptions::new(FADE));

    mp.fade_to(MediaId(1)).unwrap();
    mp.pause();
    assert!(players[&MediaId(1)].paused());
    assert_eq!(mp.current_id(), Some(MediaId(1)));

    mp.resume();
    assert!(!players[&MediaId(1)].paused());
}

// ── Hand-over timing ───────────────────────────────────────────

#[tokio::test]
async fn sequential_hand_over_waits_for_fade_out() {
    let timeline = Timeline::default();
    let mp = timed_multi_player(&timeline, MultiPlayerOptions::new(FADE));

    mp.fade_to(MediaId(1)).unwrap();
    mp.fade_to(MediaId(2)).unwrap();
    mp.settle().await;

    let faded = position(&timeline, "a faded").unwrap();
    let started = position(&timeline, "b fade in").unwrap();
    assert!(faded < started, "{:?}", timeline.lock());
}

#[tokio::test]
async fn cross_fade_overlaps_players() {
    let timeline = Timeline::default();
    let mp = timed_multi_player(&timeline, MultiPlayerOptions::new(FADE).with_cross_fade(true));

    mp.fade_to(MediaId(1)).unwrap();
    mp.fade_to(MediaId(2)).unwrap();
    assert!(position(&timeline, "b fade in").is_some());

    tokio::time::sleep(FADE * 3).await;
    let faded = position(&timeline, "a faded").unwrap();
    let started = position(&timeline, "b fade in").unwrap();
    assert!(started < faded, "{:?}", timeline.lock());
}

#[tokio::test]
async fn rapid_switches_start_only_latest() {
    let timeline = Timeline::default();
    let mp = timed_multi_player(&timeline, MultiPlayerOptions::new(FADE));

    mp.fade_to(MediaId(1)).unwrap();
    mp.fade_to(MediaId(2)).unwrap();
    mp.fade_to(MediaId(3)).unwrap();
    mp.settle().await;

    assert_eq!(position(&timeline, "b fade in"), None);
    assert!(position(&timeline, "c fade in").is_some());
    assert_eq!(mp.current_id(), Some(MediaId(3)));
    assert!(mp.is_playing());
}

#[tokio::test]
async fn rewind_on_change_rewinds_before_start() {
    let timeline = Timeline::default();
    let options = MultiPlayerOptions::new(FADE).with_rewind_on_change(true);
    let mp = timed_multi_player(&timeline, options);

    mp.play(MediaId(1)).unwrap();
    mp.play(MediaId(1)).unwrap();
    mp.play(MediaId(2)).unwrap();
    mp.settle().await;

    let entries = timeline.lock().clone();
    assert_eq!(entries.iter().filter(|e| *e == "a rewind").count(), 1);
    let rewound = position(&timeline, "b rewind").unwrap();
    let started = position(&timeline, "b play").unwrap();
    assert!(rewound < started);
}

#[tokio::test]
async fn fade_out_and_pause_resolves_after_fade() {
    let timeline = Timeline::default();
    let mp = timed_multi_player(&timeline, MultiPlayerOptions::new(FADE));

    mp.fade_to(MediaId(1)).unwrap();
    mp.fade_out_and_pause().wait().await;

    assert!(position(&timeline, "a faded").is_some());
    assert!(!mp.is_playing());
    assert_eq!(mp.current_id(), Some(MediaId(1)));
}

#[test]
fn options_load_from_json() {
    let options = MultiPlayerOptions::from_json(
        br#"{"fade_duration_ms": 20, "play_from_beginning": true, "rewind_on_change": true}"#,
    )
    .unwrap();

    assert_eq!(
        options,
        MultiPlayerOptions::new(FADE)
            .with_play_from_beginning(true)
            .with_rewind_on_change(true)
    );
}
