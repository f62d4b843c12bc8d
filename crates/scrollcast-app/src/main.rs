//! Scrollcast - Narrative viewer walkthrough
//!
//! Scrolls through a linear story, keeping neighboring pages prepared and
//! fading background audio between tracks. Multi player events are printed
//! to stdout as JSON lines.
//!
//! Usage: scrollcast [SETTINGS_JSON] [--debug] [--cross-fade]

mod speaker;
mod story;

use anyhow::Result;
use scrollcast_audio::{LazyPlayerPool, MultiPlayer, MultiPlayerOptions, Player};
use scrollcast_core::{MemorySettings, SettingsStore};
use scrollcast_prefetch::{AdjacentPreloader, AdjacentPreparer, Resource};
use speaker::Speaker;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use story::Story;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_PAGE_COUNT: u64 = 12;
const DEFAULT_FADE_DURATION_MS: u64 = 300;
const DEFAULT_PAGE_DWELL_MS: u64 = 200;
const PAGES_PER_TRACK: u64 = 4;

struct Args {
    settings_path: Option<PathBuf>,
    debug: bool,
    cross_fade: bool,
}

impl Args {
    fn from_env() -> Self {
        let mut args = Self {
            settings_path: None,
            debug: false,
            cross_fade: false,
        };
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--debug" => args.debug = true,
                "--cross-fade" => args.cross_fade = true,
                other if other.starts_with("--") => warn!("Ignoring unknown flag {}", other),
                path => args.settings_path = Some(PathBuf::from(path)),
            }
        }
        args
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Scrollcast starting...");

    let args = Args::from_env();
    let settings = match &args.settings_path {
        Some(path) => {
            info!("Loading settings from {:?}", path);
            Arc::new(MemorySettings::load_from_file(path)?)
        }
        None => Arc::new(MemorySettings::new()),
    };

    let page_count = settings
        .get_unsigned("page_count")?
        .unwrap_or(DEFAULT_PAGE_COUNT);
    let fade_duration = Duration::from_millis(
        settings
            .get_unsigned("fade_duration_ms")?
            .unwrap_or(DEFAULT_FADE_DURATION_MS),
    );
    let dwell = Duration::from_millis(
        settings
            .get_unsigned("page_dwell_ms")?
            .unwrap_or(DEFAULT_PAGE_DWELL_MS),
    );

    let story = Story::linear(page_count, PAGES_PER_TRACK);
    let mut preparer = AdjacentPreparer::new(
        story.clone(),
        Some(Arc::clone(&settings) as Arc<dyn SettingsStore>),
        args.debug,
    );
    let mut preloader = AdjacentPreloader::new(story.clone());
    info!(
        limit = preparer.effective_limit(),
        debug = args.debug,
        "Prepared window configured"
    );

    let pool =
        LazyPlayerPool::new(|media| Some(Arc::new(Speaker::new(media)) as Arc<dyn Player>));
    let options = MultiPlayerOptions::new(fade_duration)
        .with_rewind_on_change(true)
        .with_cross_fade(args.cross_fade);
    let multi_player = MultiPlayer::new(pool, options);

    let events = multi_player.subscribe();
    let printer = std::thread::spawn(move || {
        for event in events.iter() {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to encode event: {}", e),
            }
        }
    });

    for page in story.pages() {
        let position = page.id();
        info!(page = %position, "Scrolled to page");

        preloader.preload(position);
        preparer.prepare_adjacent(position);
        if let Some(media) = page.background_audio() {
            multi_player.fade_to(media)?;
        }

        tokio::time::sleep(dwell).await;
    }

    multi_player.fade_out_and_pause().wait().await;
    multi_player.settle().await;
    info!(prepared = preparer.prepared_ids().len(), "Reached end of story");

    // Dropping the multi player closes the event channel.
    drop(multi_player);
    if printer.join().is_err() {
        warn!("Event printer panicked");
    }

    Ok(())
}
