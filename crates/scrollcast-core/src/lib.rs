//! Scrollcast Core - Foundation types for the narrative viewer
//!
//! This crate provides the types shared by the prefetch and audio crates:
//! - Identifiers for pages (viewer positions) and media files
//! - The error type used across the workspace
//! - The settings store consulted for debug-mode overrides

pub mod error;
pub mod ids;
pub mod settings;

pub use error::{Result, ScrollcastError};
pub use ids::{MediaId, PageId};
pub use settings::{MemorySettings, SettingsStore};

/// Prefetch window constants.
pub mod prefetch_budget {
    /// Maximum number of adjacent pages kept prepared at once.
    pub const DEFAULT_MAX_PREPARED_ADJACENT_PAGES: usize = 10;

    /// Settings key overriding the prepared window size in debug mode.
    pub const MAX_PREPARED_ADJACENT_PAGES_KEY: &str = "max_prepared_adjacent_pages";
}
