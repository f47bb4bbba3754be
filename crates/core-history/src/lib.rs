//! History store (C6): append-only, crash-safe, cross-process, searchable.

pub mod record;
pub mod search;
pub mod store;

pub use record::HistoryItem;
pub use search::{SearchCursor, SearchFlags, SearchMode};
pub use store::{HistoryError, HistoryStore};

use std::path::PathBuf;

/// Default on-disk location for a named history, under the user's data
/// directory (mirroring the teacher's own config-path discovery pattern).
pub fn default_history_path(session_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("brook")
        .join(format!("{session_name}_history"))
}
