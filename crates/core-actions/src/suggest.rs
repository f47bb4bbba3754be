//! Autosuggestion lookup, run on the C9 worker pool (§4.1 "Autosuggestion").
//!
//! The suggestion offered for a non-empty command line is the most recent
//! history entry that starts with it and is strictly longer; the caller is
//! responsible for clearing the suggestion whenever the line itself ends in
//! trailing whitespace (§9 open question — kept conservative here too).

use core_history::{HistoryStore, SearchFlags, SearchMode};

/// Find the most recent history entry with `text` as a proper prefix.
/// Returns the full matched entry, not just the suffix to append — callers
/// combine it with the live command line the same way the prompt composer
/// does in [`core_prompt::compose`].
pub fn suggest_from_history(history: &HistoryStore, text: &str) -> Option<String> {
    if text.is_empty() || text.ends_with(char::is_whitespace) {
        return None;
    }
    let mut cursor = history.search(SearchMode::Prefix, text, SearchFlags::default());
    while let Some(item) = cursor.next() {
        if item.content.len() > text.len() {
            return Some(item.content.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_store(name: &str) -> HistoryStore {
        let path = std::env::temp_dir().join(format!("brook-suggest-test-{name}-{}", std::process::id()));
        let _ = std::fs::remove_file(&path);
        HistoryStore::open(name, path).unwrap()
    }

    #[test]
    fn suggests_most_recent_longer_prefix_match() {
        let mut store = temp_store("a");
        store.add("git commit -m 'first'");
        store.add("git commit -m 'second'");
        let suggestion = suggest_from_history(&store, "git commit");
        assert_eq!(suggestion.as_deref(), Some("git commit -m 'second'"));
    }

    #[test]
    fn no_suggestion_for_trailing_whitespace() {
        let mut store = temp_store("b");
        store.add("git commit");
        assert_eq!(suggest_from_history(&store, "git commit "), None);
    }

    #[test]
    fn no_suggestion_when_nothing_matches() {
        let store = temp_store("c");
        assert_eq!(suggest_from_history(&store, "git"), None);
    }

    #[test]
    fn exact_length_match_is_not_suggested() {
        let mut store = temp_store("d");
        store.add("ls");
        assert_eq!(suggest_from_history(&store, "ls"), None);
    }
}
