//! The history store (C6): append-only, cross-process, deduplicated.

use crate::record::{HistoryItem, parse, serialize};
use crate::search::{SearchCursor, SearchFlags, SearchMode};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Process-wide named history store. Items are kept newest-first; index 1
/// (via [`HistoryStore::item_at_index`]) is the newest, index 0 is the
/// reserved "empty" sentinel.
pub struct HistoryStore {
    name: String,
    path: PathBuf,
    items: Vec<HistoryItem>,
    pending: Vec<HistoryItem>,
    removed_dirty: bool,
    birth_time: u64,
}

impl HistoryStore {
    /// Open (or create) the named history store backed by `path`.
    pub fn open(name: impl Into<String>, path: PathBuf) -> Result<Self, HistoryError> {
        let items = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let mut parsed = parse(&contents);
            parsed.reverse(); // file order is oldest-first; we keep newest-first.
            parsed
        } else {
            Vec::new()
        };
        Ok(Self {
            name: name.into(),
            path,
            items,
            pending: Vec::new(),
            removed_dirty: false,
            birth_time: now_secs(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Push `content` as the newest item, deduplicating against any existing
    /// equal-content item (which is removed first, per the uniqueness
    /// invariant). A leading space on `content` means "do not record".
    pub fn add(&mut self, content: &str) {
        if content.starts_with(' ') {
            return;
        }
        self.items.retain(|it| it.content != content);
        self.pending.retain(|it| it.content != content);
        let item = HistoryItem::new(content, now_secs());
        self.items.insert(0, item.clone());
        self.pending.push(item);
    }

    /// Like [`Self::add`], but additionally records any filesystem paths
    /// referenced by `content` (as produced by `path_hint`) so the
    /// autosuggestion worker can later verify they still exist. The item is
    /// held pending (not written to disk) until [`Self::resolve_pending`] or
    /// [`Self::save`] — this lets a caller redact a command whose execution
    /// failed before either is called.
    pub fn add_pending_with_file_detection(&mut self, content: &str, path_hint: &[PathBuf]) {
        if content.starts_with(' ') {
            return;
        }
        self.items.retain(|it| it.content != content);
        self.pending.retain(|it| it.content != content);
        let mut item = HistoryItem::new(content, now_secs());
        if !path_hint.is_empty() {
            item.paths = Some(path_hint.to_vec());
        }
        self.items.insert(0, item.clone());
        self.pending.push(item);
    }

    /// Commit all pending items for writing on the next [`Self::save`]
    /// without discarding them (they already live in `pending`, so this is
    /// effectively a no-op placeholder for callers that want to express
    /// "I'm done deciding, write it"). Kept distinct from `save` itself so a
    /// caller can resolve-then-batch multiple saves.
    pub fn resolve_pending(&mut self) {
        // Pending items are already eligible for the next save(); nothing
        // else to do, but keeping the method gives callers an explicit point
        // to redact *before* calling it (by mutating `self.items`/`pending`
        // through `remove` first).
    }

    pub fn remove(&mut self, content: &str) {
        let before = self.items.len();
        self.items.retain(|it| it.content != content);
        self.pending.retain(|it| it.content != content);
        if self.items.len() != before {
            self.removed_dirty = true;
        }
    }

    pub fn item_at_index(&self, k: usize) -> Option<&HistoryItem> {
        if k == 0 {
            return None;
        }
        self.items.get(k - 1)
    }

    pub fn search(&self, mode: SearchMode, needle: &str, flags: SearchFlags) -> SearchCursor<'_> {
        SearchCursor::new(&self.items, mode, needle.to_string(), flags)
    }

    /// Append pending additions to the backing file; if any removals
    /// happened since the last save, instead rewrite the whole file under a
    /// temporary name and atomically rename it into place. After this
    /// returns `Ok`, the file contains at least every item `add` accepted
    /// before the call (crash-safety contract).
    pub fn save(&mut self) -> Result<(), HistoryError> {
        if self.removed_dirty {
            self.rewrite_all()?;
            self.removed_dirty = false;
            self.pending.clear();
            return Ok(());
        }
        if self.pending.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for item in &self.pending {
            file.write_all(serialize(item).as_bytes())?;
        }
        file.flush()?;
        self.pending.clear();
        Ok(())
    }

    fn rewrite_all(&self) -> Result<(), HistoryError> {
        let tmp_path = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            // File order is oldest-first; we store newest-first in memory.
            for item in self.items.iter().rev() {
                tmp.write_all(serialize(item).as_bytes())?;
            }
            tmp.flush()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Re-read the backing file and merge in any item whose timestamp
    /// predates this store's own birth time (i.e. was written by a sibling
    /// process that had already saved before we started) and that we do not
    /// already hold. Items stamped after our birth time are assumed to
    /// belong to a session that started after ours and are left for its own
    /// future `incorporate_external_changes` call.
    pub fn incorporate_external_changes(&mut self) -> Result<(), HistoryError> {
        if !self.path.exists() {
            return Ok(());
        }
        let contents = fs::read_to_string(&self.path)?;
        let external = parse(&contents); // oldest-first, as written
        let known: HashSet<String> = self.items.iter().map(|i| i.content.clone()).collect();
        for item in external {
            if item.when >= self.birth_time || known.contains(&item.content) {
                continue;
            }
            let pos = self.items.partition_point(|existing| existing.when >= item.when);
            self.items.insert(pos, item);
        }
        Ok(())
    }

    /// Import from the legacy single-session fish-style history location.
    pub fn populate_from_config_path(&mut self) -> Result<(), HistoryError> {
        let legacy = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fish")
            .join("fish_history");
        if !legacy.exists() {
            return Ok(());
        }
        let contents = fs::read_to_string(&legacy)?;
        let mut parsed = parse(&contents);
        parsed.reverse();
        for item in parsed {
            if !self.items.iter().any(|i| i.content == item.content) {
                self.items.push(item.clone());
                self.pending.push(item);
            }
        }
        Ok(())
    }

    /// Import lines from a bash-style history file. Each line is stripped of
    /// leading/trailing whitespace but internal whitespace is preserved;
    /// lines become items in file order (oldest first), so the most recent
    /// line in the file becomes the newest item.
    pub fn populate_from_bash(&mut self, path: &Path) -> Result<(), HistoryError> {
        let contents = fs::read_to_string(path)?;
        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.items.retain(|it| it.content != trimmed);
            self.pending.retain(|it| it.content != trimmed);
            let item = HistoryItem::new(trimmed, now_secs());
            self.items.insert(0, item.clone());
            self.pending.push(item);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn items_newest_first(store: &HistoryStore) -> Vec<String> {
        store.items.iter().map(|i| i.content.clone()).collect()
    }

    #[test]
    fn add_dedup_moves_to_front() {
        let dir = tempdir().unwrap();
        let mut store = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        store.add("a");
        store.add("b");
        store.add("a");
        assert_eq!(items_newest_first(&store), vec!["a", "b"]);
    }

    #[test]
    fn add_with_leading_space_is_not_recorded() {
        let dir = tempdir().unwrap();
        let mut store = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        store.add(" secret");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn repeated_add_before_save_does_not_duplicate_pending() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist");
        let mut store = HistoryStore::open("test", path.clone()).unwrap();
        store.add("one");
        store.add("two");
        store.add("one");
        assert_eq!(store.pending.len(), 2);
        store.save().unwrap();

        let reloaded = HistoryStore::open("test", path).unwrap();
        assert_eq!(items_newest_first(&reloaded), vec!["one", "two"]);
    }

    #[test]
    fn round_trip_through_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist");
        let mut store = HistoryStore::open("test", path.clone()).unwrap();
        store.add("one");
        store.add("two");
        store.save().unwrap();

        let reloaded = HistoryStore::open("test", path).unwrap();
        assert_eq!(items_newest_first(&reloaded), vec!["two", "one"]);
    }

    #[test]
    fn item_at_index_zero_is_empty_sentinel() {
        let dir = tempdir().unwrap();
        let mut store = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        store.add("only");
        assert!(store.item_at_index(0).is_none());
        assert_eq!(store.item_at_index(1).unwrap().content, "only");
        assert!(store.item_at_index(99).is_none());
    }

    #[test]
    fn remove_then_save_rewrites_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist");
        let mut store = HistoryStore::open("test", path.clone()).unwrap();
        store.add("one");
        store.add("two");
        store.save().unwrap();
        store.remove("one");
        store.save().unwrap();

        let reloaded = HistoryStore::open("test", path).unwrap();
        assert_eq!(items_newest_first(&reloaded), vec!["two"]);
    }

    #[test]
    fn bash_import_matches_scenario() {
        let dir = tempdir().unwrap();
        let bash_path = dir.path().join("bash_history");
        fs::write(
            &bash_path,
            " sleep 123\n final line\necho supsup\nexport XVAR='exported'\nhistory --help\n    echo foo\n",
        )
        .unwrap();
        let mut store = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        store.populate_from_bash(&bash_path).unwrap();
        assert_eq!(
            items_newest_first(&store),
            vec![
                "sleep 123",
                "final line",
                "echo supsup",
                "export XVAR='exported'",
                "history --help",
                "echo foo",
            ]
        );
    }

    #[test]
    fn merge_commutativity_across_disjoint_sessions() {
        use crate::record::HistoryItem;
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist");

        // Reader's store starts empty (no file yet), so its birth time
        // predates the writes below only in the sense that matters here:
        // the writes carry timestamps well in the past relative to "now".
        let mut reader = HistoryStore::open("test", path.clone()).unwrap();

        // Two independent sessions' writes, already flushed to disk with
        // timestamps well before "now".
        let mut raw = String::new();
        raw.push_str(&serialize(&HistoryItem::new("a1", 100)));
        raw.push_str(&serialize(&HistoryItem::new("a2", 200)));
        raw.push_str(&serialize(&HistoryItem::new("b1", 150)));
        fs::write(&path, raw).unwrap();

        reader.incorporate_external_changes().unwrap();
        let contents = items_newest_first(&reader);
        for expected in ["a1", "a2", "b1"] {
            assert!(contents.contains(&expected.to_string()), "missing {expected}");
        }
        // A's own per-session order (a2 newer than a1) is preserved.
        let pos_a1 = contents.iter().position(|c| c == "a1").unwrap();
        let pos_a2 = contents.iter().position(|c| c == "a2").unwrap();
        assert!(pos_a2 < pos_a1);
    }
}
