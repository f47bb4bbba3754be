//! Filesystem-listing completion source.
//!
//! The real completion engine (expanding builtins, command names on `$PATH`,
//! option tables per command) is an external collaborator per the core's own
//! scope (§6 "Completion engine (external)") — this binary only needs *a*
//! source to drive the pager end to end, so it lists directory entries
//! under the token currently at the cursor, fish-style (a bare prefix
//! completes in the current directory, a prefix containing `/` completes
//! inside that directory).

use core_pager::{CompletionCandidate, CompletionFlags};
use std::path::{Path, PathBuf};

fn current_token(text: &str, cursor: usize) -> &str {
    let before = &text[..cursor];
    let start = before
        .rfind(char::is_whitespace)
        .map(|i| i + before[i..].chars().next().unwrap().len_utf8())
        .unwrap_or(0);
    &text[start..cursor]
}

/// List filesystem entries matching the token under `cursor`.
pub fn complete_filesystem(text: &str, cursor: usize) -> Vec<CompletionCandidate> {
    let token = current_token(text, cursor);
    let (dir, file_prefix) = match token.rfind('/') {
        Some(idx) => (PathBuf::from(&token[..=idx]), &token[idx + 1..]),
        None => (PathBuf::from("."), token),
    };
    let read_dir = match std::fs::read_dir(&dir) {
        Ok(rd) => rd,
        Err(_) => return Vec::new(),
    };

    let mut candidates = Vec::new();
    for entry in read_dir.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(file_prefix) {
            continue;
        }
        if file_prefix.is_empty() && name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let mut completion = name.into_owned();
        let mut flags = CompletionFlags::empty();
        if is_dir {
            completion.push('/');
            flags |= CompletionFlags::NO_SPACE;
        }
        let description = if is_dir { "directory" } else { "file" };
        candidates.push(CompletionCandidate::new(completion, description, flags));
    }
    candidates.sort_by(|a, b| a.completion.cmp(&b.completion));
    candidates
}

/// The token prefix passed to [`core_pager::Pager::new`] so fuzzy search can
/// filter against what the user already typed.
pub fn token_prefix(text: &str, cursor: usize) -> String {
    let token = current_token(text, cursor);
    match token.rfind('/') {
        Some(idx) => token[idx + 1..].to_string(),
        None => token.to_string(),
    }
}

#[allow(dead_code)]
pub fn resolve_dir_for_display(text: &str, cursor: usize) -> PathBuf {
    let token = current_token(text, cursor);
    match token.rfind('/') {
        Some(idx) => PathBuf::from(&token[..=idx]),
        None => Path::new(".").to_path_buf(),
    }
}
