//! Completion candidates and the merged groups the pager actually renders.

use core_text::{AttributeEscapeSet, measure_run};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CompletionFlags: u8 {
        const REPLACES_TOKEN = 0b0000_0001;
        const NO_SPACE       = 0b0000_0010;
    }
}

/// One completion candidate as handed to the pager by the (external)
/// completion source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    pub completion: String,
    pub description: String,
    pub flags: CompletionFlags,
}

impl CompletionCandidate {
    pub fn new(completion: impl Into<String>, description: impl Into<String>, flags: CompletionFlags) -> Self {
        Self {
            completion: completion.into(),
            description: description.into(),
            flags,
        }
    }
}

/// A run of completions sharing one non-empty description, merged for
/// display (§4.5 step 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerEntry {
    pub completions: Vec<String>,
    pub description: String,
    pub flags: CompletionFlags,
    pub completion_width: usize,
    pub description_width: usize,
    pub preferred_width: usize,
}

const SEPARATOR_WIDTH: usize = 2; // between shared prefix / completion and description column
const PAREN_WIDTH: usize = 2; // "(" + ")"

fn escape_for_display(s: &str) -> String {
    // Minimal escaping: control characters become visible placeholders so a
    // stray tab/newline in a completion string can't corrupt the grid.
    s.chars()
        .map(|c| if c.is_control() { '␣' } else { c })
        .collect()
}

/// Build merged pager entries from raw candidates (§4.5 steps 1-3).
pub fn build_entries(candidates: &[CompletionCandidate], attrs: &AttributeEscapeSet) -> Vec<PagerEntry> {
    let mut groups: Vec<PagerEntry> = Vec::new();
    for cand in candidates {
        let escaped = escape_for_display(&cand.completion);
        if !cand.description.is_empty()
            && let Some(existing) = groups
                .iter_mut()
                .find(|g| g.description == cand.description && !g.description.is_empty())
        {
            existing.completions.push(escaped);
            continue;
        }
        groups.push(PagerEntry {
            completions: vec![escaped],
            description: cand.description.clone(),
            flags: cand.flags,
            completion_width: 0,
            description_width: 0,
            preferred_width: 0,
        });
    }

    for g in &mut groups {
        let comp_joined = g.completions.join(", ");
        g.completion_width = measure_run(&comp_joined, attrs);
        g.description_width = measure_run(&g.description, attrs);
        g.preferred_width = if g.description.is_empty() {
            g.completion_width
        } else {
            g.completion_width + SEPARATOR_WIDTH + PAREN_WIDTH + g.description_width
        };
    }
    groups
}

/// Fuzzy-substring match used by the pager's search field (§4.5 step 4):
/// every character of `needle` must appear in `haystack` in order (allowing
/// gaps), case-insensitively.
pub fn fuzzy_substring_match(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack = haystack.to_lowercase();
    let mut hchars = haystack.chars();
    'outer: for nc in needle.to_lowercase().chars() {
        for hc in hchars.by_ref() {
            if hc == nc {
                continue 'outer;
            }
        }
        return false;
    }
    true
}

/// Filter entries by the pager's search field: a group survives if the
/// needle fuzzy-matches its description or any completion (prefixed by the
/// shared prefix).
pub fn filter_entries(entries: &[PagerEntry], prefix: &str, needle: &str) -> Vec<PagerEntry> {
    if needle.is_empty() {
        return entries.to_vec();
    }
    entries
        .iter()
        .filter(|e| {
            fuzzy_substring_match(&e.description, needle)
                || e.completions
                    .iter()
                    .any(|c| fuzzy_substring_match(&format!("{prefix}{c}"), needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(completion: &str, desc: &str) -> CompletionCandidate {
        CompletionCandidate::new(completion, desc, CompletionFlags::empty())
    }

    #[test]
    fn merges_entries_sharing_a_description() {
        let attrs = AttributeEscapeSet::default();
        let candidates = vec![
            cand("foo.txt", "text file"),
            cand("bar.txt", "text file"),
            cand("baz.bin", ""),
        ];
        let entries = build_entries(&candidates, &attrs);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].completions, vec!["foo.txt", "bar.txt"]);
        assert_eq!(entries[1].completions, vec!["baz.bin"]);
    }

    #[test]
    fn preferred_width_accounts_for_separator_and_parens() {
        let attrs = AttributeEscapeSet::default();
        let entries = build_entries(&[cand("ab", "cd")], &attrs);
        assert_eq!(entries[0].preferred_width, 2 + 2 + 2 + 2);
    }

    #[test]
    fn fuzzy_match_allows_gaps() {
        assert!(fuzzy_substring_match("configuration", "cfg"));
        assert!(!fuzzy_substring_match("configuration", "xyz"));
    }

    #[test]
    fn filter_keeps_matching_descriptions_or_completions() {
        let attrs = AttributeEscapeSet::default();
        let entries = build_entries(
            &[cand("alpha", "first"), cand("beta", "second")],
            &attrs,
        );
        let filtered = filter_entries(&entries, "", "fir");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].completions, vec!["alpha"]);
    }
}
