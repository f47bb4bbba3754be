//! On-disk record format: append-only, YAML-flavored, one record per item.
//!
//! ```text
//! - cmd: <content with \\ and \n escaped>
//!   when: <unix seconds>
//!   paths:
//!     - <path>
//!     - <path>
//! ```
//!
//! `paths:` is optional. Records are separated by a blank line. Lines
//! starting with `#` are comments and ignored. A truncated trailing record
//! (the process crashed mid-write) is dropped silently; a malformed
//! intermediate record is skipped and logged.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub content: String,
    pub when: u64,
    pub paths: Option<Vec<PathBuf>>,
}

impl HistoryItem {
    pub fn new(content: impl Into<String>, when: u64) -> Self {
        Self {
            content: content.into(),
            when,
            paths: None,
        }
    }
}

/// Escape backslashes and newlines for storage in the `cmd:` field.
pub fn escape_content(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_content`].
pub fn unescape_content(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('n') => {
                    out.push('\n');
                    chars.next();
                }
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                _ => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Serialize one item as an append-ready record (including trailing blank line).
pub fn serialize(item: &HistoryItem) -> String {
    let mut s = String::new();
    s.push_str("- cmd: ");
    s.push_str(&escape_content(&item.content));
    s.push('\n');
    s.push_str("  when: ");
    s.push_str(&item.when.to_string());
    s.push('\n');
    if let Some(paths) = &item.paths
        && !paths.is_empty()
    {
        s.push_str("  paths:\n");
        for p in paths {
            s.push_str("    - ");
            s.push_str(&p.to_string_lossy());
            s.push('\n');
        }
    }
    s.push('\n');
    s
}

/// Parse the full contents of a history file into items, in file order
/// (oldest append first). Tolerant of a truncated final record and skips
/// (with a warning) any malformed intermediate record.
pub fn parse(contents: &str) -> Vec<HistoryItem> {
    let mut items = Vec::new();
    let mut lines = contents.lines().peekable();
    loop {
        // Skip blank lines and comments between records.
        while matches!(lines.peek(), Some(l) if l.trim().is_empty() || l.trim_start().starts_with('#'))
        {
            lines.next();
        }
        let Some(first) = lines.peek() else {
            break;
        };
        if !first.starts_with("- cmd: ") {
            // Not a record start; give up on the remainder (corrupt/unexpected).
            break;
        }
        let cmd_line = lines.next().unwrap();
        let escaped = &cmd_line["- cmd: ".len()..];
        let content = unescape_content(escaped);

        let Some(when_line) = lines.next() else {
            // Truncated: cmd with no `when:` — drop silently.
            break;
        };
        let Some(when_str) = when_line.trim_start().strip_prefix("when: ") else {
            tracing::warn!(target: "core_history", "skipping malformed record: missing when");
            continue;
        };
        let Ok(when) = when_str.trim().parse::<u64>() else {
            tracing::warn!(target: "core_history", "skipping malformed record: bad timestamp");
            continue;
        };

        let mut paths = None;
        if matches!(lines.peek(), Some(l) if l.trim() == "paths:") {
            lines.next();
            let mut collected = Vec::new();
            while matches!(lines.peek(), Some(l) if l.trim_start().starts_with("- "))
            {
                let line = lines.next().unwrap();
                let p = line.trim_start().trim_start_matches("- ").trim();
                collected.push(PathBuf::from(p));
            }
            paths = Some(collected);
        }

        items.push(HistoryItem {
            content,
            when,
            paths,
        });
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_roundtrip() {
        let original = "echo \"a\\b\"\nsecond line";
        let escaped = escape_content(original);
        assert_eq!(unescape_content(&escaped), original);
    }

    #[test]
    fn serialize_then_parse_roundtrip() {
        let item = HistoryItem {
            content: "ls -la".into(),
            when: 123,
            paths: Some(vec![PathBuf::from("/tmp/a")]),
        };
        let text = serialize(&item);
        let parsed = parse(&text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], item);
    }

    #[test]
    fn parse_skips_truncated_tail() {
        let mut text = serialize(&HistoryItem::new("good", 1));
        text.push_str("- cmd: half-written\n");
        let parsed = parse(&text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].content, "good");
    }

    #[test]
    fn parse_tolerates_comments_and_blank_lines() {
        let text = format!(
            "# a comment\n\n{}\n# trailing comment\n",
            serialize(&HistoryItem::new("echo hi", 5)).trim_end()
        );
        let parsed = parse(&text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].content, "echo hi");
    }
}
