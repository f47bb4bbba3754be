//! The editor loop's command dispatch table (C8, §4.8).
//!
//! [`EditorLoop`] owns the session (C7 line + highlights + kill ring) and
//! the pager (C5), if one is active, and turns each [`InputCommand`] into a
//! mutation plus a [`DispatchOutcome`] telling the caller whether to repaint,
//! keep reading, or finish the read call — the enum the design notes call
//! for in place of the source's `end_loop`/`exit_forced` flags.

use crate::abbrev::expand_abbreviation;
use crate::parser_api::ParserApi;
use core_config::Config;
use core_history::{HistoryStore, SearchFlags, SearchMode};
use core_keymap::InputCommand;
use core_pager::{CompletionCandidate, NavDirection, Pager};
use core_state::Session;
use core_text::{Direction, JumpPrecision, WordStyle};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Keep reading; no repaint is strictly required (most motions still
    /// request one — see [`EditorLoop::take_repaint`]).
    Continue,
    /// The read call is done; `text` is the command to hand to the
    /// executor.
    Finished(String),
    /// SIGINT-style cancellation: the line was cleared, keep reading.
    Cancelled,
    /// EOF on an empty line: the caller should end the interactive session.
    Exit,
}

const ABBREV_TRIGGERS: &[char] = &[' ', ';', '|', '&', '^', '>', '<'];

#[derive(Debug, Clone)]
struct HistorySearchState {
    mode: SearchMode,
    needle: String,
    depth: usize,
    saved_text: String,
    saved_cursor: usize,
}

/// The external collaborators C8 reaches into on each dispatch: the history
/// store (C6), the static config (abbreviations, search case-folding), and
/// the parser the Execute handler asks for completeness.
pub struct EditorDeps<'a> {
    pub history: &'a mut HistoryStore,
    pub config: &'a Config,
    pub parser: &'a dyn ParserApi,
}

pub struct EditorLoop {
    session: Session,
    pager: Option<Pager>,
    coalescing: bool,
    repaint_needed: bool,
    history_search: Option<HistorySearchState>,
}

impl EditorLoop {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            pager: None,
            coalescing: false,
            repaint_needed: false,
            history_search: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn pager(&self) -> Option<&Pager> {
        self.pager.as_ref()
    }

    /// Mutable access for the host to drive navigation/search directly —
    /// C8's own dispatch table only opens and closes the pager (§4.8), the
    /// 8-directional movement and search-field editing it wraps are C5's.
    pub fn pager_mut(&mut self) -> Option<&mut Pager> {
        self.pager.as_mut()
    }

    pub fn open_pager(&mut self, pager: Pager) {
        self.pager = Some(pager);
    }

    /// Dismiss an open pager without treating it as "paging ended by some
    /// other command" (used once the host has applied the selected
    /// candidate onto the line itself).
    pub fn dismiss_pager(&mut self) {
        self.close_pager();
    }

    /// Clear a pending repaint-coalescing request and report whether one
    /// was pending, per §4.8 "repaint coalescing".
    pub fn take_repaint(&mut self) -> bool {
        std::mem::replace(&mut self.repaint_needed, false)
    }

    fn request_repaint(&mut self) {
        self.repaint_needed = true;
    }

    fn close_pager(&mut self) {
        self.pager = None;
    }

    /// Replace the whole line's text and cursor in one generation bump
    /// (used by abbreviation expansion and the history-search preview,
    /// which both need to replace text wholesale rather than through a
    /// single `EditLine` operation).
    fn replace_line(&mut self, text: &str, cursor: usize) {
        self.session.edit(|line| {
            let len = line.len();
            line.delete_range(0, len);
            line.insert_string(text, 0, text.len());
            line.set_cursor(cursor);
        });
    }

    fn maybe_expand_abbreviation(&mut self, deps: &EditorDeps) {
        let (text, cursor) = {
            let line = self.session.line();
            (line.text().to_string(), line.cursor())
        };
        if let Some((new_text, new_cursor)) = expand_abbreviation(&text, cursor, deps.config, deps.parser) {
            self.replace_line(&new_text, new_cursor);
        }
    }

    /// Insert one character, triggering abbreviation expansion when it is
    /// one of the trigger characters (§4.7).
    pub fn insert_char(&mut self, c: char, deps: &EditorDeps) {
        self.close_pager();
        self.session.edit(|line| line.insert_char(c));
        if ABBREV_TRIGGERS.contains(&c) {
            self.maybe_expand_abbreviation(deps);
        }
        self.request_repaint();
    }

    fn is_paging_ending(cmd: InputCommand) -> bool {
        !matches!(
            cmd,
            InputCommand::Complete
                | InputCommand::CompleteAndSearch
                | InputCommand::PagerToggleSearch
                | InputCommand::UpLine
                | InputCommand::DownLine
                | InputCommand::ForceRepaint
                | InputCommand::Repaint
                | InputCommand::Null
        )
    }

    /// Dispatch one resolved command (§4.8's handler table).
    pub fn dispatch(&mut self, cmd: InputCommand, deps: &mut EditorDeps) -> DispatchOutcome {
        if self.pager.is_some() && Self::is_paging_ending(cmd) {
            self.close_pager();
        }
        if !matches!(cmd, InputCommand::Repaint) {
            self.coalescing = false;
        }
        if !matches!(cmd, InputCommand::HistorySearchBackward | InputCommand::HistorySearchForward) {
            self.history_search = None;
        }

        match cmd {
            InputCommand::BeginningOfLine => self.move_to(|l| current_line_start(l.text(), l.cursor())),
            InputCommand::EndOfLine => self.move_to(|l| current_line_end(l.text(), l.cursor())),
            InputCommand::BeginningOfBuffer => self.move_to(|_| 0),
            InputCommand::EndOfBuffer => self.move_to(|l| l.text().len()),
            InputCommand::ForwardChar => {
                self.session.edit(|line| {
                    let end = core_text::grapheme::next_boundary(&line.text()[line.cursor()..], 0) + line.cursor();
                    line.set_cursor(end.min(line.text().len()));
                });
                self.after_motion()
            }
            InputCommand::BackwardChar => {
                self.session.edit(|line| {
                    let start = core_text::grapheme::prev_boundary(&line.text()[..line.cursor()], line.cursor());
                    line.set_cursor(start);
                });
                self.after_motion()
            }
            InputCommand::ForwardWord => self.word_motion(Direction::Forward, false, WordStyle::Punctuation),
            InputCommand::BackwardWord => self.word_motion(Direction::Backward, false, WordStyle::Punctuation),
            InputCommand::ForwardBigword => self.word_motion(Direction::Forward, false, WordStyle::WhitespaceOnly),
            InputCommand::BackwardBigword => self.word_motion(Direction::Backward, false, WordStyle::WhitespaceOnly),
            InputCommand::UpLine => {
                self.move_to(|l| vertical_motion(l.text(), l.cursor(), -1));
                self.after_motion()
            }
            InputCommand::DownLine => {
                self.move_to(|l| vertical_motion(l.text(), l.cursor(), 1));
                self.after_motion()
            }
            InputCommand::Null => DispatchOutcome::Continue,
            InputCommand::Cancel => self.cancel(),
            InputCommand::ForceRepaint | InputCommand::Repaint => {
                if self.coalescing {
                    DispatchOutcome::Continue
                } else {
                    self.coalescing = true;
                    self.request_repaint();
                    DispatchOutcome::Continue
                }
            }
            InputCommand::Eof => {
                if self.session.line().is_empty() {
                    DispatchOutcome::Exit
                } else {
                    DispatchOutcome::Continue
                }
            }
            InputCommand::Complete | InputCommand::CompleteAndSearch | InputCommand::PagerToggleSearch => {
                // Candidate generation is the external completion source's
                // job (§6); C8 only forwards the navigation intent once a
                // pager exists.
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::KillLine => {
                let killed = self.session.edit(|line| {
                    let end = current_line_end(line.text(), line.cursor());
                    line.delete_range(line.cursor(), end)
                });
                self.session.append_kill(&killed);
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::BackwardKillLine => {
                let killed = self.session.edit(|line| {
                    let start = current_line_start(line.text(), line.cursor());
                    line.delete_range(start, line.cursor())
                });
                self.session.push_kill(killed);
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::KillWholeLine => {
                let killed = self.session.edit(|line| {
                    let len = line.len();
                    line.delete_range(0, len)
                });
                self.session.push_kill(killed);
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::Yank => {
                if let Some(text) = self.session.yank().map(str::to_string) {
                    self.session.edit(|line| line.insert_string(&text, 0, text.len()));
                }
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::YankPop => {
                if let Some(text) = self.session.yank_pop().map(str::to_string) {
                    self.session.edit(|line| {
                        let end = line.cursor();
                        let start = end.saturating_sub(text.len());
                        line.delete_range(start, end);
                        line.insert_string(&text, 0, text.len());
                    });
                }
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::BackwardDeleteChar => {
                let removed = self.session.edit(|line| line.remove_backward());
                self.session.push_kill(removed);
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::DeleteChar => {
                let removed = self.session.edit(|line| line.remove_forward());
                self.session.push_kill(removed);
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::Execute => self.execute(deps),
            InputCommand::HistorySearchBackward => self.history_search(deps, SearchMode::Prefix, true),
            InputCommand::HistorySearchForward => self.history_search(deps, SearchMode::Prefix, false),
            InputCommand::HistoryTokenSearchBackward => self.history_search(deps, SearchMode::Contains, true),
            InputCommand::HistoryTokenSearchForward => self.history_search(deps, SearchMode::Contains, false),
            InputCommand::SuppressAutosuggestion => {
                self.session.set_autosuggestion(None);
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::AcceptAutosuggestion => {
                if let Some(suggestion) = self.session.autosuggestion().map(str::to_string) {
                    self.replace_line(&suggestion, suggestion.len());
                }
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::TransposeChars => {
                self.session.edit(transpose_chars);
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::TransposeWords => {
                self.session.edit(|line| transpose_words(line));
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::UpWord => self.case_word(str::to_uppercase),
            InputCommand::DownWord => self.case_word(str::to_lowercase),
            InputCommand::CapitalizeWord => self.case_word(capitalize),
            InputCommand::BeginSelection => {
                self.session.edit(|line| line.begin_selection());
                DispatchOutcome::Continue
            }
            InputCommand::SwapSelectionStartStop => {
                self.session.edit(|line| line.swap_selection_start_stop());
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::EndSelection => {
                self.session.edit(|line| line.end_selection());
                DispatchOutcome::Continue
            }
            InputCommand::KillSelection => {
                if let Some(killed) = self.session.edit(|line| line.kill_selection()) {
                    self.session.push_kill(killed);
                }
                self.request_repaint();
                DispatchOutcome::Continue
            }
            InputCommand::ForwardJump => self.jump(Direction::Forward, JumpPrecision::To),
            InputCommand::ForwardJumpTill => self.jump(Direction::Forward, JumpPrecision::Till),
            InputCommand::BackwardJump => self.jump(Direction::Backward, JumpPrecision::To),
            InputCommand::BackwardJumpTill => self.jump(Direction::Backward, JumpPrecision::Till),
            InputCommand::RepeatJump | InputCommand::ReverseRepeatJump => {
                // Repeating the last jump needs the jump target remembered
                // by the caller (the event source knows which character);
                // without it there is nothing to repeat.
                debug!("repeat-jump requested with no remembered jump target");
                DispatchOutcome::Continue
            }
        }
    }

    fn move_to(&mut self, f: impl FnOnce(&core_text::EditLine) -> usize) -> DispatchOutcome {
        self.session.edit(|line| {
            let target = f(line);
            line.set_cursor(target);
        });
        self.after_motion()
    }

    fn after_motion(&mut self) -> DispatchOutcome {
        self.request_repaint();
        DispatchOutcome::Continue
    }

    fn word_motion(&mut self, dir: Direction, erase: bool, style: WordStyle) -> DispatchOutcome {
        self.session.edit(|line| {
            line.move_word(dir, erase, style);
        });
        self.after_motion()
    }

    fn jump(&mut self, dir: Direction, precision: JumpPrecision) -> DispatchOutcome {
        // The actual target character arrives as a follow-up self-insertion
        // in the fish model; callers of this crate supply it out of band.
        // Until then this is a no-op that still requests a repaint so a
        // caller-side two-step jump UI can redraw its prompt.
        let _ = (dir, precision);
        self.request_repaint();
        DispatchOutcome::Continue
    }

    fn case_word(&mut self, f: impl Fn(&str) -> String) -> DispatchOutcome {
        self.session.edit(|line| {
            let (start, end) = line.current_token_bounds(WordStyle::Punctuation);
            let cursor = line.cursor();
            let transformed = f(&line.text()[start..end]);
            line.set_cursor(start);
            line.delete_range(start, end);
            line.insert_string(&transformed, 0, transformed.len());
            line.set_cursor(cursor.max(start) + (transformed.len().saturating_sub(end - start)));
        });
        self.request_repaint();
        DispatchOutcome::Continue
    }

    fn cancel(&mut self) -> DispatchOutcome {
        self.close_pager();
        self.history_search = None;
        DispatchOutcome::Cancelled
    }

    /// §4.8 Execute handler.
    fn execute(&mut self, deps: &mut EditorDeps) -> DispatchOutcome {
        if self.pager.is_some() {
            self.close_pager();
            self.request_repaint();
            return DispatchOutcome::Continue;
        }

        let (text, cursor) = {
            let line = self.session.line();
            (line.text().to_string(), line.cursor())
        };

        if ends_in_continuation_backslash(&text, cursor) {
            self.session.edit(|line| line.insert_char('\n'));
            self.request_repaint();
            return DispatchOutcome::Continue;
        }

        let outcome = deps.parser.detect_errors(&text, true);
        if outcome.incomplete {
            self.session.edit(|line| line.insert_char('\n'));
            self.request_repaint();
            return DispatchOutcome::Continue;
        }

        self.maybe_expand_abbreviation(deps);
        let final_text = self.session.line().text().to_string();

        let generation = self.session.generation().current();
        let specs = crate::highlight(&final_text);
        self.session.apply_highlights(generation, specs);

        if !final_text.starts_with(' ') {
            deps.history.add(&final_text);
        }

        DispatchOutcome::Finished(final_text)
    }

    fn history_search(&mut self, deps: &mut EditorDeps, mode: SearchMode, backward: bool) -> DispatchOutcome {
        let state = self.history_search.get_or_insert_with(|| {
            let line = self.session.line();
            HistorySearchState {
                mode,
                needle: line.text().to_string(),
                depth: 0,
                saved_text: line.text().to_string(),
                saved_cursor: line.cursor(),
            }
        });

        if backward {
            state.depth += 1;
        } else {
            state.depth = state.depth.saturating_sub(1);
        }
        let (mode, needle, depth, saved_text, saved_cursor) =
            (state.mode, state.needle.clone(), state.depth, state.saved_text.clone(), state.saved_cursor);

        if depth == 0 {
            self.replace_line(&saved_text, saved_cursor);
            self.request_repaint();
            return DispatchOutcome::Continue;
        }

        let mut cursor = deps.history.search(mode, &needle, SearchFlags::default());
        let mut found = None;
        for _ in 0..depth {
            found = cursor.next().map(|item| item.content.clone());
            if found.is_none() {
                break;
            }
        }
        if let Some(text) = found {
            let len = text.len();
            self.replace_line(&text, len);
        } else if let Some(state) = self.history_search.as_mut() {
            state.depth = state.depth.saturating_sub(1);
        }
        self.request_repaint();
        DispatchOutcome::Continue
    }
}

fn current_line_start(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn current_line_end(text: &str, cursor: usize) -> usize {
    text[cursor..].find('\n').map(|i| cursor + i).unwrap_or(text.len())
}

fn vertical_motion(text: &str, cursor: usize, delta: isize) -> usize {
    let line_start = current_line_start(text, cursor);
    let col = cursor - line_start;
    if delta < 0 {
        if line_start == 0 {
            return cursor;
        }
        let prev_start = current_line_start(text, line_start - 1);
        let prev_end = line_start - 1;
        (prev_start + col).min(prev_end)
    } else {
        let line_end = current_line_end(text, cursor);
        if line_end == text.len() {
            return cursor;
        }
        let next_start = line_end + 1;
        let next_end = current_line_end(text, next_start);
        (next_start + col).min(next_end)
    }
}

/// True when the cursor sits after an unescaped trailing backslash not in
/// a comment, or on trailing whitespace following one (§4.8 step 2).
fn ends_in_continuation_backslash(text: &str, cursor: usize) -> bool {
    let before = &text[..cursor];
    let trimmed = before.trim_end_matches(|c: char| c.is_whitespace() && c != '\n');
    if !trimmed.ends_with('\\') {
        return false;
    }
    let mut backslashes = 0;
    for c in trimmed.chars().rev() {
        if c == '\\' {
            backslashes += 1;
        } else {
            break;
        }
    }
    backslashes % 2 == 1
}

fn transpose_chars(line: &mut core_text::EditLine) {
    let text = line.text().to_string();
    let cursor = line.cursor();
    let prev = core_text::grapheme::prev_boundary(&text[..cursor.min(text.len())], cursor.min(text.len()));
    if prev == 0 {
        return;
    }
    let mid = cursor.min(text.len());
    let next = if mid < text.len() {
        core_text::grapheme::next_boundary(&text[mid..], 0) + mid
    } else {
        mid
    };
    if next <= mid {
        return;
    }
    let a = text[prev..mid].to_string();
    let b = text[mid..next].to_string();
    line.delete_range(prev, next);
    line.insert_string(&format!("{b}{a}"), 0, a.len() + b.len());
}

fn transpose_words(line: &mut core_text::EditLine) {
    let cursor = line.cursor();
    let (cur_start, cur_end) = line.current_token_bounds(WordStyle::Punctuation);
    line.set_cursor(cur_start);
    line.move_word(Direction::Backward, false, WordStyle::Punctuation);
    let (prev_start, prev_end) = line.current_token_bounds(WordStyle::Punctuation);
    if prev_end <= prev_start || cur_end <= cur_start || prev_end > cur_start {
        line.set_cursor(cursor);
        return;
    }
    let text = line.text().to_string();
    let prev_word = text[prev_start..prev_end].to_string();
    let between = text[prev_end..cur_start].to_string();
    let cur_word = text[cur_start..cur_end].to_string();
    line.delete_range(prev_start, cur_end);
    let replacement = format!("{cur_word}{between}{prev_word}");
    line.insert_string(&replacement, 0, replacement.len());
    line.set_cursor(prev_start + replacement.len());
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser_api::NaiveParser;
    use core_config::Config;
    use core_history::HistoryStore;
    use core_workers::Generation;
    use tempfile::tempdir;

    fn deps<'a>(history: &'a mut HistoryStore, config: &'a Config, parser: &'a NaiveParser) -> EditorDeps<'a> {
        EditorDeps { history, config, parser }
    }

    fn new_loop() -> EditorLoop {
        EditorLoop::new(Session::new(Generation::new()))
    }

    #[test]
    fn execute_records_history_and_finishes() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        let config = Config::default();
        let parser = NaiveParser;
        let mut editor = new_loop();
        editor.insert_char('e', &deps(&mut history, &config, &parser));
        editor.insert_char('c', &deps(&mut history, &config, &parser));
        editor.insert_char('h', &deps(&mut history, &config, &parser));
        editor.insert_char('o', &deps(&mut history, &config, &parser));
        let mut d = deps(&mut history, &config, &parser);
        let outcome = editor.dispatch(InputCommand::Execute, &mut d);
        assert_eq!(outcome, DispatchOutcome::Finished("echo".to_string()));
        assert_eq!(history.item_at_index(1).unwrap().content, "echo");
    }

    #[test]
    fn leading_space_command_is_not_recorded() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        let config = Config::default();
        let parser = NaiveParser;
        let mut editor = new_loop();
        for c in " ls".chars() {
            editor.insert_char(c, &deps(&mut history, &config, &parser));
        }
        let mut d = deps(&mut history, &config, &parser);
        editor.dispatch(InputCommand::Execute, &mut d);
        assert!(history.is_empty());
    }

    #[test]
    fn incomplete_command_inserts_newline_instead_of_finishing() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        let config = Config::default();
        let parser = NaiveParser;
        let mut editor = new_loop();
        for c in "echo 'hi".chars() {
            editor.insert_char(c, &deps(&mut history, &config, &parser));
        }
        let mut d = deps(&mut history, &config, &parser);
        let outcome = editor.dispatch(InputCommand::Execute, &mut d);
        assert_eq!(outcome, DispatchOutcome::Continue);
        assert!(editor.session().line().text().ends_with('\n'));
    }

    #[test]
    fn backward_kill_line_then_yank_restores_text() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        let config = Config::default();
        let parser = NaiveParser;
        let mut editor = new_loop();
        for c in "hello".chars() {
            editor.insert_char(c, &deps(&mut history, &config, &parser));
        }
        let mut d = deps(&mut history, &config, &parser);
        editor.dispatch(InputCommand::BackwardKillLine, &mut d);
        assert_eq!(editor.session().line().text(), "");
        editor.dispatch(InputCommand::Yank, &mut d);
        assert_eq!(editor.session().line().text(), "hello");
    }

    #[test]
    fn cancel_closes_pager_and_reports_cancelled() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        let config = Config::default();
        let parser = NaiveParser;
        let mut editor = new_loop();
        let candidates = [CompletionCandidate::new("foo", "", core_pager::CompletionFlags::empty())];
        let attrs = core_text::AttributeEscapeSet::default();
        editor.open_pager(Pager::new(&candidates, "", &attrs, 80, 10));
        let mut d = deps(&mut history, &config, &parser);
        let outcome = editor.dispatch(InputCommand::Cancel, &mut d);
        assert_eq!(outcome, DispatchOutcome::Cancelled);
        assert!(editor.pager().is_none());
    }

    #[test]
    fn eof_on_empty_line_exits() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        let config = Config::default();
        let parser = NaiveParser;
        let mut editor = new_loop();
        let mut d = deps(&mut history, &config, &parser);
        assert_eq!(editor.dispatch(InputCommand::Eof, &mut d), DispatchOutcome::Exit);
    }

    #[test]
    fn history_search_backward_recalls_newest_matching_entry() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        history.add("echo one");
        history.add("echo two");
        let config = Config::default();
        let parser = NaiveParser;
        let mut editor = new_loop();
        let mut d = deps(&mut history, &config, &parser);
        editor.dispatch(InputCommand::HistorySearchBackward, &mut d);
        assert_eq!(editor.session().line().text(), "echo two");
    }

    #[test]
    fn repeated_space_abbreviation_expands_on_trigger() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::open("test", dir.path().join("hist")).unwrap();
        let mut file = core_config::ConfigFile::default();
        file.abbreviations.insert("gc".to_string(), "git checkout".to_string());
        let config = Config { file };
        let parser = NaiveParser;
        let mut editor = new_loop();
        for c in "gc ".chars() {
            editor.insert_char(c, &deps(&mut history, &config, &parser));
        }
        assert_eq!(editor.session().line().text(), "git checkout ");
    }
}
