//! Input command enumeration and key-chord bindings (part of C8).
//!
//! The editor loop never sees raw key events directly — [`Keymap::resolve`]
//! turns a [`KeyToken`] into one of a closed set of [`InputCommand`]s before
//! dispatch, so the loop's handler table can be a total match over a finite
//! enum rather than a sprawl of key-specific branches.

use core_events::{KeyToken, ModMask, NamedKey};
use std::collections::HashMap;

/// The closed command vocabulary the editor loop dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCommand {
    BeginningOfLine,
    EndOfLine,
    BeginningOfBuffer,
    EndOfBuffer,
    ForwardChar,
    BackwardChar,
    ForwardWord,
    BackwardWord,
    ForwardBigword,
    BackwardBigword,
    UpLine,
    DownLine,
    Null,
    Cancel,
    ForceRepaint,
    Repaint,
    Eof,
    Complete,
    CompleteAndSearch,
    PagerToggleSearch,
    KillLine,
    BackwardKillLine,
    KillWholeLine,
    Yank,
    YankPop,
    BackwardDeleteChar,
    DeleteChar,
    Execute,
    HistorySearchBackward,
    HistorySearchForward,
    HistoryTokenSearchBackward,
    HistoryTokenSearchForward,
    SuppressAutosuggestion,
    AcceptAutosuggestion,
    TransposeChars,
    TransposeWords,
    UpWord,
    DownWord,
    CapitalizeWord,
    BeginSelection,
    SwapSelectionStartStop,
    EndSelection,
    KillSelection,
    ForwardJump,
    ForwardJumpTill,
    BackwardJump,
    BackwardJumpTill,
    RepeatJump,
    ReverseRepeatJump,
}

/// A flat, total table from key chord to command. Later bindings registered
/// for the same chord replace earlier ones, so callers can layer a user
/// config on top of [`Keymap::defaults`] by calling [`Keymap::bind`] again.
#[derive(Debug, Default)]
pub struct Keymap {
    bindings: HashMap<KeyToken, InputCommand>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, token: KeyToken, command: InputCommand) {
        self.bindings.insert(token, command);
    }

    pub fn resolve(&self, token: &KeyToken) -> Option<InputCommand> {
        self.bindings.get(token).copied()
    }

    /// The emacs-style default bindings a shell's interactive mode normally
    /// ships with; self-insertion for plain characters is handled by the
    /// editor loop before falling back to this table, not represented here.
    pub fn defaults() -> Self {
        let mut map = Self::new();
        let ctrl = |c: char| KeyToken::Chord {
            base: Box::new(KeyToken::Char(c)),
            mods: ModMask::CTRL,
        };
        let alt = |c: char| KeyToken::Chord {
            base: Box::new(KeyToken::Char(c)),
            mods: ModMask::ALT,
        };
        let named = |k: NamedKey| KeyToken::Named(k);

        map.bind(ctrl('a'), InputCommand::BeginningOfLine);
        map.bind(ctrl('e'), InputCommand::EndOfLine);
        map.bind(named(NamedKey::Home), InputCommand::BeginningOfLine);
        map.bind(named(NamedKey::End), InputCommand::EndOfLine);
        map.bind(alt('<'), InputCommand::BeginningOfBuffer);
        map.bind(alt('>'), InputCommand::EndOfBuffer);
        map.bind(named(NamedKey::Right), InputCommand::ForwardChar);
        map.bind(named(NamedKey::Left), InputCommand::BackwardChar);
        map.bind(ctrl('f'), InputCommand::ForwardChar);
        map.bind(ctrl('b'), InputCommand::BackwardChar);
        map.bind(alt('f'), InputCommand::ForwardWord);
        map.bind(alt('b'), InputCommand::BackwardWord);
        let ctrl_named = |k: NamedKey| KeyToken::Chord {
            base: Box::new(KeyToken::Named(k)),
            mods: ModMask::CTRL,
        };
        map.bind(ctrl_named(NamedKey::Right), InputCommand::ForwardBigword);
        map.bind(ctrl_named(NamedKey::Left), InputCommand::BackwardBigword);
        map.bind(named(NamedKey::Up), InputCommand::UpLine);
        map.bind(named(NamedKey::Down), InputCommand::DownLine);
        map.bind(ctrl('c'), InputCommand::Cancel);
        map.bind(ctrl('l'), InputCommand::ForceRepaint);
        map.bind(ctrl('d'), InputCommand::Eof);
        map.bind(named(NamedKey::Tab), InputCommand::Complete);
        map.bind(alt(','), InputCommand::CompleteAndSearch);
        map.bind(ctrl('k'), InputCommand::KillLine);
        map.bind(ctrl('u'), InputCommand::BackwardKillLine);
        map.bind(ctrl('y'), InputCommand::Yank);
        map.bind(alt('y'), InputCommand::YankPop);
        map.bind(named(NamedKey::Backspace), InputCommand::BackwardDeleteChar);
        map.bind(named(NamedKey::Delete), InputCommand::DeleteChar);
        map.bind(named(NamedKey::Enter), InputCommand::Execute);
        map.bind(alt('p'), InputCommand::HistorySearchBackward);
        map.bind(alt('n'), InputCommand::HistorySearchForward);
        map.bind(ctrl('t'), InputCommand::TransposeChars);
        map.bind(alt('t'), InputCommand::TransposeWords);
        map.bind(alt('u'), InputCommand::UpWord);
        map.bind(alt('l'), InputCommand::DownWord);
        map.bind(alt('c'), InputCommand::CapitalizeWord);
        map.bind(ctrl('g'), InputCommand::EndSelection);
        map
    }
}
