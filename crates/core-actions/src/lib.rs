//! Abbreviation expansion, completion application, and the editor loop's
//! dispatch table (C8 + C10, §4.8 + §4.10).
//!
//! This crate is where C7 (editable line), C6 (history), C5 (pager) and the
//! external parser/completion collaborators (§6) all get pulled together
//! into the single per-keystroke dispatch function the binary drives.

pub mod abbrev;
pub mod complete_apply;
pub mod editor;
pub mod highlighter;
pub mod parser_api;
pub mod suggest;

pub use abbrev::expand_abbreviation;
pub use complete_apply::{ApplyResult, apply_completion};
pub use editor::{DispatchOutcome, EditorDeps, EditorLoop};
pub use highlighter::highlight;
pub use parser_api::{NaiveParser, ParseError, ParseOutcome, ParserApi};
pub use suggest::suggest_from_history;
