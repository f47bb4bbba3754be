//! Terminal capability table (§6 "Terminal").
//!
//! The workspace talks to the terminal through `crossterm`, which already
//! targets the ANSI/xterm control-sequence family rather than going through
//! a real terminfo database. [`TerminalCapabilities::detect`] therefore
//! builds the fixed set of capability strings the spec names directly from
//! `$TERM`/`$COLORTERM` instead of a terminfo lookup, but keeps the same
//! shape: any capability can independently come back absent, and a missing
//! cursor-motion capability is what drives the dumb-terminal fallback in
//! `core-render`.

use core_color::ColorSupport;
use core_text::AttributeEscapeSet;

/// One named capability string, or absence (the terminal/terminfo entry
/// doesn't support it).
pub type Cap = Option<&'static str>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub cursor_up: Cap,
    pub cursor_down: Cap,
    pub cursor_left: Cap,
    pub cursor_right: Cap,
    /// Parameterized forms: `{n}` is substituted with the repeat count.
    pub parm_left_cursor: Option<String>,
    pub parm_right_cursor: Option<String>,
    pub parm_up_cursor: Option<String>,
    pub parm_down_cursor: Option<String>,
    pub clr_eol: Cap,
    pub clr_eos: Cap,
    pub enter_bold_mode: Cap,
    pub exit_attribute_mode: Cap,
    pub enter_underline_mode: Cap,
    pub enter_italics_mode: Cap,
    pub exit_italics_mode: Cap,
    pub enter_dim_mode: Cap,
    pub enter_reverse_mode: Cap,
    pub enter_standout_mode: Cap,
    pub exit_standout_mode: Cap,
    pub enter_secure_mode: Cap,
    pub enter_blink_mode: Cap,
    pub enter_alt_charset_mode: Cap,
    pub exit_alt_charset_mode: Cap,
    pub init_tabs: bool,
    pub eat_newline_glitch: bool,
    pub auto_right_margin: bool,
    pub set_a_foreground: bool,
    pub max_colors: u32,
    pub color_support: ColorSupport,
}

impl TerminalCapabilities {
    /// Detect from the process environment. `$TERM` unset or `dumb` yields a
    /// capability set with every cursor-motion capability absent, which
    /// `core-render` interprets as "fall back to the degraded dumb path"
    /// per §4.3.
    pub fn detect() -> Self {
        let term = std::env::var("TERM").unwrap_or_default();
        if term.is_empty() || term == "dumb" {
            return Self::dumb();
        }
        let colorterm = std::env::var("COLORTERM").unwrap_or_default();
        let term24bit = colorterm == "truecolor" || colorterm == "24bit";
        let term256 = term24bit || term.contains("256color");
        let max_colors = if term24bit {
            16_777_216
        } else if term256 {
            256
        } else {
            8
        };
        Self {
            cursor_up: Some("\x1b[A"),
            cursor_down: Some("\x1b[B"),
            cursor_left: Some("\x1b[D"),
            cursor_right: Some("\x1b[C"),
            parm_left_cursor: Some("\x1b[%dD".to_string()),
            parm_right_cursor: Some("\x1b[%dC".to_string()),
            parm_up_cursor: Some("\x1b[%dA".to_string()),
            parm_down_cursor: Some("\x1b[%dB".to_string()),
            clr_eol: Some("\x1b[K"),
            clr_eos: Some("\x1b[J"),
            enter_bold_mode: Some("\x1b[1m"),
            exit_attribute_mode: Some("\x1b[0m"),
            enter_underline_mode: Some("\x1b[4m"),
            enter_italics_mode: Some("\x1b[3m"),
            exit_italics_mode: Some("\x1b[23m"),
            enter_dim_mode: Some("\x1b[2m"),
            enter_reverse_mode: Some("\x1b[7m"),
            enter_standout_mode: Some("\x1b[7m"),
            exit_standout_mode: Some("\x1b[27m"),
            enter_secure_mode: Some("\x1b[8m"),
            enter_blink_mode: Some("\x1b[5m"),
            enter_alt_charset_mode: Some("\x1b(0"),
            exit_alt_charset_mode: Some("\x1b(B"),
            init_tabs: true,
            eat_newline_glitch: true,
            auto_right_margin: true,
            set_a_foreground: true,
            max_colors,
            color_support: ColorSupport { term256, term24bit },
        }
    }

    /// A capability set with nothing but text output: used when `$TERM` is
    /// `dumb`/unset, and by tests of the degraded path.
    pub fn dumb() -> Self {
        Self {
            cursor_up: None,
            cursor_down: None,
            cursor_left: None,
            cursor_right: None,
            parm_left_cursor: None,
            parm_right_cursor: None,
            parm_up_cursor: None,
            parm_down_cursor: None,
            clr_eol: None,
            clr_eos: None,
            enter_bold_mode: None,
            exit_attribute_mode: None,
            enter_underline_mode: None,
            enter_italics_mode: None,
            exit_italics_mode: None,
            enter_dim_mode: None,
            enter_reverse_mode: None,
            enter_standout_mode: None,
            exit_standout_mode: None,
            enter_secure_mode: None,
            enter_blink_mode: None,
            enter_alt_charset_mode: None,
            exit_alt_charset_mode: None,
            init_tabs: false,
            eat_newline_glitch: false,
            auto_right_margin: false,
            set_a_foreground: false,
            max_colors: 0,
            color_support: ColorSupport::default(),
        }
    }

    /// §4.3 dumb-terminal fallback triggers when any of the four cardinal
    /// cursor-motion capabilities is missing.
    pub fn is_dumb(&self) -> bool {
        self.cursor_up.is_none()
            || self.cursor_down.is_none()
            || self.cursor_left.is_none()
            || self.cursor_right.is_none()
    }

    /// Build the attribute-escape recognition set (C1 family 1) from every
    /// `enter_*`/`exit_*` sequence this capability set carries, so the
    /// width/escape cache in `core-text` can recognize them as zero-width.
    pub fn attribute_escape_set(&self) -> AttributeEscapeSet {
        let caps = [
            self.enter_bold_mode,
            self.exit_attribute_mode,
            self.enter_underline_mode,
            self.enter_italics_mode,
            self.exit_italics_mode,
            self.enter_dim_mode,
            self.enter_reverse_mode,
            self.enter_standout_mode,
            self.exit_standout_mode,
            self.enter_secure_mode,
            self.enter_blink_mode,
            self.enter_alt_charset_mode,
            self.exit_alt_charset_mode,
        ];
        let sequences = caps
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect::<Vec<_>>();
        AttributeEscapeSet::new(sequences)
    }

    /// Substitute a repeat count into a parameterized cursor-motion
    /// capability (the `%d` placeholder).
    pub fn parameterize(template: &str, count: u16) -> String {
        template.replace("%d", &count.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumb_has_no_cursor_motion() {
        let caps = TerminalCapabilities::dumb();
        assert!(caps.is_dumb());
    }

    #[test]
    fn detect_falls_back_to_dumb_when_term_unset() {
        // SAFETY: test-only process-wide env mutation; no other test in this
        // crate reads TERM/COLORTERM concurrently.
        unsafe {
            std::env::remove_var("TERM");
        }
        let caps = TerminalCapabilities::detect();
        assert!(caps.is_dumb());
    }

    #[test]
    fn detect_populates_ansi_caps_for_xterm() {
        unsafe {
            std::env::set_var("TERM", "xterm-256color");
            std::env::remove_var("COLORTERM");
        }
        let caps = TerminalCapabilities::detect();
        assert!(!caps.is_dumb());
        assert!(caps.color_support.term256);
        assert!(!caps.color_support.term24bit);
        unsafe {
            std::env::remove_var("TERM");
        }
    }

    #[test]
    fn parameterize_substitutes_count() {
        let s = TerminalCapabilities::parameterize("\x1b[%dD", 5);
        assert_eq!(s, "\x1b[5D");
    }

    #[test]
    fn attribute_escape_set_recognizes_enter_bold() {
        let caps = TerminalCapabilities::detect();
        let set = caps.attribute_escape_set();
        let len = core_text::escape_code_length("\x1b[1mtext", &set);
        assert_eq!(len, "\x1b[1m".len());
    }
}
