//! Highlight roles: the closed vocabulary a highlighter assigns to code
//! points, resolved to concrete colors against `fish_color_*`-style config.

use std::fmt;

/// One semantic role a highlighter can assign to a code point. `Normal`
/// background means "inherit" per the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightRole {
    Normal,
    Error,
    Command,
    StatementTerminator,
    Param,
    Comment,
    SearchMatch,
    Operator,
    Escape,
    Quote,
    Redirection,
    Autosuggestion,
    Selection,
    PagerPrefix,
    PagerCompletion,
    PagerDescription,
    PagerProgress,
    PagerSecondary,
    PagerSecondaryCompletion,
    PagerSecondaryDescription,
    PagerSelectedBackground,
    PagerSelectedPrefix,
    PagerSelectedCompletion,
    PagerSelectedDescription,
    PagerBackground,
}

impl fmt::Display for HighlightRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HighlightRole::Normal => "normal",
            HighlightRole::Error => "error",
            HighlightRole::Command => "command",
            HighlightRole::StatementTerminator => "statement_terminator",
            HighlightRole::Param => "param",
            HighlightRole::Comment => "comment",
            HighlightRole::SearchMatch => "search_match",
            HighlightRole::Operator => "operator",
            HighlightRole::Escape => "escape",
            HighlightRole::Quote => "quote",
            HighlightRole::Redirection => "redirection",
            HighlightRole::Autosuggestion => "autosuggestion",
            HighlightRole::Selection => "selection",
            HighlightRole::PagerPrefix => "pager_prefix",
            HighlightRole::PagerCompletion => "pager_completion",
            HighlightRole::PagerDescription => "pager_description",
            HighlightRole::PagerProgress => "pager_progress",
            HighlightRole::PagerSecondary => "pager_secondary",
            HighlightRole::PagerSecondaryCompletion => "pager_secondary_completion",
            HighlightRole::PagerSecondaryDescription => "pager_secondary_description",
            HighlightRole::PagerSelectedBackground => "pager_selected_background",
            HighlightRole::PagerSelectedPrefix => "pager_selected_prefix",
            HighlightRole::PagerSelectedCompletion => "pager_selected_completion",
            HighlightRole::PagerSelectedDescription => "pager_selected_description",
            HighlightRole::PagerBackground => "pager_background",
        };
        write!(f, "{name}")
    }
}

/// The spec attached to a single code point: a role pair plus two flags that
/// don't fit the role vocabulary itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct HighlightSpec {
    pub foreground: Option<HighlightRole>,
    pub background: Option<HighlightRole>,
    pub valid_path: bool,
    pub force_underline: bool,
}

impl HighlightSpec {
    pub fn new(role: HighlightRole) -> Self {
        Self {
            foreground: Some(role),
            background: None,
            valid_path: false,
            force_underline: false,
        }
    }

    pub fn normal() -> Self {
        Self::new(HighlightRole::Normal)
    }

    pub fn with_background(mut self, role: HighlightRole) -> Self {
        self.background = Some(role);
        self
    }

    pub fn with_valid_path(mut self, valid: bool) -> Self {
        self.valid_path = valid;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_has_no_roles() {
        let spec = HighlightSpec::default();
        assert!(spec.foreground.is_none());
        assert!(spec.background.is_none());
        assert!(!spec.valid_path);
    }

    #[test]
    fn builder_sets_fields() {
        let spec = HighlightSpec::new(HighlightRole::Error)
            .with_background(HighlightRole::Selection)
            .with_valid_path(true);
        assert_eq!(spec.foreground, Some(HighlightRole::Error));
        assert_eq!(spec.background, Some(HighlightRole::Selection));
        assert!(spec.valid_path);
    }

    #[test]
    fn role_display_is_snake_case() {
        assert_eq!(HighlightRole::StatementTerminator.to_string(), "statement_terminator");
    }
}
