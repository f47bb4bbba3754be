//! Prompt layout engine (C4).
//!
//! Chooses, among five candidate layouts, the first that fits a left
//! prompt, right prompt, the first line of the command, and an
//! autosuggestion into the available screen width.

use core_text::{AttributeEscapeSet, PromptLayout, PromptLayoutCache, calc_prompt_layout, measure_run};

const ELLIPSIS: &str = "…";

/// Inputs to one layout decision.
pub struct PromptInputs<'a> {
    pub left: &'a str,
    pub right: &'a str,
    pub command: &'a str,
    pub autosuggestion: &'a str,
    pub width: usize,
}

/// The chosen layout: truncated left/right prompts and however much of the
/// autosuggestion (if any) should be drawn after the command's first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub left: PromptLayout,
    pub right: Option<PromptLayout>,
    pub autosuggestion: Option<String>,
    pub layout_used: LayoutChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChoice {
    Full,
    NoAutosuggestion,
    NoRightFullAutosuggestion,
    NoRightTruncatedAutosuggestion,
    Fallback,
}

fn first_line(command: &str) -> &str {
    command.split('\n').next().unwrap_or("")
}

fn truncate_autosuggestion(a: &str, budget: usize, attrs: &AttributeEscapeSet) -> Option<String> {
    if budget < 2 {
        return None;
    }
    let ellipsis_w = measure_run(ELLIPSIS, attrs);
    let char_budget = budget - ellipsis_w;
    let mut out = String::new();
    let mut w = 0usize;
    for g in unicode_segmentation::UnicodeSegmentation::graphemes(a, true) {
        let gw = measure_run(g, attrs);
        if w + gw > char_budget {
            break;
        }
        w += gw;
        out.push_str(g);
    }
    out.push_str(ELLIPSIS);
    Some(out)
}

/// Compute the composed prompt per §4.4's five-layout fit rule.
pub fn compose(
    inputs: &PromptInputs<'_>,
    attrs: &AttributeEscapeSet,
    cache: &mut PromptLayoutCache,
) -> ComposedPrompt {
    let width = inputs.width;
    let left = cache.get_or_compute(inputs.left, width, attrs);
    let right = cache.get_or_compute(inputs.right, width, attrs);
    let first = first_line(inputs.command);
    let first_width = measure_run(first, attrs);
    let command_has_newline = inputs.command.contains('\n');
    let a_width = measure_run(inputs.autosuggestion, attrs);

    let l = left.last_line_width;
    let r = right.last_line_width;

    let fits = |w: usize| w <= width;

    if !command_has_newline && !inputs.autosuggestion.is_empty() && fits(l + r + first_width + a_width) {
        return ComposedPrompt {
            left,
            right: Some(right),
            autosuggestion: Some(inputs.autosuggestion.to_string()),
            layout_used: LayoutChoice::Full,
        };
    }

    if fits(l + r + first_width) {
        let remaining = width.saturating_sub(l + r + first_width);
        let autosuggestion = if !command_has_newline && !inputs.autosuggestion.is_empty() && remaining >= 2 {
            truncate_autosuggestion(inputs.autosuggestion, remaining, attrs)
        } else {
            None
        };
        return ComposedPrompt {
            left,
            right: Some(right),
            autosuggestion,
            layout_used: LayoutChoice::NoAutosuggestion,
        };
    }

    if !command_has_newline && !inputs.autosuggestion.is_empty() && fits(l + first_width + a_width) {
        return ComposedPrompt {
            left,
            right: None,
            autosuggestion: Some(inputs.autosuggestion.to_string()),
            layout_used: LayoutChoice::NoRightFullAutosuggestion,
        };
    }

    if fits(l + first_width) {
        let remaining = width.saturating_sub(l + first_width);
        let autosuggestion = if !command_has_newline && !inputs.autosuggestion.is_empty() && remaining >= 2 {
            truncate_autosuggestion(inputs.autosuggestion, remaining, attrs)
        } else {
            None
        };
        return ComposedPrompt {
            left,
            right: None,
            autosuggestion,
            layout_used: LayoutChoice::NoRightTruncatedAutosuggestion,
        };
    }

    // Fallback: may exceed width; the screen diff engine and terminal handle
    // the consequences.
    ComposedPrompt {
        left,
        right: None,
        autosuggestion: if command_has_newline {
            None
        } else {
            Some(inputs.autosuggestion.to_string())
        },
        layout_used: LayoutChoice::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> AttributeEscapeSet {
        AttributeEscapeSet::default()
    }

    #[test]
    fn full_layout_when_everything_fits() {
        let mut cache = PromptLayoutCache::default();
        let inputs = PromptInputs {
            left: "$ ",
            right: "",
            command: "echo hi",
            autosuggestion: " there",
            width: 80,
        };
        let composed = compose(&inputs, &attrs(), &mut cache);
        assert_eq!(composed.layout_used, LayoutChoice::Full);
        assert_eq!(composed.autosuggestion.as_deref(), Some(" there"));
    }

    #[test]
    fn drops_autosuggestion_when_command_has_newline() {
        let mut cache = PromptLayoutCache::default();
        let inputs = PromptInputs {
            left: "$ ",
            right: "",
            command: "echo hi\nworld",
            autosuggestion: " there",
            width: 80,
        };
        let composed = compose(&inputs, &attrs(), &mut cache);
        assert!(composed.autosuggestion.is_none());
    }

    #[test]
    fn drops_right_prompt_when_too_narrow() {
        let mut cache = PromptLayoutCache::default();
        let inputs = PromptInputs {
            left: "myprompt> ",
            right: "[12:00]",
            command: "a very long command that eats the line",
            autosuggestion: "",
            width: 45,
        };
        let composed = compose(&inputs, &attrs(), &mut cache);
        assert!(composed.right.is_none());
    }

    #[test]
    fn fallback_when_nothing_fits() {
        let mut cache = PromptLayoutCache::default();
        let inputs = PromptInputs {
            left: "a-prompt-wider-than-the-terminal-itself> ",
            right: "",
            command: "x",
            autosuggestion: "",
            width: 5,
        };
        let composed = compose(&inputs, &attrs(), &mut cache);
        assert_eq!(composed.layout_used, LayoutChoice::Fallback);
    }
}
