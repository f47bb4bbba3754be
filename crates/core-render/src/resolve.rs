//! Highlight-spec -> concrete escape sequence resolution (§4.3 step 5,
//! "Translate the highlight role to concrete foreground/background through
//! the environment variables in §6").

use core_color::{ColorSpec, ColorSupport, HighlightRole, HighlightSpec, best_color};
use core_config::{ColorCache, ColorEnvironment};
use core_terminal::TerminalCapabilities;

/// Resolves [`HighlightSpec`]s to ANSI byte sequences against a color
/// environment (the `fish_color_*`/`fish_pager_color_*` variables) and the
/// terminal's negotiated color support, caching per-role lookups until the
/// caller bumps `env_version` (a config reload or `set` of a color
/// variable).
pub struct StyleResolver<'a> {
    env: &'a dyn ColorEnvironment,
    cache: ColorCache,
    support: ColorSupport,
}

impl<'a> StyleResolver<'a> {
    pub fn new(env: &'a dyn ColorEnvironment, support: ColorSupport) -> Self {
        Self {
            env,
            cache: ColorCache::new(),
            support,
        }
    }

    /// The byte sequence to emit when transitioning onto a cell with
    /// `spec`: a reset (if the capability table has one) followed by the
    /// resolved attributes and colors for that spec's foreground/background
    /// roles.
    pub fn sequence_for(&mut self, spec: HighlightSpec, caps: &TerminalCapabilities, env_version: u64) -> String {
        let mut out = String::new();
        if let Some(reset) = caps.exit_attribute_mode {
            out.push_str(reset);
        }

        let fg_role = spec.foreground.unwrap_or(HighlightRole::Normal);
        let fg = self.cache.resolve(fg_role, self.env, env_version);

        if fg.attrs.bold {
            if let Some(s) = caps.enter_bold_mode {
                out.push_str(s);
            }
        }
        if fg.attrs.underline || spec.force_underline {
            if let Some(s) = caps.enter_underline_mode {
                out.push_str(s);
            }
        }
        if fg.attrs.italics {
            if let Some(s) = caps.enter_italics_mode {
                out.push_str(s);
            }
        }
        if fg.attrs.dim {
            if let Some(s) = caps.enter_dim_mode {
                out.push_str(s);
            }
        }
        if fg.attrs.reverse {
            if let Some(s) = caps.enter_reverse_mode {
                out.push_str(s);
            }
        }

        push_foreground(&mut out, fg.foreground, self.support);

        let bg_role = spec.background.unwrap_or(HighlightRole::Normal);
        if bg_role != HighlightRole::Normal {
            let bg = self.cache.resolve(bg_role, self.env, env_version);
            push_background(&mut out, bg.foreground, self.support);
        }

        out
    }
}

/// Fold `spec` through [`best_color`] against `support`, then render it as
/// an SGR foreground sequence. A `Named` index `>= NAMED_COLORS.len()` is a
/// direct 256-palette reference produced by `best_color`'s RGB fold, per its
/// own documented contract.
fn push_foreground(out: &mut String, spec: ColorSpec, support: ColorSupport) {
    match best_color(&[spec], support) {
        ColorSpec::Named(idx) => push_named(out, idx, false),
        ColorSpec::Rgb(r, g, b) => out.push_str(&format!("\x1b[38;2;{r};{g};{b}m")),
        ColorSpec::Normal | ColorSpec::None => {}
        ColorSpec::Reset => out.push_str("\x1b[39m"),
    }
}

fn push_background(out: &mut String, spec: ColorSpec, support: ColorSupport) {
    match best_color(&[spec], support) {
        ColorSpec::Named(idx) => push_named(out, idx, true),
        ColorSpec::Rgb(r, g, b) => out.push_str(&format!("\x1b[48;2;{r};{g};{b}m")),
        ColorSpec::Normal | ColorSpec::None => {}
        ColorSpec::Reset => out.push_str("\x1b[49m"),
    }
}

const ANSI_BASE: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

fn push_named(out: &mut String, idx: u8, background: bool) {
    if (idx as usize) < ANSI_BASE.len() {
        let code = 30 + idx + if background { 10 } else { 0 };
        out.push_str(&format!("\x1b[{code}m"));
    } else if idx == 8 {
        // Bright black (the "brblack"/grey alias).
        out.push_str(if background { "\x1b[100m" } else { "\x1b[90m" });
    } else if idx == 9 {
        out.push_str(if background { "\x1b[107m" } else { "\x1b[97m" });
    } else {
        // A direct 256-color palette index produced by best_color's RGB
        // fold under term256 support.
        let kind = if background { 48 } else { 38 };
        out.push_str(&format!("\x1b[{kind};5;{idx}m"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapEnv(HashMap<String, String>);
    impl ColorEnvironment for MapEnv {
        fn get(&self, variable: &str) -> Option<String> {
            self.0.get(variable).cloned()
        }
    }

    #[test]
    fn resolves_named_foreground() {
        let mut env = HashMap::new();
        env.insert("fish_color_error".to_string(), "red".to_string());
        let env = MapEnv(env);
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let spec = HighlightSpec::new(HighlightRole::Error);
        let seq = resolver.sequence_for(spec, &caps, 1);
        assert!(seq.contains("\x1b[31m"), "expected red foreground in {seq:?}");
    }

    #[test]
    fn bold_attribute_emits_enter_bold() {
        let mut env = HashMap::new();
        env.insert("fish_color_command".to_string(), "green -o".to_string());
        let env = MapEnv(env);
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let spec = HighlightSpec::new(HighlightRole::Command);
        let seq = resolver.sequence_for(spec, &caps, 1);
        assert!(seq.contains("\x1b[1m"));
    }

    #[test]
    fn background_normal_means_inherit() {
        let env = MapEnv(HashMap::new());
        let caps = TerminalCapabilities::detect();
        let mut resolver = StyleResolver::new(&env, caps.color_support);
        let spec = HighlightSpec::new(HighlightRole::Normal);
        let seq = resolver.sequence_for(spec, &caps, 1);
        assert!(!seq.contains("\x1b[4")); // no background SGR at all
    }
}
