//! Color specification and attribute model (C2).
//!
//! Parses the color tokens accepted by `fish_color_*` / `fish_pager_color_*`
//! style variables and picks the best representable candidate for a given
//! terminal capability set.

use std::fmt;

pub mod highlight;
pub use highlight::{HighlightRole, HighlightSpec};

/// Indices into the 10 portable named colors (the classic ANSI 8 plus the two
/// `normal`/`reset` pseudo-names are modeled separately, see [`ColorSpec`]).
pub const NAMED_COLORS: [&str; 10] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white", "brblack", "brwhite",
];

/// A single color value. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpec {
    #[default]
    None,
    /// Index into [`NAMED_COLORS`].
    Named(u8),
    Rgb(u8, u8, u8),
    /// Inherit whatever the terminal's current default is.
    Normal,
    /// Explicitly reset to terminal defaults.
    Reset,
}

impl ColorSpec {
    /// A color spec is "special" if it is neither `Named` nor `Rgb` — i.e. it
    /// carries no concrete palette entry of its own.
    pub fn is_special(&self) -> bool {
        !matches!(self, ColorSpec::Named(_) | ColorSpec::Rgb(..))
    }
}

/// Independent text attributes. A color spec always travels with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attributes {
    pub bold: bool,
    pub underline: bool,
    pub italics: bool,
    pub dim: bool,
    pub reverse: bool,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        *self == Attributes::default()
    }
}

/// Terminal color support the renderer negotiated at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSupport {
    pub term256: bool,
    pub term24bit: bool,
}

/// The result of parsing one `fish_color_*`-style variable value: zero or
/// more space-separated tokens collapse into a single color (last one wins
/// for the foreground, `-b` sets background) plus an attribute bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParsedColor {
    pub foreground: ColorSpec,
    pub background: ColorSpec,
    pub attrs: Attributes,
}

/// Parse a single whitespace-separated token stream into a color + attributes.
///
/// Unknown tokens are ignored rather than treated as a parse failure — this
/// matches the teacher's "be forgiving about config values" posture and the
/// spec's "unknown tokens yield None" rule (folded into: they simply don't
/// contribute a color).
pub fn parse_color_tokens(value: &str) -> ParsedColor {
    let mut out = ParsedColor::default();
    let mut tokens = value.split_whitespace().peekable();
    while let Some(tok) = tokens.next() {
        match tok {
            "-o" | "--bold" => out.attrs.bold = true,
            "-u" | "--underline" => out.attrs.underline = true,
            "-i" | "--italics" => out.attrs.italics = true,
            "-d" | "--dim" => out.attrs.dim = true,
            "-r" | "--reverse" => out.attrs.reverse = true,
            "-b" | "--background" => {
                if let Some(bg_tok) = tokens.next()
                    && let Some(spec) = parse_single_color(bg_tok)
                {
                    out.background = spec;
                }
            }
            other => {
                if let Some(spec) = parse_single_color(other) {
                    out.foreground = spec;
                }
            }
        }
    }
    out
}

/// Parse one color word: hex triple (with or without leading `#`), a named
/// color, or the special words `normal`/`reset`.
pub fn parse_single_color(token: &str) -> Option<ColorSpec> {
    let lower = token.to_ascii_lowercase();
    match lower.as_str() {
        "normal" => return Some(ColorSpec::Normal),
        "reset" => return Some(ColorSpec::Reset),
        _ => {}
    }
    if let Some(idx) = NAMED_COLORS.iter().position(|n| *n == lower) {
        return Some(ColorSpec::Named(idx as u8));
    }
    // Aliases the teacher and fish both recognize.
    match lower.as_str() {
        "grey" | "gray" | "brblack" => return Some(ColorSpec::Named(8)),
        "brwhite" => return Some(ColorSpec::Named(9)),
        _ => {}
    }
    parse_hex(&lower)
}

fn parse_hex(s: &str) -> Option<ColorSpec> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(ColorSpec::Rgb(r, g, b))
        }
        3 => {
            let expand = |c: char| -> Option<u8> {
                let v = c.to_digit(16)? as u8;
                Some(v * 16 + v)
            };
            let mut chars = hex.chars();
            let r = expand(chars.next()?)?;
            let g = expand(chars.next()?)?;
            let b = expand(chars.next()?)?;
            Some(ColorSpec::Rgb(r, g, b))
        }
        _ => None,
    }
}

/// The 256-color xterm palette's first 16 RGB approximations, used to fold an
/// RGB color down to the nearest named color when 256-color support is also
/// unavailable.
const NAMED_RGB_APPROX: [(u8, u8, u8); 10] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 255, 255),
];

fn nearest_named(r: u8, g: u8, b: u8) -> ColorSpec {
    let mut best = 0usize;
    let mut best_dist = u32::MAX;
    for (idx, (nr, ng, nb)) in NAMED_RGB_APPROX.iter().enumerate() {
        let dr = r as i32 - *nr as i32;
        let dg = g as i32 - *ng as i32;
        let db = b as i32 - *nb as i32;
        let dist = (dr * dr + dg * dg + db * db) as u32;
        if dist < best_dist {
            best_dist = dist;
            best = idx;
        }
    }
    ColorSpec::Named(best as u8)
}

/// xterm 256-color cube: 16 system colors, a 6x6x6 cube, then a 24-step gray
/// ramp. We fold RGB into the nearest cube/ramp index.
fn nearest_256(r: u8, g: u8, b: u8) -> u8 {
    let to_cube = |v: u8| -> u8 {
        if v < 48 {
            0
        } else if v < 115 {
            1
        } else {
            ((v as u32 - 35) / 40).min(5) as u8
        }
    };
    let cr = to_cube(r);
    let cg = to_cube(g);
    let cb = to_cube(b);
    16 + 36 * cr + 6 * cg + cb
}

/// Best-match a list of candidate colors against the terminal's support mask.
///
/// Preference order: 24-bit RGB first if the terminal supports it; otherwise
/// fold to the nearest 256-color index; otherwise fold to the nearest of the
/// 8 (well, 10 counting bright black/white) named colors. Idempotent: running
/// `best_color` again on its own output returns the same value.
pub fn best_color(candidates: &[ColorSpec], support: ColorSupport) -> ColorSpec {
    let mut best: Option<ColorSpec> = None;
    for cand in candidates {
        match cand {
            ColorSpec::Rgb(r, g, b) => {
                if support.term24bit {
                    return *cand;
                }
                let folded = if support.term256 {
                    // Represent a 256-color fold as a Named index into the
                    // cube; callers resolving to escape sequences special-case
                    // indices >= NAMED_COLORS.len() as direct 256-palette refs.
                    ColorSpec::Named(nearest_256(*r, *g, *b))
                } else {
                    nearest_named(*r, *g, *b)
                };
                best.get_or_insert(folded);
            }
            ColorSpec::Named(_) => {
                best.get_or_insert(*cand);
            }
            ColorSpec::Normal | ColorSpec::Reset | ColorSpec::None => {
                best.get_or_insert(*cand);
            }
        }
    }
    best.unwrap_or(ColorSpec::None)
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSpec::None => write!(f, "none"),
            ColorSpec::Named(idx) => write!(
                f,
                "{}",
                NAMED_COLORS.get(*idx as usize).copied().unwrap_or("?")
            ),
            ColorSpec::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            ColorSpec::Normal => write!(f, "normal"),
            ColorSpec::Reset => write!(f, "reset"),
        }
    }
}
