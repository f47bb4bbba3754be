//! Cheapest cursor-motion sequence selection (§4.3 "Diffing": "emit the
//! cheapest cursor motion between the believed and the required position").

use core_terminal::TerminalCapabilities;

/// Render the escape sequence(s) that carry the cursor from `from` to `to`
/// (both `(col, row)`), preferring a parameterized jump when the capability
/// table has one and falling back to single-step repeats otherwise. Moves
/// vertically first, then horizontally, using `\r` whenever the target
/// column is zero since it is cheaper than any leftward repeat.
pub fn cursor_motion(caps: &TerminalCapabilities, from: (usize, usize), to: (usize, usize)) -> String {
    let mut out = String::new();
    let (fx, fy) = from;
    let (tx, ty) = to;

    if ty > fy {
        out.push_str(&vertical(caps, true, ty - fy));
    } else if fy > ty {
        out.push_str(&vertical(caps, false, fy - ty));
    }

    if tx == 0 {
        if fx != 0 {
            out.push('\r');
        }
    } else if tx > fx {
        out.push_str(&horizontal(caps, true, tx - fx));
    } else if fx > tx {
        out.push_str(&horizontal(caps, false, fx - tx));
    }

    out
}

fn vertical(caps: &TerminalCapabilities, down: bool, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    if n > 1 {
        let parm = if down { &caps.parm_down_cursor } else { &caps.parm_up_cursor };
        if let Some(template) = parm {
            return TerminalCapabilities::parameterize(template, n as u16);
        }
    }
    let single = if down { caps.cursor_down } else { caps.cursor_up };
    single.map(|s| s.repeat(n)).unwrap_or_default()
}

fn horizontal(caps: &TerminalCapabilities, right: bool, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    if n > 1 {
        let parm = if right { &caps.parm_right_cursor } else { &caps.parm_left_cursor };
        if let Some(template) = parm {
            return TerminalCapabilities::parameterize(template, n as u16);
        }
    }
    let single = if right { caps.cursor_right } else { caps.cursor_left };
    single.map(|s| s.repeat(n)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_position_emits_nothing() {
        let caps = TerminalCapabilities::detect();
        assert_eq!(cursor_motion(&caps, (3, 1), (3, 1)), "");
    }

    #[test]
    fn moving_to_column_zero_uses_carriage_return() {
        let caps = TerminalCapabilities::detect();
        let seq = cursor_motion(&caps, (5, 0), (0, 0));
        assert_eq!(seq, "\r");
    }

    #[test]
    fn multi_step_right_uses_parameterized_form() {
        let caps = TerminalCapabilities::detect();
        let seq = cursor_motion(&caps, (0, 0), (5, 0));
        assert_eq!(seq, "\x1b[5C");
    }

    #[test]
    fn single_step_down_uses_plain_cap() {
        let caps = TerminalCapabilities::detect();
        let seq = cursor_motion(&caps, (0, 0), (0, 1));
        assert_eq!(seq, "\x1b[B");
    }

    #[test]
    fn dumb_capabilities_produce_no_motion() {
        let caps = TerminalCapabilities::dumb();
        assert_eq!(cursor_motion(&caps, (0, 0), (3, 2)), "");
    }
}
