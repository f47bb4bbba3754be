//! The external parser collaborator (§6 "Parser (external)").
//!
//! The parser/AST/expander that decides whether a command is syntactically
//! complete lives outside the interactive front-end core; this trait is the
//! narrow surface the editor loop and C10 call into it through.

/// Outcome of [`ParserApi::detect_errors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub ok: bool,
    pub incomplete: bool,
    pub errors: Vec<ParseError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub start: usize,
    pub end: usize,
    pub message: String,
}

impl ParseOutcome {
    pub fn ok() -> Self {
        Self {
            ok: true,
            incomplete: false,
            errors: Vec::new(),
        }
    }

    pub fn incomplete() -> Self {
        Self {
            ok: false,
            incomplete: true,
            errors: Vec::new(),
        }
    }
}

pub trait ParserApi: Send + Sync {
    /// Parse `text`; when `accept_incomplete` is true, a command that is
    /// merely unterminated (an open quote, an open block) is reported as
    /// `incomplete` rather than an error.
    fn detect_errors(&self, text: &str, accept_incomplete: bool) -> ParseOutcome;

    /// Find the innermost command substitution `( ... )` whose span
    /// contains `cursor`, returning its interior's byte range. Returns
    /// `(0, text.len())` when the cursor is not inside any substitution.
    fn locate_cmdsubst_extent(&self, text: &str, cursor: usize) -> (usize, usize);
}

/// A conservative stand-in used by tests and by callers that have no real
/// parser wired up yet: every command is complete unless it ends with an
/// odd number of trailing unescaped quote characters of one kind, and
/// command substitutions are matched by plain, unescaped parenthesis
/// nesting.
#[derive(Debug, Default)]
pub struct NaiveParser;

impl ParserApi for NaiveParser {
    fn detect_errors(&self, text: &str, accept_incomplete: bool) -> ParseOutcome {
        let mut single = false;
        let mut double = false;
        let mut depth: i32 = 0;
        let mut escaped = false;
        for c in text.chars() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if !single => escaped = true,
                '\'' if !double => single = !single,
                '"' if !single => double = !double,
                '(' if !single && !double => depth += 1,
                ')' if !single && !double => depth -= 1,
                _ => {}
            }
        }
        let unterminated = single || double || depth > 0;
        if unterminated && accept_incomplete {
            ParseOutcome::incomplete()
        } else if unterminated {
            ParseOutcome {
                ok: false,
                incomplete: false,
                errors: vec![ParseError {
                    start: 0,
                    end: text.len(),
                    message: "unterminated quote or command substitution".to_string(),
                }],
            }
        } else {
            ParseOutcome::ok()
        }
    }

    fn locate_cmdsubst_extent(&self, text: &str, cursor: usize) -> (usize, usize) {
        let bytes = text.as_bytes();
        let mut stack = Vec::new();
        let mut innermost = None;
        let mut escaped = false;
        let mut single = false;
        let mut double = false;
        for (i, &b) in bytes.iter().enumerate() {
            let c = b as char;
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' if !single => escaped = true,
                '\'' if !double => single = !single,
                '"' if !single => double = !double,
                '(' if !single && !double => stack.push(i + 1),
                ')' if !single && !double => {
                    if let Some(start) = stack.pop()
                        && start <= cursor
                        && cursor <= i
                    {
                        innermost = Some((start, i));
                    }
                }
                _ => {}
            }
        }
        // An unterminated `(` still containing the cursor is an open
        // substitution extending to the end of the text.
        if let Some(&start) = stack.last()
            && start <= cursor
        {
            return (start, text.len());
        }
        innermost.unwrap_or((0, text.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_text_is_complete() {
        let parser = NaiveParser;
        let outcome = parser.detect_errors("echo hi", true);
        assert!(outcome.ok);
    }

    #[test]
    fn unterminated_quote_is_incomplete_when_accepted() {
        let parser = NaiveParser;
        let outcome = parser.detect_errors("echo 'hi", true);
        assert!(outcome.incomplete);
    }

    #[test]
    fn unterminated_quote_is_an_error_when_not_accepted() {
        let parser = NaiveParser;
        let outcome = parser.detect_errors("echo 'hi", false);
        assert!(!outcome.ok);
        assert!(!outcome.errors.is_empty());
    }

    #[test]
    fn locates_enclosing_command_substitution() {
        let parser = NaiveParser;
        let text = "echo (while true; echo blah; end)";
        let cursor = text.find("blah").unwrap();
        let (start, end) = parser.locate_cmdsubst_extent(text, cursor);
        assert_eq!(&text[start..end], "while true; echo blah; end");
    }

    #[test]
    fn outside_any_substitution_spans_whole_text() {
        let parser = NaiveParser;
        let (start, end) = parser.locate_cmdsubst_extent("echo hi", 3);
        assert_eq!((start, end), (0, "echo hi".len()));
    }
}
