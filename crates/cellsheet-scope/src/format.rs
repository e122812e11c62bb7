//! Brace-depth re-indentation of CSS fragments.
//!
//! Every line is trimmed and re-indented by the number of blocks open before
//! it. A line starting with `}` is printed one level out. Braces inside
//! comments and string literals do not count, and depth never drops below
//! zero, so unbalanced input still formats.

/// Indentation emitted per nesting level.
pub const INDENT_UNIT: &str = "    ";

/// Separator placed between formatted lines.
pub const LINE_SEPARATOR: &str = "\n";

/// Re-indents `css` from its brace nesting. Blank lines are dropped.
///
/// ```rust
/// use cellsheet_scope::format_block;
///
/// assert_eq!(
///     format_block(".a {\ncolor: red;\n      }"),
///     ".a {\n    color: red;\n}"
/// );
/// ```
pub fn format_block(css: &str) -> String {
    let mut counter = BraceCounter::default();
    let mut depth = 0usize;
    let mut lines = Vec::new();

    for raw in css.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let level = if line.starts_with('}') && !counter.in_comment {
            depth.saturating_sub(1)
        } else {
            depth
        };
        lines.push(format!("{}{}", INDENT_UNIT.repeat(level), line));

        let (opens, closes) = counter.count(line);
        depth = (depth + opens).saturating_sub(closes);
    }

    lines.join(LINE_SEPARATOR)
}

/// Counts structural braces line by line, carrying comment state across lines.
#[derive(Debug, Default)]
struct BraceCounter {
    in_comment: bool,
}

impl BraceCounter {
    fn count(&mut self, line: &str) -> (usize, usize) {
        let mut opens = 0;
        let mut closes = 0;
        let mut quote: Option<char> = None;
        let mut escaped = false;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if self.in_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_comment = false;
                }
                continue;
            }

            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.in_comment = true;
                }
                '"' | '\'' => quote = Some(c),
                '{' => opens += 1,
                '}' => closes += 1,
                _ => {}
            }
        }

        (opens, closes)
    }
}
