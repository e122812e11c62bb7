//! Selector-list splitting and scope-class insertion.
//!
//! A selector list is split on top-level commas only: commas inside
//! comments, string literals, parentheses (`:is(a, b)`) or attribute
//! brackets (`[title="a,b"]`) belong to the selector they appear in.
//!
//! Each selector then gets the scope class inserted before its first real
//! character, after any leading whitespace and complete comments, so the
//! original layout of the text is kept around the insertion.

/// Removes every complete `/* ... */` span from `text`.
///
/// An unterminated comment is left in place.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("/*") {
        match rest[open + 2..].find("*/") {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + 2 + close + 2..];
            }
            None => break,
        }
    }

    out.push_str(rest);
    out
}

/// Splits a selector list on its top-level commas.
///
/// Always returns at least one part; empty input yields `[""]`.
pub fn split_selector_list(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut in_comment = false;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if in_comment {
            if c == '*' && matches!(chars.peek(), Some((_, '/'))) {
                chars.next();
                in_comment = false;
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
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                in_comment = true;
            }
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.push(&text[start..]);
    parts
}

/// Inserts `scope_class` in front of every selector of `selector_text`.
///
/// `scope_class` is the full class token, dot included (`.my-theme`).
/// Selectors that already start with exactly that class are left alone,
/// which makes the operation idempotent.
///
/// ```rust
/// use cellsheet_scope::prefix_selectors;
///
/// assert_eq!(
///     prefix_selectors("a, /* c,d */ .foo", ".ns"),
///     ".ns a, /* c,d */ .ns .foo"
/// );
/// assert_eq!(prefix_selectors(".ns .foo", ".ns"), ".ns .foo");
/// ```
pub fn prefix_selectors(selector_text: &str, scope_class: &str) -> String {
    if scope_class.trim().is_empty() {
        return selector_text.to_string();
    }

    split_selector_list(selector_text)
        .into_iter()
        .map(|part| prefix_one(part, scope_class))
        .collect::<Vec<_>>()
        .join(",")
}

fn prefix_one(part: &str, scope_class: &str) -> String {
    if is_already_scoped(part, scope_class) {
        return part.to_string();
    }

    match insertion_point(part) {
        Some(at) => {
            let mut out = String::with_capacity(part.len() + scope_class.len() + 1);
            out.push_str(&part[..at]);
            out.push_str(scope_class);
            out.push(' ');
            out.push_str(&part[at..]);
            out
        }
        None => part.to_string(),
    }
}

/// Checks whether `part` already begins with `scope_class` as a whole token.
fn is_already_scoped(part: &str, scope_class: &str) -> bool {
    let clean = strip_comments(part);
    let Some(rest) = clean.trim().strip_prefix(scope_class) else {
        return false;
    };

    match rest.chars().next() {
        None => true,
        Some(c) => {
            c.is_whitespace() || matches!(c, '>' | '+' | '~' | '.' | '#' | ':' | '[' | '{' | ',')
        }
    }
}

/// Byte offset of the first character that is neither whitespace nor part of
/// a complete comment. `None` when there is no such character.
fn insertion_point(part: &str) -> Option<usize> {
    let mut offset = 0;
    let mut rest = part;

    loop {
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();
        rest = trimmed;

        if rest.is_empty() {
            return None;
        }

        if let Some(after) = rest.strip_prefix("/*") {
            if let Some(close) = after.find("*/") {
                let consumed = 2 + close + 2;
                offset += consumed;
                rest = &rest[consumed..];
                continue;
            }
        }

        return Some(offset);
    }
}
