//! Single-pass CSS scanner that scopes selectors by nesting context.
//!
//! The scanner walks the text once, left to right, with one character of
//! lookahead. It keeps three pieces of state:
//!
//! - whether it is inside a `/* ... */` comment,
//! - whether it is inside a string literal (and which quote opened it),
//! - a [`ContextStack`] of the blocks currently open.
//!
//! Text between structural boundaries (`{`, `}`, and `;` at rule level) is
//! buffered. When a `{` arrives, the buffer is the prelude of the block being
//! opened: an at-rule prelude is copied as-is, a selector list is scoped via
//! [`prefix_selectors`] when the block is opened at rule level.
//!
//! | Context | Entered by | Selectors scoped |
//! |---------|------------|------------------|
//! | `Root` | start of text | yes |
//! | `Container` | `@media`, `@supports`, `@container`, `@document` | yes |
//! | `Protected` | any other at-rule (`@keyframes`, `@font-face`, ...) | no |
//! | `Block` | a style rule | no |
//!
//! Unbalanced input never fails: a `}` with no open block is copied and
//! ignored, an unterminated comment or string swallows the rest of the text.

use std::ops::Range;

use crate::context::{Context, ContextStack};
use crate::prefix::prefix_selectors;

/// One block opened while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    /// Byte range of the block's prelude in the scanned output, `{` excluded.
    pub prelude: Range<usize>,
    /// Context that was current when the block opened.
    pub parent: Context,
    /// Context pushed for the block's body.
    pub context: Context,
    /// At-rule name, without `@`, when the prelude is an at-rule.
    pub at_rule: Option<String>,
    /// Whether the prelude went through the selector prefixer.
    pub scoped: bool,
    /// Nesting depth of the body (1 for a top-level block).
    pub depth: usize,
}

/// Output of a scan: the rewritten text and the blocks it opened, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedCss {
    pub css: String,
    pub blocks: Vec<BlockRecord>,
}

impl ScannedCss {
    /// Returns the prelude text of `block` as it appears in the output.
    pub fn prelude(&self, block: &BlockRecord) -> &str {
        &self.css[block.prelude.clone()]
    }
}

/// Scopes the selectors of CSS text with a fixed scope class.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    scope_class: &'a str,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner for `scope_class`, the full class token (`.name`).
    pub fn new(scope_class: &'a str) -> Self {
        Self { scope_class }
    }

    pub fn scope_class(&self) -> &str {
        self.scope_class
    }

    /// Scans `css` and returns the scoped text plus the block record.
    pub fn scan(&self, css: &str) -> ScannedCss {
        let mut state = ScanState::with_capacity(css.len());
        let mut chars = css.chars().peekable();

        while let Some(c) = chars.next() {
            if state.in_comment {
                state.buffer.push(c);
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state.buffer.push('/');
                    state.in_comment = false;
                }
                continue;
            }

            if let Some(quote) = state.quote {
                state.buffer.push(c);
                if state.escaped {
                    state.escaped = false;
                } else if c == '\\' {
                    state.escaped = true;
                } else if c == quote {
                    state.quote = None;
                }
                continue;
            }

            match c {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state.buffer.push_str("/*");
                    state.in_comment = true;
                }
                '"' | '\'' => {
                    state.quote = Some(c);
                    state.buffer.push(c);
                }
                '{' => state.open_block(self.scope_class),
                '}' => state.close_block(),
                ';' if state.stack.current().scopes_selectors() => state.flush_statement(),
                _ => state.buffer.push(c),
            }
        }

        state.finish()
    }
}

/// Scopes every selector of `css` with `scope_class`.
///
/// ```rust
/// use cellsheet_scope::scope_css;
///
/// let css = "@media (min-width: 500px) { .btn { color: blue; } }";
/// assert_eq!(
///     scope_css(css, ".ns"),
///     "@media (min-width: 500px) { .ns .btn { color: blue; } }"
/// );
/// ```
pub fn scope_css(css: &str, scope_class: &str) -> String {
    Scanner::new(scope_class).scan(css).css
}

/// Builds the class token used to scope with `id`.
pub fn scope_class_for(id: &str) -> String {
    format!(".{}", id.trim())
}

struct ScanState {
    out: String,
    buffer: String,
    stack: ContextStack,
    blocks: Vec<BlockRecord>,
    in_comment: bool,
    quote: Option<char>,
    escaped: bool,
}

impl ScanState {
    fn with_capacity(len: usize) -> Self {
        Self {
            out: String::with_capacity(len + len / 4),
            buffer: String::new(),
            stack: ContextStack::new(),
            blocks: Vec::new(),
            in_comment: false,
            quote: None,
            escaped: false,
        }
    }

    fn open_block(&mut self, scope_class: &str) {
        let parent = self.stack.current();
        let at_rule = trailing_at_rule(&self.buffer);
        let context = at_rule
            .as_deref()
            .map_or(Context::Block, Context::for_at_rule);
        let scoped = at_rule.is_none() && parent.scopes_selectors();

        let start = self.out.len();
        if scoped {
            self.out
                .push_str(&prefix_selectors(&self.buffer, scope_class));
        } else {
            self.out.push_str(&self.buffer);
        }
        let prelude = start..self.out.len();

        self.out.push('{');
        self.buffer.clear();
        self.stack.push(context);

        tracing::trace!(?parent, ?context, at_rule = ?at_rule, scoped, "opened block");

        self.blocks.push(BlockRecord {
            prelude,
            parent,
            context,
            at_rule,
            scoped,
            depth: self.stack.depth(),
        });
    }

    fn close_block(&mut self) {
        self.out.push_str(&self.buffer);
        self.buffer.clear();
        self.out.push('}');

        if self.stack.pop().is_none() {
            tracing::trace!(offset = self.out.len(), "ignoring unbalanced closing brace");
        }
    }

    fn flush_statement(&mut self) {
        self.out.push_str(&self.buffer);
        self.buffer.clear();
        self.out.push(';');
    }

    fn finish(mut self) -> ScannedCss {
        self.out.push_str(&self.buffer);
        ScannedCss {
            css: self.out,
            blocks: self.blocks,
        }
    }
}

/// Finds an `@name` token in a block prelude, ignoring comments and strings.
///
/// Returns the first at-rule name written after the last `{` of the prelude.
fn trailing_at_rule(prelude: &str) -> Option<String> {
    let clean = code_only(prelude);
    let tail = match clean.rfind('{') {
        Some(i) => &clean[i + 1..],
        None => clean.as_str(),
    };

    tail.match_indices('@').find_map(|(i, _)| {
        let name: String = tail[i + 1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        (!name.is_empty()).then_some(name)
    })
}

/// `prelude` with comments and string literals removed.
fn code_only(prelude: &str) -> String {
    let mut out = String::with_capacity(prelude.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = prelude.chars().peekable();

    while let Some(c) = chars.next() {
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
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => quote = Some(c),
            _ => out.push(c),
        }
    }

    out
}
