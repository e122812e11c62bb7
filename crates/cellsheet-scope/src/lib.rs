//! CSS selector scoping and re-indentation.
//!
//! This crate holds the text-level machinery used to keep user-written CSS
//! fragments confined to a namespace class:
//!
//! - [`Scanner`] / [`scope_css`]: a single-pass scanner that tracks comments,
//!   string literals and block nesting, and scopes selectors that sit at rule
//!   level (top level or inside `@media`-like conditional at-rules) while
//!   leaving declarations, at-rule preludes and `@keyframes`-like bodies alone.
//! - [`prefix_selectors`]: inserts a scope class in front of each selector of
//!   a selector list, splitting only on top-level commas.
//! - [`format_block`]: re-indents a fragment from its brace depth.
//!
//! All operations are infallible. Malformed CSS (unbalanced braces,
//! unterminated comments) produces best-effort output, never a panic.
//!
//! # Example
//!
//! ```rust
//! use cellsheet_scope::{format_block, scope_css};
//!
//! let css = "a, /* c,d */ .foo { color: red; }\n@keyframes spin { from { opacity: 0; } }";
//! let scoped = scope_css(css, ".ns");
//!
//! assert_eq!(
//!     scoped,
//!     ".ns a, /* c,d */ .ns .foo { color: red; }\n@keyframes spin { from { opacity: 0; } }"
//! );
//!
//! // Scoping is idempotent.
//! assert_eq!(scope_css(&scoped, ".ns"), scoped);
//!
//! assert_eq!(format_block(".a {\ncolor: red;\n}"), ".a {\n    color: red;\n}");
//! ```

mod context;
mod format;
mod prefix;
mod scanner;

pub use context::{Context, ContextStack, CONDITIONAL_AT_RULES};
pub use format::{format_block, INDENT_UNIT, LINE_SEPARATOR};
pub use prefix::{prefix_selectors, split_selector_list, strip_comments};
pub use scanner::{scope_class_for, scope_css, BlockRecord, ScannedCss, Scanner};
