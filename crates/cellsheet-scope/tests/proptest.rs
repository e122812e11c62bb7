//! Property-based tests for scoping and formatting.

use cellsheet_scope::{format_block, prefix_selectors, scope_css, INDENT_UNIT};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn simple_selector() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}",
        "\\.[a-z][a-z0-9-]{0,6}",
        "#[a-z]{1,6}",
        "[a-z]{1,4}:hover",
        ":is\\(\\.[a-z]{1,3}, \\.[a-z]{1,3}\\)",
    ]
}

fn selector_list() -> impl Strategy<Value = String> {
    prop::collection::vec(simple_selector(), 1..4).prop_map(|parts| parts.join(", "))
}

fn rule() -> impl Strategy<Value = String> {
    (selector_list(), "[a-z]{1,6}", "[a-z0-9]{1,6}")
        .prop_map(|(sel, prop, val)| format!("{} {{ {}: {}; }}", sel, prop, val))
}

fn stylesheet() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            rule(),
            rule().prop_map(|r| format!("@media (min-width: 10px) {{\n{}\n}}", r)),
            Just("@keyframes k { from { opacity: 0; } }".to_string()),
            Just("/* { , } */".to_string()),
        ],
        0..6,
    )
    .prop_map(|rules| rules.join("\n"))
}

fn brace_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("{".to_string()),
            Just("}".to_string()),
            Just(";".to_string()),
            Just("/*".to_string()),
            Just("*/".to_string()),
            Just("\n".to_string()),
            Just("\"".to_string()),
            Just("@media x".to_string()),
            "[a-z .,]{0,5}",
        ],
        0..40,
    )
    .prop_map(|tokens| tokens.concat())
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Scoping already-scoped text changes nothing.
    #[test]
    fn scoping_is_idempotent(css in stylesheet()) {
        let once = scope_css(&css, ".ns");
        let twice = scope_css(&once, ".ns");
        prop_assert_eq!(once, twice);
    }

    /// Prefixing a selector list twice equals prefixing once.
    #[test]
    fn prefixing_is_idempotent(list in selector_list()) {
        let once = prefix_selectors(&list, ".ns");
        prop_assert_eq!(prefix_selectors(&once, ".ns"), once);
    }

    /// Every top-level selector gains exactly one scope class.
    #[test]
    fn every_selector_is_scoped(parts in prop::collection::vec(simple_selector(), 1..5)) {
        let list = parts.join(", ");
        let scoped = prefix_selectors(&list, ".zz-scope");
        prop_assert_eq!(scoped.matches(".zz-scope ").count(), parts.len());
    }

    /// Scoping only inserts text, it never removes any.
    #[test]
    fn scoping_only_inserts(css in brace_soup()) {
        let scoped = scope_css(&css, ".ns");
        prop_assert_eq!(scoped.replace(".ns ", ""), css.replace(".ns ", ""));
    }

    /// The formatter never panics and never indents past the open brace count.
    #[test]
    fn formatter_depth_is_bounded(css in brace_soup()) {
        let formatted = format_block(&css);
        let max_depth = css.matches('{').count();
        for line in formatted.lines() {
            let indent = line.len() - line.trim_start().len();
            prop_assert!(indent <= max_depth * INDENT_UNIT.len());
        }
    }

    /// Formatting is deterministic and idempotent.
    #[test]
    fn formatter_is_idempotent(css in stylesheet()) {
        let once = format_block(&css);
        prop_assert_eq!(format_block(&once), once.clone());
        prop_assert_eq!(format_block(&css), once);
    }
}
