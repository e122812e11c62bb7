use cellsheet_scope::{format_block, scope_class_for, scope_css, Context, Scanner};

#[test]
fn test_media_scenario() {
    let scoped = scope_css("@media (min-width: 500px) { .btn { color: blue; } }", ".ns");
    assert_eq!(
        scoped,
        "@media (min-width: 500px) { .ns .btn { color: blue; } }"
    );
}

#[test]
fn test_keyframes_scenario() {
    let css = "@keyframes spin { from { transform: rotate(0); } }";
    assert_eq!(scope_css(css, ".ns"), css);
}

#[test]
fn test_realistic_snippet_scoped_and_formatted() {
    let css = r#"
/* Headings */
h1, h2:is(.a, .b) {
color: var(--my-color);
}
@media (max-width: 600px) {
.sidebar > .item::before { content: "{ , }"; }
}
@keyframes pulse {
0% { opacity: 1; }
100% { opacity: 0; }
}
"#;

    let scoped = scope_css(css.trim(), &scope_class_for("theme"));
    let formatted = format_block(&scoped);

    let expected = r#"/* Headings */
.theme h1, .theme h2:is(.a, .b) {
    color: var(--my-color);
}
@media (max-width: 600px) {
    .theme .sidebar > .item::before { content: "{ , }"; }
}
@keyframes pulse {
    0% { opacity: 1; }
    100% { opacity: 0; }
}"#;

    assert_eq!(formatted, expected);
}

#[test]
fn test_block_contexts_follow_nesting() {
    let scanned = Scanner::new(".ns").scan(
        "@media print { .a { b: c; } } @keyframes k { to { d: e; } } .f { g: h; }",
    );

    let contexts: Vec<(Context, Context, bool)> = scanned
        .blocks
        .iter()
        .map(|b| (b.parent, b.context, b.scoped))
        .collect();

    assert_eq!(
        contexts,
        vec![
            (Context::Root, Context::Container, false),
            (Context::Container, Context::Block, true),
            (Context::Root, Context::Protected, false),
            (Context::Protected, Context::Block, false),
            (Context::Root, Context::Block, true),
        ]
    );
}

#[test]
fn test_nested_style_rule_is_not_scoped() {
    assert_eq!(
        scope_css(".a { &:hover { b: c; } }", ".ns"),
        ".ns .a { &:hover { b: c; } }"
    );
}
