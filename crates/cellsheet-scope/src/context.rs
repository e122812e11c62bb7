//! Nesting contexts tracked while scanning CSS.

/// At-rule names whose bodies hold ordinary style rules that still need scoping.
pub const CONDITIONAL_AT_RULES: &[&str] = &["media", "supports", "container", "document"];

/// Where in the block nesting the scanner currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// Top level of the fragment.
    Root,
    /// Inside a conditional at-rule body (`@media`, `@supports`, ...).
    Container,
    /// Inside any other at-rule body (`@keyframes`, `@font-face`, ...).
    Protected,
    /// Inside a style rule's declaration block.
    Block,
}

impl Context {
    /// Returns true if selectors written directly in this context get scoped.
    pub fn scopes_selectors(self) -> bool {
        matches!(self, Context::Root | Context::Container)
    }

    /// Context entered by an at-rule with the given name.
    pub fn for_at_rule(name: &str) -> Self {
        if CONDITIONAL_AT_RULES.contains(&name) {
            Context::Container
        } else {
            Context::Protected
        }
    }
}

/// A stack of contexts that always keeps its root frame.
///
/// Popping the root frame is ignored, so unbalanced `}` never underflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStack {
    frames: Vec<Context>,
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Context::Root],
        }
    }

    pub fn current(&self) -> Context {
        self.frames.last().copied().unwrap_or(Context::Root)
    }

    pub fn push(&mut self, context: Context) {
        self.frames.push(context);
    }

    /// Pops the innermost frame. Returns `None` when only the root is left.
    pub fn pop(&mut self) -> Option<Context> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// Number of open blocks (the root frame does not count).
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }
}
