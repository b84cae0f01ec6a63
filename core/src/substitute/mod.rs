//! # Substitution Engine
//!
//! Propagates variable bindings to their use sites and removes the
//! declarations and assignments that become redundant once inlined.
//!
//! ## Core Principles
//!
//! 1. **One recursive descent**: statements and expressions are matched by
//!    kind; the ambient [`Env`] is threaded through as a parameter.
//! 2. **Scopes are copies**: function bodies, if-branches and while-bodies
//!    work on a child copy of the environment; nothing written there is
//!    visible to the parent afterwards.
//! 3. **Loop-observed assignments survive**: an assignment to a name that
//!    appears in the innermost enclosing while-test is kept, because the
//!    next iteration re-reads it.
//!
//! Unsupported constructs (C-style `for` loops, update expressions) pass
//! through unchanged.

use std::collections::{HashMap, HashSet};

use crate::printer::print_expr;
use crate::types::ast::{Expr, Program};

pub mod expressions;
pub mod statements;

#[cfg(test)]
mod tests;

pub use expressions::substitute_expr;
pub use statements::{substitute_block, substitute_stmt};

/* ===================== Environment ===================== */

/// Variable name → fully substituted expression
///
/// Stored values never reference other keys of the same environment, so a
/// lookup is a single step.
#[derive(Debug, Clone, Default)]
pub struct Env {
    bindings: HashMap<String, Expr>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Expr) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Expr> {
        self.bindings.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Independent scope for a branch or loop body
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Element `index` of the array literal bound to `name`, if both exist
    pub fn array_element(&self, name: &str, index: &str) -> Option<&Expr> {
        let Expr::LitList { elements, .. } = self.lookup(name)? else {
            return None;
        };
        let index = index.parse::<usize>().ok()?;
        elements.get(index)
    }
}

/* ===================== Loop Test ===================== */

/// Names observed by the innermost enclosing while-loop test
#[derive(Debug, Clone, Default)]
pub struct LoopTest {
    names: HashSet<String>,
}

impl LoopTest {
    /// Outside of any while loop
    pub fn none() -> Self {
        Self::default()
    }

    /// Collect the identifier-like tokens of an already substituted test
    pub fn from_test(test: &Expr) -> Self {
        Self {
            names: identifier_tokens(&print_expr(test)),
        }
    }

    pub fn observes(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Identifier-like tokens of rendered source; string literal contents and
/// numeric literals are skipped
fn identifier_tokens(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut current = String::new();
    let mut in_number = false;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in text.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
            if current.is_empty() && ch.is_ascii_digit() {
                in_number = true;
            }
            if !in_number {
                current.push(ch);
            }
            continue;
        }

        if !current.is_empty() {
            tokens.insert(std::mem::take(&mut current));
        }
        in_number = false;
        if ch == '\'' || ch == '"' {
            quote = Some(ch);
        }
    }

    if !current.is_empty() {
        tokens.insert(current);
    }
    tokens
}

/* ===================== Public API ===================== */

/// Substitute a whole program with a fresh, empty environment
pub fn substitute(program: Program) -> Program {
    let mut env = Env::new();
    let body = substitute_block(program.body, &mut env, &LoopTest::none());
    Program {
        body,
        span: program.span,
    }
}
