//! Branch classification
//!
//! Walks a program depth-first in source order. Each function declaration
//! takes its parameter values from the front of the remaining value list;
//! each `if` statement is evaluated and its header line marked taken or
//! not taken. A taken branch marks every `else if` of its chain as not
//! taken, and not-taken marks win over taken ones.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;
use tracing::{debug, warn};

use super::eval::{evaluate, EvalResult, ParamBindings, ParamValue};
use crate::types::ast::{Expr, Program, Stmt};

/// Zero-based line numbers of classified `if` headers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub taken: BTreeSet<usize>,
    pub not_taken: BTreeSet<usize>,
}

/// Classification of a single source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Taken,
    NotTaken,
    Plain,
}

impl Classification {
    pub fn line_state(&self, line: usize) -> LineState {
        if self.taken.contains(&line) {
            LineState::Taken
        } else if self.not_taken.contains(&line) {
            LineState::NotTaken
        } else {
            LineState::Plain
        }
    }
}

/// Classify every `if` statement of `program` under the given values
pub fn classify(program: &Program, values: Vec<Expr>) -> EvalResult<Classification> {
    let mut classifier = Classifier {
        values: values.into(),
        bindings: ParamBindings::new(),
        result: Classification::default(),
    };

    classifier.visit_all(&program.body)?;

    let unused = classifier.values.len();
    if unused > 0 {
        warn!(unused, "more parameter values than parameters");
    }

    let mut result = classifier.result;
    let not_taken = result.not_taken.clone();
    result.taken.retain(|line| !not_taken.contains(line));
    Ok(result)
}

struct Classifier {
    values: VecDeque<Expr>,
    bindings: ParamBindings,
    result: Classification,
}

impl Classifier {
    fn visit_all(&mut self, stmts: &[Stmt]) -> EvalResult<()> {
        stmts.iter().try_for_each(|stmt| self.visit(stmt))
    }

    fn visit(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match stmt {
            Stmt::Function {
                name, params, body, ..
            } => {
                self.bind_params(name, params);
                self.visit_all(body)
            }
            Stmt::If {
                test,
                then_s,
                else_s,
                span,
            } => {
                let line = span.start_line;
                let taken = evaluate(test, &self.bindings, line)?.is_truthy();
                debug!(line, taken, "classified branch");

                if taken {
                    self.result.taken.insert(line);
                    self.mark_dead_alternates(else_s.as_deref());
                } else {
                    self.result.not_taken.insert(line);
                }

                self.visit(then_s)?;
                match else_s {
                    Some(alternate) => self.visit(alternate),
                    None => Ok(()),
                }
            }
            Stmt::While { body, .. } | Stmt::For { body, .. } => self.visit(body),
            Stmt::Block { body, .. } => self.visit_all(body),
            Stmt::Declare { .. }
            | Stmt::Return { .. }
            | Stmt::Expr { .. }
            | Stmt::Break { .. }
            | Stmt::Continue { .. }
            | Stmt::Empty { .. } => Ok(()),
        }
    }

    fn bind_params(&mut self, function: &str, params: &[String]) {
        for param in params {
            match self.values.pop_front() {
                Some(expr) => {
                    let value = ParamValue::new(expr);
                    debug!(function, param = %param, value = %value.text, "bound parameter");
                    self.bindings.bind(param.clone(), value);
                }
                None => warn!(function, param = %param, "no value supplied for parameter"),
            }
        }
    }

    fn mark_dead_alternates(&mut self, mut alternate: Option<&Stmt>) {
        while let Some(Stmt::If { span, else_s, .. }) = alternate {
            self.result.not_taken.insert(span.start_line);
            alternate = else_s.as_deref();
        }
    }
}
