//! Statement substitution handlers
//!
//! Each handler returns the transformed statement. Declarations and
//! eliminated assignments come back as `Stmt::Empty`, which the enclosing
//! block drops.

use tracing::{debug, trace};

use super::expressions::{substitute_assignment, substitute_expr, Assignment};
use super::{Env, LoopTest};
use crate::types::ast::{Expr, Stmt};

/// Substitute a statement list in order and drop the empty placeholders
pub fn substitute_block(body: Vec<Stmt>, env: &mut Env, loop_test: &LoopTest) -> Vec<Stmt> {
    body.into_iter()
        .map(|stmt| substitute_stmt(stmt, env, loop_test))
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

pub fn substitute_stmt(stmt: Stmt, env: &mut Env, loop_test: &LoopTest) -> Stmt {
    match stmt {
        Stmt::Function {
            name,
            params,
            body,
            span,
        } => {
            // Parameters are opaque inside the function and unknown outside it
            let mut scope = env.child();
            for param in &params {
                scope.bind(param.clone(), Expr::ident(param.clone()));
            }
            let body = substitute_block(body, &mut scope, &LoopTest::none());
            Stmt::Function {
                name,
                params,
                body,
                span,
            }
        }

        Stmt::Declare {
            declarations,
            span,
            ..
        } => {
            for decl in declarations {
                let value = match decl.init {
                    Some(init) => substitute_expr(init, env, loop_test),
                    None => Expr::ident("undefined"),
                };
                trace!(name = %decl.name, "binding declaration");
                env.bind(decl.name, value);
            }
            Stmt::Empty { span }
        }

        Stmt::Expr { expr, span } => match expr {
            Expr::Assign {
                op,
                target,
                value,
                span: assign_span,
            } => match substitute_assignment(op, *target, *value, assign_span, env, loop_test) {
                Assignment::Kept(expr) => Stmt::Expr { expr, span },
                Assignment::Inlined(_) => Stmt::Empty { span },
            },
            other => Stmt::Expr {
                expr: substitute_expr(other, env, loop_test),
                span,
            },
        },

        Stmt::While { test, body, span } => {
            let mut scope = env.child();
            // Stores inside the test run on every iteration
            let in_test = LoopTest::from_test(&test);
            let test = substitute_expr(test, &mut scope, &in_test);
            let observed = LoopTest::from_test(&test);
            let body = substitute_stmt(*body, &mut scope, &observed);
            Stmt::While {
                test,
                body: Box::new(body),
                span,
            }
        }

        Stmt::If {
            test,
            then_s,
            else_s,
            span,
        } => {
            let test = substitute_expr(test, env, loop_test);
            let then_s = substitute_stmt(*then_s, &mut env.child(), loop_test);
            let else_s = else_s.map(|alternate| {
                Box::new(substitute_stmt(*alternate, &mut env.child(), loop_test))
            });
            Stmt::If {
                test,
                then_s: Box::new(then_s),
                else_s,
                span,
            }
        }

        Stmt::Return { value, span } => Stmt::Return {
            value: value.map(|v| substitute_expr(v, env, loop_test)),
            span,
        },

        Stmt::Block { body, span } => Stmt::Block {
            body: substitute_block(body, env, loop_test),
            span,
        },

        Stmt::For { span, .. } => {
            debug!(line = span.start_line, "for loop left unsubstituted");
            stmt
        }

        Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Empty { .. } => stmt,
    }
}
