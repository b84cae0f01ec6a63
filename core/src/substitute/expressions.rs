//! Expression substitution
//!
//! Expressions are substituted left to right. An assignment nested inside
//! an expression binds its target just like an assignment statement, so
//! later operands see the new value.

use tracing::debug;

use super::{Env, LoopTest};
use crate::printer::print_expr;
use crate::types::ast::{AssignOp, Expr, Span};

/// Outcome of substituting an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// The store must stay in the output
    Kept(Expr),
    /// The target was bound; carries the value the assignment produces
    Inlined(Expr),
}

/// Replace every bound identifier in `expr` with its bound expression
pub fn substitute_expr(expr: Expr, env: &mut Env, loop_test: &LoopTest) -> Expr {
    match expr {
        Expr::Ident { name, span } => match env.lookup(&name) {
            Some(bound) => bound.clone(),
            None => Expr::Ident { name, span },
        },

        Expr::Member {
            object,
            property,
            computed,
            span,
        } => substitute_member(*object, *property, computed, span, env, loop_test),

        Expr::Binary {
            op,
            left,
            right,
            span,
        } => Expr::Binary {
            op,
            left: Box::new(substitute_expr(*left, env, loop_test)),
            right: Box::new(substitute_expr(*right, env, loop_test)),
            span,
        },

        Expr::Logical {
            op,
            left,
            right,
            span,
        } => Expr::Logical {
            op,
            left: Box::new(substitute_expr(*left, env, loop_test)),
            right: Box::new(substitute_expr(*right, env, loop_test)),
            span,
        },

        Expr::Unary { op, arg, span } => Expr::Unary {
            op,
            arg: Box::new(substitute_expr(*arg, env, loop_test)),
            span,
        },

        Expr::LitList { elements, span } => Expr::LitList {
            elements: substitute_all(elements, env, loop_test),
            span,
        },

        Expr::Call { callee, args, span } => Expr::Call {
            callee: Box::new(substitute_expr(*callee, env, loop_test)),
            args: substitute_all(args, env, loop_test),
            span,
        },

        Expr::Ternary {
            condition,
            consequent,
            alternate,
            span,
        } => Expr::Ternary {
            condition: Box::new(substitute_expr(*condition, env, loop_test)),
            consequent: Box::new(substitute_expr(*consequent, env, loop_test)),
            alternate: Box::new(substitute_expr(*alternate, env, loop_test)),
            span,
        },

        Expr::Sequence { exprs, span } => Expr::Sequence {
            exprs: substitute_all(exprs, env, loop_test),
            span,
        },

        Expr::Assign {
            op,
            target,
            value,
            span,
        } => match substitute_assignment(op, *target, *value, span, env, loop_test) {
            Assignment::Kept(expr) | Assignment::Inlined(expr) => expr,
        },

        // The operand must stay assignable
        Expr::Update { .. } => expr,

        Expr::LitBool { .. } | Expr::LitNum { .. } | Expr::LitStr { .. } | Expr::LitNull { .. } => {
            expr
        }
    }
}

/// Substitute the computed parts of a store target, leaving the stored-to
/// object in place
fn substitute_assign_target(target: Expr, env: &mut Env, loop_test: &LoopTest) -> Expr {
    match target {
        Expr::Member {
            object,
            property,
            computed: true,
            span,
        } => Expr::Member {
            object,
            property: Box::new(substitute_expr(*property, env, loop_test)),
            computed: true,
            span,
        },
        other => other,
    }
}

/// Bind an identifier target to its new value, or keep the store when the
/// target is not a plain name or the enclosing loop test reads it
pub fn substitute_assignment(
    op: AssignOp,
    target: Expr,
    value: Expr,
    span: Span,
    env: &mut Env,
    loop_test: &LoopTest,
) -> Assignment {
    let value = substitute_expr(value, env, loop_test);

    let name = match &target {
        Expr::Ident { name, .. } => name.clone(),
        _ => {
            // Element and property stores never create bindings
            return Assignment::Kept(Expr::Assign {
                op,
                target: Box::new(substitute_assign_target(target, env, loop_test)),
                value: Box::new(value),
                span,
            });
        }
    };

    let bound = match op {
        AssignOp::Assign => value.clone(),
        AssignOp::Compound(binary) => Expr::Binary {
            op: binary,
            left: Box::new(
                env.lookup(&name)
                    .cloned()
                    .unwrap_or_else(|| Expr::ident(name.clone())),
            ),
            right: Box::new(value.clone()),
            span,
        },
    };
    env.bind(name.clone(), bound.clone());

    if loop_test.observes(&name) {
        debug!(name = %name, "assignment kept: name is read by the enclosing loop test");
        Assignment::Kept(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
            span,
        })
    } else {
        Assignment::Inlined(bound)
    }
}

fn substitute_all(exprs: Vec<Expr>, env: &mut Env, loop_test: &LoopTest) -> Vec<Expr> {
    exprs
        .into_iter()
        .map(|e| substitute_expr(e, env, loop_test))
        .collect()
}

/// `name[index]` where `name` is bound to an array literal resolves to the
/// element itself; everything else is substituted structurally
fn substitute_member(
    object: Expr,
    property: Expr,
    computed: bool,
    span: Span,
    env: &mut Env,
    loop_test: &LoopTest,
) -> Expr {
    if !computed {
        return Expr::Member {
            object: Box::new(substitute_expr(object, env, loop_test)),
            property: Box::new(property),
            computed,
            span,
        };
    }

    let property = substitute_expr(property, env, loop_test);
    if let Some(element) = env.array_element(&print_expr(&object), &print_expr(&property)) {
        return element.clone();
    }

    Expr::Member {
        object: Box::new(substitute_expr(object, env, loop_test)),
        property: Box::new(property),
        computed,
        span,
    }
}
