//! Branch-condition evaluation
//!
//! Evaluates a test expression directly over parameter bindings with
//! JavaScript value semantics for the supported subset: literals, arrays,
//! indexing, `.length`, arithmetic, comparison, equality, logical and unary
//! operators, and ternaries. Calls, updates and assignments are rejected.

use std::cmp::Ordering;

use thiserror::Error;
use tracing::trace;

use crate::printer::print_expr;
use crate::types::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::types::values::Val;

/* ===================== Error Types ===================== */

/// Failure to decide a branch; `line` is the zero-based line of the `if`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("line {line}: '{name}' has no bound value")]
    Unbound { name: String, line: usize },

    #[error("line {line}: {message}")]
    TypeMismatch { message: String, line: usize },

    #[error("line {line}: {construct} cannot be evaluated in a branch condition")]
    Unsupported { construct: String, line: usize },
}

impl EvaluationError {
    pub fn line(&self) -> usize {
        match self {
            EvaluationError::Unbound { line, .. }
            | EvaluationError::TypeMismatch { line, .. }
            | EvaluationError::Unsupported { line, .. } => *line,
        }
    }
}

pub type EvalResult<T> = Result<T, EvaluationError>;

/* ===================== Bindings ===================== */

/// Caller-supplied value for one parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamValue {
    /// Canonical rendering of the value, for reporting
    pub text: String,
    pub expr: Expr,
}

impl ParamValue {
    pub fn new(expr: Expr) -> Self {
        Self {
            text: print_expr(&expr),
            expr,
        }
    }
}

/// Parameter name → value, in binding order
#[derive(Debug, Clone, Default)]
pub struct ParamBindings {
    entries: Vec<(String, ParamValue)>,
}

impl ParamBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing an earlier binding of the same name in place
    pub fn bind(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }
}

/* ===================== Evaluator ===================== */

/// Evaluate `expr` for the branch on zero-based `line`
pub fn evaluate(expr: &Expr, bindings: &ParamBindings, line: usize) -> EvalResult<Val> {
    Evaluator { bindings, line }.eval(expr)
}

struct Evaluator<'a> {
    bindings: &'a ParamBindings,
    line: usize,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> EvalResult<Val> {
        match expr {
            Expr::LitBool { v, .. } => Ok(Val::Bool(*v)),
            Expr::LitNum { v, .. } => Ok(Val::Num(*v)),
            Expr::LitStr { v, .. } => Ok(Val::Str(v.clone())),
            Expr::LitNull { .. } => Ok(Val::Null),
            Expr::LitList { elements, .. } => elements
                .iter()
                .map(|e| self.eval(e))
                .collect::<EvalResult<Vec<_>>>()
                .map(Val::List),

            Expr::Ident { name, .. } => self.lookup(name),

            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                let object = self.eval(object)?;
                let key = if *computed {
                    self.eval(property)?
                } else {
                    match property.as_ref() {
                        Expr::Ident { name, .. } => Val::Str(name.clone()),
                        other => self.eval(other)?,
                    }
                };
                self.member(object, key)
            }

            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(binary(*op, left, right))
            }

            Expr::Logical {
                op, left, right, ..
            } => {
                let left = self.eval(left)?;
                match (op, left.is_truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                    _ => self.eval(right),
                }
            }

            Expr::Unary { op, arg, .. } => {
                if *op == UnaryOp::TypeOf {
                    // typeof tolerates names that were never bound
                    if let Expr::Ident { name, .. } = arg.as_ref() {
                        if self.lookup(name).is_err() {
                            return Ok(Val::Str("undefined".to_string()));
                        }
                    }
                }
                let value = self.eval(arg)?;
                Ok(match op {
                    UnaryOp::Not => Val::Bool(!value.is_truthy()),
                    UnaryOp::Neg => Val::Num(-value.to_number()),
                    UnaryOp::Plus => Val::Num(value.to_number()),
                    UnaryOp::BitNot => Val::Num(f64::from(!to_int32(value.to_number()))),
                    UnaryOp::TypeOf => Val::Str(value.type_name().to_string()),
                })
            }

            Expr::Ternary {
                condition,
                consequent,
                alternate,
                ..
            } => {
                if self.eval(condition)?.is_truthy() {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }

            Expr::Sequence { exprs, .. } => {
                let mut last = Val::Undefined;
                for e in exprs {
                    last = self.eval(e)?;
                }
                Ok(last)
            }

            Expr::Call { .. } => Err(self.unsupported("function call")),
            Expr::Update { .. } => Err(self.unsupported("update expression")),
            Expr::Assign { .. } => Err(self.unsupported("assignment")),
        }
    }

    fn lookup(&self, name: &str) -> EvalResult<Val> {
        if let Some(param) = self.bindings.get(name) {
            trace!(name, value = %param.text, "reading parameter");
            // Values are closed expressions; they never see other parameters
            return evaluate(&param.expr, &ParamBindings::new(), self.line);
        }

        match name {
            "undefined" => Ok(Val::Undefined),
            "NaN" => Ok(Val::Num(f64::NAN)),
            "Infinity" => Ok(Val::Num(f64::INFINITY)),
            _ => Err(EvaluationError::Unbound {
                name: name.to_string(),
                line: self.line,
            }),
        }
    }

    fn member(&self, object: Val, key: Val) -> EvalResult<Val> {
        let is_length = matches!(&key, Val::Str(k) if k == "length");

        match object {
            Val::Undefined | Val::Null => Err(EvaluationError::TypeMismatch {
                message: format!(
                    "cannot read property '{}' of {}",
                    key.to_display(),
                    object.to_display()
                ),
                line: self.line,
            }),
            Val::List(items) if is_length => Ok(Val::Num(items.len() as f64)),
            Val::List(mut items) => Ok(match index_of(&key) {
                Some(i) if i < items.len() => items.swap_remove(i),
                _ => Val::Undefined,
            }),
            Val::Str(s) if is_length => Ok(Val::Num(s.chars().count() as f64)),
            Val::Str(s) => Ok(index_of(&key)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Val::Str(c.to_string()))
                .unwrap_or(Val::Undefined)),
            Val::Bool(_) | Val::Num(_) => Ok(Val::Undefined),
        }
    }

    fn unsupported(&self, construct: &str) -> EvaluationError {
        EvaluationError::Unsupported {
            construct: construct.to_string(),
            line: self.line,
        }
    }
}

/* ===================== Operators ===================== */

fn binary(op: BinaryOp, left: Val, right: Val) -> Val {
    match op {
        BinaryOp::Add => {
            let left = to_primitive(left);
            let right = to_primitive(right);
            if matches!(left, Val::Str(_)) || matches!(right, Val::Str(_)) {
                Val::Str(format!("{}{}", left.to_display(), right.to_display()))
            } else {
                Val::Num(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => Val::Num(left.to_number() - right.to_number()),
        BinaryOp::Mul => Val::Num(left.to_number() * right.to_number()),
        BinaryOp::Div => Val::Num(left.to_number() / right.to_number()),
        BinaryOp::Rem => Val::Num(left.to_number() % right.to_number()),
        BinaryOp::Lt => Val::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::Gt => Val::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::Lte => Val::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gte => Val::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::StrictEq => Val::Bool(strict_equals(&left, &right)),
        BinaryOp::StrictNe => Val::Bool(!strict_equals(&left, &right)),
        BinaryOp::Eq => Val::Bool(loose_equals(left, right)),
        BinaryOp::Ne => Val::Bool(!loose_equals(left, right)),
    }
}

/// Arrays take part in operators through their joined string form
fn to_primitive(value: Val) -> Val {
    match value {
        Val::List(_) => Val::Str(value.to_display()),
        other => other,
    }
}

/// Relational ordering; `None` when either side is NaN
fn compare(left: Val, right: Val) -> Option<Ordering> {
    match (to_primitive(left), to_primitive(right)) {
        (Val::Str(l), Val::Str(r)) => Some(l.cmp(&r)),
        (l, r) => l.to_number().partial_cmp(&r.to_number()),
    }
}

/// Arrays compare structurally: values carry no identity here
fn strict_equals(left: &Val, right: &Val) -> bool {
    match (left, right) {
        (Val::Num(l), Val::Num(r)) => l == r,
        _ => left == right,
    }
}

fn loose_equals(left: Val, right: Val) -> bool {
    match (left, right) {
        (Val::Undefined | Val::Null, Val::Undefined | Val::Null) => true,
        (Val::Undefined | Val::Null, _) | (_, Val::Undefined | Val::Null) => false,
        (l @ Val::Bool(_), r) => loose_equals(Val::Num(l.to_number()), r),
        (l, r @ Val::Bool(_)) => loose_equals(l, Val::Num(r.to_number())),
        (Val::Num(l), r @ Val::Str(_)) => l == r.to_number(),
        (l @ Val::Str(_), Val::Num(r)) => l.to_number() == r,
        (l @ Val::List(_), r @ (Val::Num(_) | Val::Str(_))) => loose_equals(to_primitive(l), r),
        (l @ (Val::Num(_) | Val::Str(_)), r @ Val::List(_)) => loose_equals(l, to_primitive(r)),
        (l, r) => strict_equals(&l, &r),
    }
}

/// Array/string index from a numeric key or a canonical numeric string
fn index_of(key: &Val) -> Option<usize> {
    match key {
        Val::Num(n) if *n >= 0.0 && n.fract() == 0.0 && n.is_finite() => Some(*n as usize),
        Val::Str(s) => s
            .parse::<usize>()
            .ok()
            .filter(|i| i.to_string() == *s),
        _ => None,
    }
}

fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
}
