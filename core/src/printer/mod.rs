//! Canonical source printer
//!
//! Turns a syntax tree back into text in one stable style: four-space
//! indentation, braces on the header line, `} else` on the closing-brace
//! line, single spaces around binary operators and parentheses only where
//! operator precedence requires them. Line-based painting depends on this
//! output being deterministic.

use crate::types::ast::{
    BinaryOp, Declarator, Expr, ForInit, LogicalOp, Program, Stmt, UnaryOp,
};
use crate::types::values::format_number;


/* ===================== Precedence ===================== */

const SEQUENCE: u8 = 0;
const ASSIGNMENT: u8 = 1;
const CONDITIONAL: u8 = 2;
const LOGICAL_OR: u8 = 3;
const LOGICAL_AND: u8 = 4;
const EQUALITY: u8 = 8;
const RELATIONAL: u8 = 9;
const ADDITIVE: u8 = 11;
const MULTIPLICATIVE: u8 = 12;
const UNARY: u8 = 14;
const POSTFIX: u8 = 15;
const CALL: u8 = 17;
const MEMBER: u8 = 20;
const PRIMARY: u8 = 21;

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::StrictEq | BinaryOp::StrictNe => EQUALITY,
        BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => RELATIONAL,
        BinaryOp::Add | BinaryOp::Sub => ADDITIVE,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => MULTIPLICATIVE,
    }
}

fn logical_precedence(op: LogicalOp) -> u8 {
    match op {
        LogicalOp::Or => LOGICAL_OR,
        LogicalOp::And => LOGICAL_AND,
    }
}

/* ===================== Printer ===================== */

/// Source printer with a configurable indentation width
#[derive(Debug, Clone)]
pub struct Printer {
    indent_unit: String,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Print a program with the default style
pub fn print_program(program: &Program) -> String {
    Printer::default().program(program)
}

/// Print a single expression with the default style
pub fn print_expr(expr: &Expr) -> String {
    Printer::default().expr(expr)
}

impl Printer {
    pub fn new(indent_width: usize) -> Self {
        Self {
            indent_unit: " ".repeat(indent_width),
        }
    }

    /// Render a whole program; top-level statements are separated by newlines
    pub fn program(&self, program: &Program) -> String {
        let mut out = String::new();
        for (i, stmt) in program.body.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.write_stmt(&mut out, stmt, 0);
        }
        out
    }

    /// Render a standalone expression
    pub fn expr(&self, expr: &Expr) -> String {
        self.expr_at(expr, SEQUENCE)
    }

    fn indent(&self, level: usize) -> String {
        self.indent_unit.repeat(level)
    }

    /* ----- statements ----- */

    /// Write `stmt` at the current position. The caller has already written
    /// the indentation of the first line; continuation lines are indented
    /// relative to `level`.
    fn write_stmt(&self, out: &mut String, stmt: &Stmt, level: usize) {
        match stmt {
            Stmt::Function {
                name, params, body, ..
            } => {
                out.push_str("function ");
                out.push_str(name);
                out.push('(');
                out.push_str(&params.join(", "));
                out.push_str(") ");
                self.write_block(out, body, level);
            }
            Stmt::Declare {
                kind, declarations, ..
            } => {
                out.push_str(kind.as_str());
                out.push(' ');
                out.push_str(&self.declarators(declarations));
                out.push(';');
            }
            Stmt::If {
                test,
                then_s,
                else_s,
                ..
            } => {
                out.push_str("if (");
                out.push_str(&self.expr_at(test, SEQUENCE));
                out.push(')');
                self.write_body(out, then_s, level);

                if let Some(alternate) = else_s {
                    if matches!(**then_s, Stmt::Block { .. }) {
                        out.push(' ');
                    } else {
                        out.push('\n');
                        out.push_str(&self.indent(level));
                    }
                    out.push_str("else");
                    if matches!(**alternate, Stmt::If { .. }) {
                        out.push(' ');
                        self.write_stmt(out, alternate, level);
                    } else {
                        self.write_body(out, alternate, level);
                    }
                }
            }
            Stmt::While { test, body, .. } => {
                out.push_str("while (");
                out.push_str(&self.expr_at(test, SEQUENCE));
                out.push(')');
                self.write_body(out, body, level);
            }
            Stmt::For {
                init,
                test,
                update,
                body,
                ..
            } => {
                out.push_str("for (");
                match init {
                    Some(ForInit::Declare { kind, declarations }) => {
                        out.push_str(kind.as_str());
                        out.push(' ');
                        out.push_str(&self.declarators(declarations));
                    }
                    Some(ForInit::Expr { expr }) => out.push_str(&self.expr_at(expr, SEQUENCE)),
                    None => {}
                }
                out.push(';');
                if let Some(test) = test {
                    out.push(' ');
                    out.push_str(&self.expr_at(test, SEQUENCE));
                }
                out.push(';');
                if let Some(update) = update {
                    out.push(' ');
                    out.push_str(&self.expr_at(update, SEQUENCE));
                }
                out.push(')');
                self.write_body(out, body, level);
            }
            Stmt::Return { value, .. } => {
                out.push_str("return");
                if let Some(value) = value {
                    out.push(' ');
                    out.push_str(&self.expr_at(value, SEQUENCE));
                }
                out.push(';');
            }
            Stmt::Block { body, .. } => self.write_block(out, body, level),
            Stmt::Expr { expr, .. } => {
                out.push_str(&self.expr_at(expr, SEQUENCE));
                out.push(';');
            }
            Stmt::Break { .. } => out.push_str("break;"),
            Stmt::Continue { .. } => out.push_str("continue;"),
            Stmt::Empty { .. } => out.push(';'),
        }
    }

    fn write_block(&self, out: &mut String, body: &[Stmt], level: usize) {
        out.push('{');
        for stmt in body {
            out.push('\n');
            out.push_str(&self.indent(level + 1));
            self.write_stmt(out, stmt, level + 1);
        }
        out.push('\n');
        out.push_str(&self.indent(level));
        out.push('}');
    }

    /// Body of if/else/while/for: blocks stay on the header line, an empty
    /// statement collapses to `;`, anything else moves to the next line
    fn write_body(&self, out: &mut String, body: &Stmt, level: usize) {
        match body {
            Stmt::Empty { .. } => out.push(';'),
            Stmt::Block { body, .. } => {
                out.push(' ');
                self.write_block(out, body, level);
            }
            other => {
                out.push('\n');
                out.push_str(&self.indent(level + 1));
                self.write_stmt(out, other, level + 1);
            }
        }
    }

    fn declarators(&self, declarations: &[Declarator]) -> String {
        declarations
            .iter()
            .map(|decl| match &decl.init {
                Some(init) => format!("{} = {}", decl.name, self.expr_at(init, ASSIGNMENT)),
                None => decl.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /* ----- expressions ----- */

    /// Render `expr` in a position that requires at least `required` precedence
    fn expr_at(&self, expr: &Expr, required: u8) -> String {
        let (text, precedence) = self.expr_with_precedence(expr);
        if precedence < required {
            format!("({})", text)
        } else {
            text
        }
    }

    fn expr_with_precedence(&self, expr: &Expr) -> (String, u8) {
        match expr {
            Expr::LitBool { v, .. } => (v.to_string(), PRIMARY),
            Expr::LitNum { v, .. } => (format_number(*v), PRIMARY),
            Expr::LitStr { v, .. } => (quote(v), PRIMARY),
            Expr::LitNull { .. } => ("null".to_string(), PRIMARY),
            Expr::Ident { name, .. } => (name.clone(), PRIMARY),
            Expr::LitList { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|e| self.expr_at(e, ASSIGNMENT))
                    .collect::<Vec<_>>();
                (format!("[{}]", items.join(", ")), PRIMARY)
            }
            Expr::Member {
                object,
                property,
                computed,
                ..
            } => {
                let object = match object.as_ref() {
                    // `5.x` would lex as the number `5.` followed by `x`
                    Expr::LitNum { v, .. } if !*computed => format!("({})", format_number(*v)),
                    _ => self.expr_at(object, CALL),
                };
                let text = if *computed {
                    format!("{}[{}]", object, self.expr_at(property, SEQUENCE))
                } else {
                    format!("{}.{}", object, self.expr_at(property, PRIMARY))
                };
                (text, MEMBER)
            }
            Expr::Call { callee, args, .. } => {
                let args = args
                    .iter()
                    .map(|a| self.expr_at(a, ASSIGNMENT))
                    .collect::<Vec<_>>();
                (
                    format!("{}({})", self.expr_at(callee, CALL), args.join(", ")),
                    CALL,
                )
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let precedence = binary_precedence(*op);
                (
                    format!(
                        "{} {} {}",
                        self.expr_at(left, precedence),
                        op.as_str(),
                        self.expr_at(right, precedence + 1)
                    ),
                    precedence,
                )
            }
            Expr::Logical {
                op, left, right, ..
            } => {
                let precedence = logical_precedence(*op);
                (
                    format!(
                        "{} {} {}",
                        self.expr_at(left, precedence),
                        op.as_str(),
                        self.expr_at(right, precedence + 1)
                    ),
                    precedence,
                )
            }
            Expr::Unary { op, arg, .. } => {
                let operand = self.expr_at(arg, UNARY);
                let needs_space = match op {
                    UnaryOp::TypeOf => true,
                    UnaryOp::Neg => operand.starts_with('-'),
                    UnaryOp::Plus => operand.starts_with('+'),
                    UnaryOp::Not | UnaryOp::BitNot => false,
                };
                let separator = if needs_space { " " } else { "" };
                (format!("{}{}{}", op.as_str(), separator, operand), UNARY)
            }
            Expr::Update {
                op, prefix, arg, ..
            } => {
                if *prefix {
                    (
                        format!("{}{}", op.as_str(), self.expr_at(arg, UNARY)),
                        UNARY,
                    )
                } else {
                    (
                        format!("{}{}", self.expr_at(arg, CALL), op.as_str()),
                        POSTFIX,
                    )
                }
            }
            Expr::Assign {
                op, target, value, ..
            } => (
                format!(
                    "{} {} {}",
                    self.expr_at(target, CALL),
                    op.as_str(),
                    self.expr_at(value, ASSIGNMENT)
                ),
                ASSIGNMENT,
            ),
            Expr::Ternary {
                condition,
                consequent,
                alternate,
                ..
            } => (
                format!(
                    "{} ? {} : {}",
                    self.expr_at(condition, LOGICAL_OR),
                    self.expr_at(consequent, ASSIGNMENT),
                    self.expr_at(alternate, ASSIGNMENT)
                ),
                CONDITIONAL,
            ),
            Expr::Sequence { exprs, .. } => {
                let items = exprs
                    .iter()
                    .map(|e| self.expr_at(e, ASSIGNMENT))
                    .collect::<Vec<_>>();
                (items.join(", "), SEQUENCE)
            }
        }
    }
}

/// Single-quoted string literal
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}
