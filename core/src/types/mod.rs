//! Type definitions shared by the parser, printer and both engines
//!
//! - AST nodes (Program, Stmt, Expr) with source spans
//! - Runtime values (Val) used when classifying branches

pub mod ast;
pub mod values;

pub use ast::{
    AssignOp, BinaryOp, Declarator, Expr, ForInit, LogicalOp, Program, Span, Stmt, UnaryOp,
    UpdateOp, VarKind,
};
pub use values::Val;
