//! Parameter-value extraction

use crate::parser::{parse_program, ParseError, ParseResult};
use crate::types::ast::{Expr, Stmt};

/// Split comma-separated value text (`1,2,3`, `'1234'`, `[8,9,10],1`) into
/// one expression per value, left to right. Blank text yields no values.
pub fn extract_param_values(text: &str) -> ParseResult<Vec<Expr>> {
    let program = parse_program(text)?;

    match program.body.into_iter().next() {
        None => Ok(Vec::new()),
        Some(Stmt::Expr {
            expr: Expr::Sequence { exprs, .. },
            ..
        }) => Ok(exprs),
        Some(Stmt::Expr { expr, .. }) => Ok(vec![expr]),
        Some(other) => Err(ParseError::Build(
            "Parameter values must be a comma-separated list of expressions".to_string(),
            Some(other.span()),
        )),
    }
}
