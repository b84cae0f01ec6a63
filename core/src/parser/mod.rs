//! PEST-based parser for the scripting language
//!
//! Produces the AST consumed by the substitution engine and the branch
//! classifier. Every node carries a span so the classifier can map
//! conditionals back to source lines.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::types::ast::{
    AssignOp, BinaryOp, Declarator, Expr, ForInit, LogicalOp, Program, Span, Stmt, UnaryOp,
    UpdateOp, VarKind,
};


/* ===================== PEST Parser ===================== */

#[derive(Parser)]
#[grammar = "parser/script.pest"]
struct ScriptParser;

/* ===================== Error Types ===================== */

#[derive(Debug, Error)]
pub enum ParseError {
    /// The source does not match the grammar
    #[error("syntax error: {0}")]
    Syntax(String, Option<Span>),
    /// The grammar matched but the tree could not be built
    #[error("{0}")]
    Build(String, Option<Span>),
}

impl ParseError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Syntax(_, span) => *span,
            ParseError::Build(_, span) => *span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ParseError::Syntax(msg, _) => msg,
            ParseError::Build(msg, _) => msg,
        }
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let span = match err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => Some(Span {
                start: 0,
                end: 0,
                start_line: line.saturating_sub(1),
                start_col: col.saturating_sub(1),
                end_line: line.saturating_sub(1),
                end_col: col,
            }),
            pest::error::LineColLocation::Span((start_line, start_col), (end_line, end_col)) => {
                Some(Span {
                    start: 0,
                    end: 0,
                    start_line: start_line.saturating_sub(1),
                    start_col: start_col.saturating_sub(1),
                    end_line: end_line.saturating_sub(1),
                    end_col: end_col.saturating_sub(1),
                })
            }
        };
        ParseError::Syntax(err.to_string(), span)
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Span Helpers ===================== */

/// Convert a PEST pair's span to our Span type (lines and columns 0-indexed)
fn pair_to_span(pair: &Pair<Rule>) -> Span {
    let pest_span = pair.as_span();
    let (start_line, start_col) = pest_span.start_pos().line_col();
    let (end_line, end_col) = pest_span.end_pos().line_col();

    Span::new(
        pest_span.start(),
        pest_span.end(),
        start_line.saturating_sub(1),
        start_col.saturating_sub(1),
        end_line.saturating_sub(1),
        end_col.saturating_sub(1),
    )
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_function
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_for
            | Rule::kw_return
            | Rule::kw_break
            | Rule::kw_continue
    )
}

/// Children of a pair with keyword tokens removed
fn significant<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn next_pair<'i>(
    inner: &mut impl Iterator<Item = Pair<'i, Rule>>,
    what: &str,
    span: Span,
) -> ParseResult<Pair<'i, Rule>> {
    inner
        .next()
        .ok_or_else(|| ParseError::Build(format!("Expected {}", what), Some(span)))
}

/* ===================== Public API ===================== */

/// Parse source text into a program
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let mut pairs = ScriptParser::parse(Rule::program, source)?;
    let program = pairs
        .next()
        .ok_or_else(|| ParseError::Build("Empty parse result".to_string(), None))?;
    let span = pair_to_span(&program);

    let body = program
        .into_inner()
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(build_statement)
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(Program { body, span })
}

/* ===================== AST Builder ===================== */

fn build_block(pair: Pair<Rule>) -> ParseResult<Vec<Stmt>> {
    pair.into_inner().map(build_statement).collect()
}

fn build_function(pair: Pair<Rule>) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair);
    let mut name = None;
    let mut params = Vec::new();
    let mut body = None;

    for inner in significant(pair) {
        match inner.as_rule() {
            Rule::identifier => name = Some(inner.as_str().to_string()),
            Rule::param_list => {
                params = inner.into_inner().map(|p| p.as_str().to_string()).collect();
            }
            Rule::block => body = Some(build_block(inner)?),
            rule => {
                return Err(ParseError::Build(
                    format!("Unexpected function content: {:?}", rule),
                    Some(span),
                ))
            }
        }
    }

    let name = name.ok_or_else(|| {
        ParseError::Build("Function declaration without a name".to_string(), Some(span))
    })?;

    Ok(Stmt::Function {
        name,
        params,
        body: body.unwrap_or_default(),
        span,
    })
}

fn build_declaration(pair: Pair<Rule>) -> ParseResult<(VarKind, Vec<Declarator>)> {
    let span = pair_to_span(&pair);
    let mut inner = pair.into_inner();

    let kind_pair = next_pair(&mut inner, "declaration keyword", span)?;
    let kind = VarKind::from_keyword(kind_pair.as_str()).ok_or_else(|| {
        ParseError::Build(
            format!("Expected 'let', 'const' or 'var', got: {}", kind_pair.as_str()),
            Some(pair_to_span(&kind_pair)),
        )
    })?;

    let declarations = inner
        .map(|declarator| {
            let span = pair_to_span(&declarator);
            let mut parts = declarator.into_inner();
            let name = next_pair(&mut parts, "declared name", span)?
                .as_str()
                .to_string();
            let init = parts.next().map(build_expression).transpose()?;
            Ok(Declarator { name, init, span })
        })
        .collect::<ParseResult<Vec<_>>>()?;

    Ok((kind, declarations))
}

fn build_if_stmt(pair: Pair<Rule>) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair);
    let mut inner = significant(pair);

    let test = build_expression(next_pair(&mut inner, "if condition", span)?)?;
    let then_s = build_statement(next_pair(&mut inner, "if consequent", span)?)?;

    let else_s = match inner.next() {
        Some(else_clause) => {
            let mut else_inner = significant(else_clause);
            let alternate = next_pair(&mut else_inner, "else branch", span)?;
            Some(Box::new(build_statement(alternate)?))
        }
        None => None,
    };

    Ok(Stmt::If {
        test,
        then_s: Box::new(then_s),
        else_s,
        span,
    })
}

fn build_while_stmt(pair: Pair<Rule>) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair);
    let mut inner = significant(pair);

    let test = build_expression(next_pair(&mut inner, "while condition", span)?)?;
    let body = build_statement(next_pair(&mut inner, "while body", span)?)?;

    Ok(Stmt::While {
        test,
        body: Box::new(body),
        span,
    })
}

fn build_for_stmt(pair: Pair<Rule>) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair);
    let mut init = None;
    let mut test = None;
    let mut update = None;
    let mut body = None;

    for inner in significant(pair) {
        match inner.as_rule() {
            Rule::for_init => {
                let clause = next_pair(&mut inner.into_inner(), "for initializer", span)?;
                init = Some(match clause.as_rule() {
                    Rule::declaration => {
                        let (kind, declarations) = build_declaration(clause)?;
                        ForInit::Declare { kind, declarations }
                    }
                    _ => ForInit::Expr {
                        expr: build_expression(clause)?,
                    },
                });
            }
            Rule::for_test => {
                let expr = next_pair(&mut inner.into_inner(), "for condition", span)?;
                test = Some(build_expression(expr)?);
            }
            Rule::for_update => {
                let expr = next_pair(&mut inner.into_inner(), "for update", span)?;
                update = Some(build_expression(expr)?);
            }
            _ => body = Some(build_statement(inner)?),
        }
    }

    let body = body.ok_or_else(|| ParseError::Build("Missing for body".to_string(), Some(span)))?;

    Ok(Stmt::For {
        init,
        test,
        update,
        body: Box::new(body),
        span,
    })
}

fn build_statement(pair: Pair<Rule>) -> ParseResult<Stmt> {
    let span = pair_to_span(&pair);

    match pair.as_rule() {
        Rule::statement => {
            let inner = next_pair(&mut pair.into_inner(), "statement", span)?;
            build_statement(inner)
        }
        Rule::function_decl => build_function(pair),
        Rule::declare_stmt => {
            let declaration = next_pair(&mut pair.into_inner(), "declaration", span)?;
            let (kind, declarations) = build_declaration(declaration)?;
            Ok(Stmt::Declare {
                kind,
                declarations,
                span,
            })
        }
        Rule::if_stmt => build_if_stmt(pair),
        Rule::while_stmt => build_while_stmt(pair),
        Rule::for_stmt => build_for_stmt(pair),
        Rule::return_stmt => {
            let value = significant(pair).next().map(build_expression).transpose()?;
            Ok(Stmt::Return { value, span })
        }
        Rule::break_stmt => Ok(Stmt::Break { span }),
        Rule::continue_stmt => Ok(Stmt::Continue { span }),
        Rule::block => Ok(Stmt::Block {
            body: build_block(pair)?,
            span,
        }),
        Rule::empty_stmt => Ok(Stmt::Empty { span }),
        Rule::expr_stmt => {
            let expr_pair = next_pair(&mut pair.into_inner(), "expression", span)?;
            let expr = build_expression(expr_pair)?;
            Ok(Stmt::Expr { expr, span })
        }
        _ => Err(ParseError::Build(
            format!("Unexpected statement rule: {:?}", pair.as_rule()),
            Some(span),
        )),
    }
}

fn build_binary_chain(pair: Pair<Rule>) -> ParseResult<Expr> {
    let span = pair_to_span(&pair);
    let mut inner = pair.into_inner();

    let mut left = build_expression(next_pair(&mut inner, "operand", span)?)?;

    while let Some(op_pair) = inner.next() {
        let right_pair = next_pair(&mut inner, "right operand after operator", span)?;
        let right = build_expression(right_pair)?;
        let new_span = left.span().merge(&right.span());

        left = match op_pair.as_rule() {
            Rule::op_or | Rule::op_and => Expr::Logical {
                op: if op_pair.as_rule() == Rule::op_or {
                    LogicalOp::Or
                } else {
                    LogicalOp::And
                },
                left: Box::new(left),
                right: Box::new(right),
                span: new_span,
            },
            _ => {
                let op = BinaryOp::from_token(op_pair.as_str()).ok_or_else(|| {
                    ParseError::Build(
                        format!("Unknown operator '{}'", op_pair.as_str()),
                        Some(pair_to_span(&op_pair)),
                    )
                })?;
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span: new_span,
                }
            }
        };
    }

    Ok(left)
}

fn build_postfix(pair: Pair<Rule>) -> ParseResult<Expr> {
    let span = pair_to_span(&pair);
    let mut inner = pair.into_inner();
    let mut expr = build_expression(next_pair(&mut inner, "primary expression", span)?)?;

    for postfix in inner {
        let postfix_span = pair_to_span(&postfix);
        let new_span = expr.span().merge(&postfix_span);

        expr = match postfix.as_rule() {
            Rule::member_access => {
                let prop = next_pair(&mut postfix.into_inner(), "property name", postfix_span)?;
                Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(Expr::Ident {
                        name: prop.as_str().to_string(),
                        span: pair_to_span(&prop),
                    }),
                    computed: false,
                    span: new_span,
                }
            }
            Rule::index_access => {
                let index = next_pair(&mut postfix.into_inner(), "index", postfix_span)?;
                Expr::Member {
                    object: Box::new(expr),
                    property: Box::new(build_expression(index)?),
                    computed: true,
                    span: new_span,
                }
            }
            Rule::call_args => {
                let args = postfix
                    .into_inner()
                    .map(build_expression)
                    .collect::<ParseResult<Vec<_>>>()?;
                Expr::Call {
                    callee: Box::new(expr),
                    args,
                    span: new_span,
                }
            }
            rule => {
                return Err(ParseError::Build(
                    format!("Unexpected postfix rule: {:?}", rule),
                    Some(postfix_span),
                ))
            }
        };
    }

    Ok(expr)
}

fn build_expression(pair: Pair<Rule>) -> ParseResult<Expr> {
    let span = pair_to_span(&pair);

    match pair.as_rule() {
        Rule::expression => {
            let mut exprs = pair
                .into_inner()
                .map(build_expression)
                .collect::<ParseResult<Vec<_>>>()?;
            if exprs.len() == 1 {
                Ok(exprs.remove(0))
            } else {
                Ok(Expr::Sequence { exprs, span })
            }
        }
        Rule::assignment_expr => {
            let mut inner = pair.into_inner();
            let first = next_pair(&mut inner, "expression", span)?;
            let Some(op_pair) = inner.next() else {
                return build_expression(first);
            };
            let op = AssignOp::from_token(op_pair.as_str()).ok_or_else(|| {
                ParseError::Build(
                    format!("Unknown assignment operator '{}'", op_pair.as_str()),
                    Some(pair_to_span(&op_pair)),
                )
            })?;
            let target = build_expression(first)?;
            let value = build_expression(next_pair(&mut inner, "assigned value", span)?)?;
            Ok(Expr::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
                span,
            })
        }
        Rule::conditional_expr => {
            let mut inner = pair.into_inner();
            let condition = build_expression(next_pair(&mut inner, "condition", span)?)?;

            if let Some(consequent_pair) = inner.next() {
                let consequent = build_expression(consequent_pair)?;
                let alternate = build_expression(next_pair(&mut inner, "alternate", span)?)?;
                Ok(Expr::Ternary {
                    condition: Box::new(condition),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                    span,
                })
            } else {
                Ok(condition)
            }
        }
        Rule::logical_or_expr
        | Rule::logical_and_expr
        | Rule::equality_expr
        | Rule::relational_expr
        | Rule::additive_expr
        | Rule::multiplicative_expr => build_binary_chain(pair),
        Rule::unary_expr => {
            let mut inner = pair.into_inner();
            let first = next_pair(&mut inner, "unary operand", span)?;

            match first.as_rule() {
                Rule::unary_op => {
                    let op = UnaryOp::from_token(first.as_str()).ok_or_else(|| {
                        ParseError::Build(
                            format!("Unknown unary operator '{}'", first.as_str()),
                            Some(span),
                        )
                    })?;
                    let arg = build_expression(next_pair(&mut inner, "unary operand", span)?)?;
                    Ok(Expr::Unary {
                        op,
                        arg: Box::new(arg),
                        span,
                    })
                }
                _ => build_expression(first),
            }
        }
        Rule::update_expr => {
            let mut inner = pair.into_inner();
            let first = next_pair(&mut inner, "update operand", span)?;

            if first.as_rule() == Rule::update_op {
                let arg = build_expression(next_pair(&mut inner, "update operand", span)?)?;
                return Ok(Expr::Update {
                    op: update_op(first.as_str()),
                    prefix: true,
                    arg: Box::new(arg),
                    span,
                });
            }

            let arg = build_expression(first)?;
            match inner.next() {
                Some(op_pair) => Ok(Expr::Update {
                    op: update_op(op_pair.as_str()),
                    prefix: false,
                    arg: Box::new(arg),
                    span,
                }),
                None => Ok(arg),
            }
        }
        Rule::postfix_expr => build_postfix(pair),
        Rule::identifier => Ok(Expr::Ident {
            name: pair.as_str().to_string(),
            span,
        }),
        Rule::number => {
            let num_str = pair.as_str();
            let v = num_str.parse::<f64>().map_err(|e| {
                ParseError::Build(
                    format!("Failed to parse number '{}': {}", num_str, e),
                    Some(span),
                )
            })?;
            Ok(Expr::LitNum { v, span })
        }
        Rule::string => {
            let raw = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            Ok(Expr::LitStr {
                v: unescape(raw),
                span,
            })
        }
        Rule::boolean => Ok(Expr::LitBool {
            v: pair.as_str() == "true",
            span,
        }),
        Rule::null_lit => Ok(Expr::LitNull { span }),
        Rule::array_lit => {
            let elements = pair
                .into_inner()
                .map(build_expression)
                .collect::<ParseResult<Vec<_>>>()?;
            Ok(Expr::LitList { elements, span })
        }
        _ => Err(ParseError::Build(
            format!("Unexpected expression rule: {:?}", pair.as_rule()),
            Some(span),
        )),
    }
}

fn update_op(token: &str) -> UpdateOp {
    if token == "--" {
        UpdateOp::Decrement
    } else {
        UpdateOp::Increment
    }
}

/// Resolve backslash escapes in a quoted string body
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}
