//! Runtime value types for branch-condition evaluation

use serde::{Deserialize, Serialize};

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Val {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Val>),
}

impl Val {
    /// Check if value is truthy (for conditionals)
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Undefined | Val::Null => false,
            Val::Bool(b) => *b,
            Val::Num(n) => *n != 0.0 && !n.is_nan(),
            Val::Str(s) => !s.is_empty(),
            Val::List(_) => true,
        }
    }

    /// Numeric coercion used by arithmetic and relational operators
    pub fn to_number(&self) -> f64 {
        match self {
            Val::Undefined => f64::NAN,
            Val::Null => 0.0,
            Val::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Val::Num(n) => *n,
            Val::Str(s) => parse_numeric(s),
            Val::List(items) => match items.as_slice() {
                [] => 0.0,
                [single] => Val::Str(single.to_display()).to_number(),
                _ => f64::NAN,
            },
        }
    }

    /// String coercion used by concatenation and array joins
    pub fn to_display(&self) -> String {
        match self {
            Val::Undefined => "undefined".to_string(),
            Val::Null => "null".to_string(),
            Val::Bool(b) => b.to_string(),
            Val::Num(n) => format_number(*n),
            Val::Str(s) => s.clone(),
            Val::List(items) => items
                .iter()
                .map(|item| match item {
                    Val::Undefined | Val::Null => String::new(),
                    other => other.to_display(),
                })
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Result of the `typeof` operator
    pub fn type_name(&self) -> &'static str {
        match self {
            Val::Undefined => "undefined",
            Val::Bool(_) => "boolean",
            Val::Num(_) => "number",
            Val::Str(_) => "string",
            Val::Null | Val::List(_) => "object",
        }
    }
}

/// Shortest round-trip rendering, with the special spellings of non-finite values
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else {
        n.to_string()
    }
}

fn parse_numeric(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            f64::NAN
        }
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}
