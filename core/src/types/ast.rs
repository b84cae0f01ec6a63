//! Abstract Syntax Tree node types

use serde::{Deserialize, Serialize};

/// Source location span for error reporting and line classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset
    pub end: usize,
    /// Start line (0-indexed)
    pub start_line: usize,
    /// Start column (0-indexed)
    pub start_col: usize,
    /// End line (0-indexed)
    pub end_line: usize,
    /// End column (0-indexed)
    pub end_col: usize,
}

impl Span {
    pub fn new(
        start: usize,
        end: usize,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Self {
        Self {
            start,
            end,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a span that covers both self and other
    pub fn merge(&self, other: &Span) -> Span {
        let first = if self.start <= other.start { self } else { other };
        let last = if self.end >= other.end { self } else { other };
        Span {
            start: first.start,
            end: last.end,
            start_line: first.start_line,
            start_col: first.start_col,
            end_line: last.end_line,
            end_col: last.end_col,
        }
    }
}

/// Helper function for serde to skip serializing default spans
fn is_default_span(span: &Span) -> bool {
    *span == Span::default()
}

/* ===================== Operators ===================== */

/// Variable declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Let,
    Const,
    Var,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Let => "let",
            VarKind::Const => "const",
            VarKind::Var => "var",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "let" => Some(VarKind::Let),
            "const" => Some(VarKind::Const),
            "var" => Some(VarKind::Var),
            _ => None,
        }
    }
}

/// Arithmetic and comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::Lte,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::Gte,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "===" => BinaryOp::StrictEq,
            "!==" => BinaryOp::StrictNe,
            _ => return None,
        })
    }
}

/// Short-circuit operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And, // &&
    Or,  // ||
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
    TypeOf,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "~",
            UnaryOp::TypeOf => "typeof",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "!" => UnaryOp::Not,
            "-" => UnaryOp::Neg,
            "+" => UnaryOp::Plus,
            "~" => UnaryOp::BitNot,
            "typeof" => UnaryOp::TypeOf,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

/// Assignment operator; compound forms carry the binary operator they apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Compound(BinaryOp::Add) => "+=",
            AssignOp::Compound(BinaryOp::Sub) => "-=",
            AssignOp::Compound(BinaryOp::Mul) => "*=",
            AssignOp::Compound(BinaryOp::Div) => "/=",
            AssignOp::Compound(BinaryOp::Rem) => "%=",
            // Comparison operators have no compound form; the parser never builds these
            AssignOp::Compound(_) => "=",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => AssignOp::Assign,
            "+=" => AssignOp::Compound(BinaryOp::Add),
            "-=" => AssignOp::Compound(BinaryOp::Sub),
            "*=" => AssignOp::Compound(BinaryOp::Mul),
            "/=" => AssignOp::Compound(BinaryOp::Div),
            "%=" => AssignOp::Compound(BinaryOp::Rem),
            _ => return None,
        })
    }
}

/* ===================== Program ===================== */

/// A parsed source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/* ===================== Statements ===================== */

/// One `name = init` entry of a variable declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
    #[serde(default, skip_serializing_if = "is_default_span")]
    pub span: Span,
}

/// Initializer clause of a C-style for loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ForInit {
    Declare {
        kind: VarKind,
        declarations: Vec<Declarator>,
    },
    Expr {
        expr: Expr,
    },
}

/// Statement AST node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Stmt {
    Function {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Declare {
        kind: VarKind,
        declarations: Vec<Declarator>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    If {
        test: Expr,
        then_s: Box<Stmt>,
        else_s: Option<Box<Stmt>>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Return {
        value: Option<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Block {
        body: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Expr {
        expr: Expr,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Break {
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Continue {
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Empty {
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
}

impl Stmt {
    /// Get the span of this statement
    pub fn span(&self) -> Span {
        match self {
            Stmt::Function { span, .. } => *span,
            Stmt::Declare { span, .. } => *span,
            Stmt::If { span, .. } => *span,
            Stmt::While { span, .. } => *span,
            Stmt::For { span, .. } => *span,
            Stmt::Return { span, .. } => *span,
            Stmt::Block { span, .. } => *span,
            Stmt::Expr { span, .. } => *span,
            Stmt::Break { span } => *span,
            Stmt::Continue { span } => *span,
            Stmt::Empty { span } => *span,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Stmt::Empty { .. })
    }
}

/* ===================== Expressions ===================== */

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Expr {
    LitBool {
        v: bool,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    LitNum {
        v: f64,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    LitStr {
        v: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    LitNull {
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    LitList {
        elements: Vec<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Ident {
        name: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// `object.property` (computed = false, property is an Ident) or `object[property]`
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Ternary {
        condition: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Sequence {
        exprs: Vec<Expr>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
}

impl Expr {
    /// Get the span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::LitBool { span, .. } => *span,
            Expr::LitNum { span, .. } => *span,
            Expr::LitStr { span, .. } => *span,
            Expr::LitNull { span } => *span,
            Expr::LitList { span, .. } => *span,
            Expr::Ident { span, .. } => *span,
            Expr::Member { span, .. } => *span,
            Expr::Call { span, .. } => *span,
            Expr::Binary { span, .. } => *span,
            Expr::Logical { span, .. } => *span,
            Expr::Unary { span, .. } => *span,
            Expr::Update { span, .. } => *span,
            Expr::Assign { span, .. } => *span,
            Expr::Ternary { span, .. } => *span,
            Expr::Sequence { span, .. } => *span,
        }
    }

    /// Identifier without position, used for synthesized bindings
    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Ident {
            name: name.into(),
            span: Span::default(),
        }
    }
}
