//! AST node shapes consumed by the core (spec §6).
//!
//! The core is handed a finished tree built by a parser collaborator; these
//! types exist only so the generator and the test suite have something
//! concrete to traverse. Every node carries a `Location`.

use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub location: Location,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(location: Location, kind: ExprKind) -> Self {
        Self { location, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Neq | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// A lambda/let parameter, with an optional type annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<BaseTypeExpr>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
        }
    }

    pub fn with_annotation(name: impl Into<String>, annotation: BaseTypeExpr) -> Self {
        Self {
            name: name.into(),
            annotation: Some(annotation),
        }
    }
}

/// A single `name = value` pair inside a record literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExpr {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    LiteralInt(i64),
    LiteralBool(bool),
    LiteralString(String),
    Var(String),
    Tuple(Vec<Pattern>),
    Record(Vec<FieldPattern>),
}

/// A single `name` or `name: pattern` entry inside a record pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPattern {
    pub name: String,
    pub pattern: Pattern,
}

/// A type annotation as written by the user, e.g. `Int`, `Int -> Bool`.
/// Resolved to a `Type` by the generator (spec §4.7 Lambda rule).
#[derive(Debug, Clone, PartialEq)]
pub enum BaseTypeExpr {
    Named(String),
    Function(Box<BaseTypeExpr>, Box<BaseTypeExpr>),
    Tuple(Vec<BaseTypeExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    LiteralInt(i64),
    LiteralString(String),
    LiteralBool(bool),
    Var(String),
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Multi-argument lambdas curry at generation time (spec §4.7).
    Lambda {
        params: Vec<Param>,
        body: Box<Expr>,
    },
    Application {
        function: Box<Expr>,
        argument: Box<Expr>,
    },
    Let {
        name: String,
        recursive: bool,
        type_params: Vec<String>,
        parameters: Option<Vec<Param>>,
        annotation: Option<BaseTypeExpr>,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    /// Mutually recursive bindings: every name is bound to its own fresh
    /// variable before any value is generated (spec §4.7 "For mutual
    /// recursion").
    LetRecMutual {
        bindings: Vec<(String, Expr)>,
        body: Box<Expr>,
    },
    Tuple(Vec<Expr>),
    Record(Vec<FieldExpr>),
    Projection {
        record: Box<Expr>,
        field: String,
    },
    Match {
        scrutinee: Box<Expr>,
        cases: Vec<MatchCase>,
    },
}
