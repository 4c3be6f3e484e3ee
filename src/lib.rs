//! mini-bendu constraint-based type checker.
//!
//! A Hindley-Milner-flavoured inference and checking engine for a small
//! ML-family expression language: literals, lambdas, application, `let`
//! and `let rec`, tuples, row-polymorphic records, and pattern matching.
//! The core is handed an already-parsed `Expr` tree; it owns no lexer or
//! parser.

pub mod ast;
pub mod checker;
pub mod constraint;
pub mod env;
pub mod error;
pub mod generator;
pub mod location;
pub mod scheme;
pub mod solver;
pub mod substitution;
pub mod types;
pub mod unify;

pub use ast::{BaseTypeExpr, BinaryOp, Expr, ExprKind, FieldExpr, FieldPattern, MatchCase, Param, Pattern};
pub use checker::{CheckOutcome, IncrementalResult, ProgramResult, Success, TypeChecker, TypeInformation};
pub use constraint::{Constraint, ConstraintSet, Origin, Priority};
pub use env::TypeEnvironment;
pub use error::{CompilerError, CompilerWarning, ErrorCategory, Failure, Severity};
pub use location::Location;
pub use scheme::TypeScheme;
pub use solver::{solve, InstanceRegistry, SolveOutcome};
pub use substitution::Substitution;
pub use types::{fresh_type_variable, Fields, Primitive, Row, Type, TypeVariable};
pub use unify::unify;

/// Canonical instances of the primitive types, and the literal-string
/// factory, gathered under one name for callers that want `Types::Int`
/// rather than `Type::int()` (spec §6).
pub mod well_known {
    use crate::types::Type;

    pub fn int() -> Type {
        Type::int()
    }
    pub fn string() -> Type {
        Type::string()
    }
    pub fn bool() -> Type {
        Type::bool()
    }
    pub fn unit() -> Type {
        Type::unit()
    }
    pub fn literal(s: impl Into<String>) -> Type {
        Type::literal(s)
    }
}
