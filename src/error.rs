//! Error taxonomy (spec §4.8, §7).
//!
//! Modelled directly on the teacher's `types::error::TypeError` /
//! `TypeErrors`: a plain enum with a hand-written `Display`, no `thiserror`.
//! Errors are values end to end; nothing here is ever re-parsed from a
//! string for a decision.

use std::fmt;

use crate::location::Location;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Type,
    Semantic,
    Internal,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Structured compiler errors (spec §4.8). Not exhaustive of every kind a
/// real driver might add, but covers every kind named in the spec.
#[derive(Debug, Clone, PartialEq)]
pub enum CompilerError {
    UndefinedVariable {
        name: String,
    },
    TypeMismatch {
        expected: Type,
        actual: Type,
        context: Option<String>,
    },
    OccursCheckFailure {
        variable: crate::types::TypeVariable,
        containing_type: Type,
    },
    NonExhaustivePatternMatch {
        missing_patterns: Vec<String>,
    },
    DuplicateBinding {
        name: String,
    },
    InvalidRecordProjection {
        ty: Type,
        field: String,
    },
    InstanceNotSatisfied {
        ty: Type,
        class_name: String,
    },
    CompilerBug {
        message: String,
        cause: Option<Box<CompilerError>>,
    },
    /// Wraps any of the above with the location of the constraint or
    /// sub-expression that produced it (spec §4.5, §4.8).
    Located {
        inner: Box<CompilerError>,
        location: Location,
    },
}

impl CompilerError {
    pub fn located(self, location: Location) -> CompilerError {
        CompilerError::Located {
            inner: Box::new(self),
            location,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CompilerError::UndefinedVariable { .. }
            | CompilerError::TypeMismatch { .. }
            | CompilerError::OccursCheckFailure { .. }
            | CompilerError::NonExhaustivePatternMatch { .. }
            | CompilerError::InvalidRecordProjection { .. }
            | CompilerError::InstanceNotSatisfied { .. } => ErrorCategory::Type,
            CompilerError::DuplicateBinding { .. } => ErrorCategory::Semantic,
            CompilerError::CompilerBug { .. } => ErrorCategory::Internal,
            CompilerError::Located { inner, .. } => inner.category(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            CompilerError::Located { inner, .. } => inner.severity(),
            _ => Severity::Error,
        }
    }

    /// The location attached to this error, if any (only `Located` wraps
    /// one; a raw error passes through unwrapped per spec §4.5).
    pub fn location(&self) -> Option<Location> {
        match self {
            CompilerError::Located { location, .. } => Some(*location),
            _ => None,
        }
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerError::UndefinedVariable { name } => {
                write!(f, "undefined variable '{}'", name)
            }
            CompilerError::TypeMismatch {
                expected,
                actual,
                context,
            } => {
                write!(f, "type mismatch: expected {}, got {}", expected, actual)?;
                if let Some(ctx) = context {
                    write!(f, " ({})", ctx)?;
                }
                Ok(())
            }
            CompilerError::OccursCheckFailure {
                variable,
                containing_type,
            } => write!(
                f,
                "occurs check failed: {} occurs in {}",
                variable, containing_type
            ),
            CompilerError::NonExhaustivePatternMatch { missing_patterns } => {
                write!(f, "non-exhaustive match, missing: {}", missing_patterns.join(", "))
            }
            CompilerError::DuplicateBinding { name } => {
                write!(f, "duplicate binding '{}'", name)
            }
            CompilerError::InvalidRecordProjection { ty, field } => {
                write!(f, "type {} has no field '{}'", ty, field)
            }
            CompilerError::InstanceNotSatisfied { ty, class_name } => {
                write!(f, "type {} does not satisfy instance '{}'", ty, class_name)
            }
            CompilerError::CompilerBug { message, cause } => {
                write!(f, "internal compiler error: {}", message)?;
                if let Some(cause) = cause {
                    write!(f, " (caused by: {})", cause)?;
                }
                Ok(())
            }
            CompilerError::Located { inner, location } => {
                write!(f, "{} at {}", inner, location)
            }
        }
    }
}

impl std::error::Error for CompilerError {}

/// A non-blocking diagnostic (spec §7: "never blocks a Success result").
#[derive(Debug, Clone, PartialEq)]
pub enum CompilerWarning {
    UnusedVariable { name: String, location: Location },
    UnreachablePattern { location: Location },
}

impl fmt::Display for CompilerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompilerWarning::UnusedVariable { name, location } => {
                write!(f, "unused variable '{}' at {}", name, location)
            }
            CompilerWarning::UnreachablePattern { location } => {
                write!(f, "unreachable pattern at {}", location)
            }
        }
    }
}

/// A failed type-check call: both the structured error (for programmatic
/// inspection) and a human-readable string (spec §4.5, §7: "for backward
/// compatibility with existing drivers").
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub compiler_error: CompilerError,
    pub message: String,
}

impl Failure {
    pub fn new(compiler_error: CompilerError) -> Self {
        let message = compiler_error.to_string();
        Self {
            compiler_error,
            message,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Failure {}
