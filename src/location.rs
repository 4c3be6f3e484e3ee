//! Source location.
//!
//! The core never constructs a `Location`; it only carries whatever the
//! parser collaborator attached to an AST node or threads one through a
//! constraint (spec §1: "carrying an opaque `Location` value").

use std::fmt;

/// A line/column coordinate, optionally spanning to an end coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Location {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn point(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            end_line: line,
            end_column: column,
        }
    }

    pub fn span(line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            line,
            column,
            end_line,
            end_column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.line, self.column) == (self.end_line, self.end_column) {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.line, self.column, self.end_line, self.end_column
            )
        }
    }
}
