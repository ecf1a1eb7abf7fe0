//! Error taxonomy for the scan/parse/evaluate pipeline
//!
//! Every stage fails fast: the first error aborts the run and is surfaced
//! verbatim to the host. Positions are 1-based line:column.

use thiserror::Error;

/// Scanning failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unterminated string at line {line}:{column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("Unterminated char at line {line}:{column}")]
    UnterminatedChar { line: usize, column: usize },

    #[error("Char must be a single character at line {line}:{column}")]
    OverlongChar { line: usize, column: usize },

    #[error("Unexpected character '{ch}' at line {line}:{column}")]
    UnexpectedChar { ch: char, line: usize, column: usize },
}

/// Parsing failure. A single malformed statement aborts the whole parse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Expected {expected}, got {found} at line {line}:{column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },

    #[error("Expected {expected}, got end of input")]
    UnexpectedEnd { expected: String },

    #[error("NEXT identifier '{found}' does not match FOR identifier '{expected}' at line {line}:{column}")]
    MismatchedNext {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },
}

/// Evaluation failure. Halts the run; no output is produced past this point.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("'{0}' is not declared")]
    UndeclaredIdentifier(String),

    #[error("'{0}' is used before assignment")]
    UseBeforeAssignment(String),

    #[error("Type mismatch in {0}")]
    TypeMismatch(String),

    #[error("Index out of bounds for array '{0}'")]
    IndexOutOfBounds(String),
}

/// Any failure from the pipeline, so hosts can handle a single type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
