//! Error types for data block parsing, value conversion and I/O.

use crate::value::ParamType;

/// Result type for data block operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, editing or writing a data block.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The text violates the data block grammar. Always fatal to the parse.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A param value could not be read as its declared type.
    #[error("type mismatch at line {line}: {source}")]
    TypeMismatch {
        line: usize,
        #[source]
        source: ValueError,
    },

    #[error("param index {index} out of bounds ({count} params)")]
    ParamIndex { index: usize, count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Line the error was detected on, for parse errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. } | Self::TypeMismatch { line, .. } => Some(*line),
            Self::ParamIndex { .. } | Self::Io(_) => None,
        }
    }
}

/// Failure to convert between text and a typed [`crate::ParamValue`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// A vector or matrix literal with the wrong number of components.
    #[error("{ty} expects {expected} components, found {found}")]
    Arity {
        ty: ParamType,
        expected: usize,
        found: usize,
    },

    /// A scalar (or a component of a composite) that does not parse.
    #[error("cannot read {text:?} as {ty}")]
    Malformed { ty: ParamType, text: String },

    /// `ParamType::None` carries no value and has no text form.
    #[error("type None has no text representation")]
    Untyped,
}
