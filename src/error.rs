//! Error kinds raised while parsing and evaluating SIEVE scripts.

use std::fmt;

/// A 1-based line/column coordinate inside a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SieveError {
    /// Malformed script text, arguments or blocks.
    #[error("Syntax error at {position}: {message}")]
    Syntax { message: String, position: Position },
    /// Well-formed command used where it is not legal.
    #[error("Command error: {0}")]
    Command(String),
    /// Unknown or unsupported capability.
    #[error("Feature error: {0}")]
    Feature(String),
    #[error("Address parse error: {0}")]
    AddressParse(String),
    /// Failure reported by the hosting mail system.
    #[error("Mail access error: {0}")]
    MailAccess(String),
}

impl SieveError {
    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::Command(message.into())
    }

    pub fn feature(message: impl Into<String>) -> Self {
        Self::Feature(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SieveError>;
