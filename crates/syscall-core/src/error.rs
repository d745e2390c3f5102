//! Error types for System Call
//!
//! All fallible operations return `Result<T, Error>`.
//! The `Display` form of every variant is the bare message, so a batch
//! executor can hand it back to the caller as the final output entry.

use thiserror::Error;

/// System Call error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed command definition (format string)
    #[error("{0}")]
    GrammarSyntax(String),

    /// Malformed call input, or the wrong number of calls
    #[error("{0}")]
    CallSyntax(String),

    /// Call tokens do not fully match any registered command
    #[error("{0}")]
    CommandNotFound(String),

    /// Argument is absent or cannot be decoded as the requested shape
    #[error("{0}")]
    ArgumentDecode(String),
}

impl Error {
    /// Short, stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::GrammarSyntax(_) => "grammar syntax",
            Error::CallSyntax(_) => "call syntax",
            Error::CommandNotFound(_) => "command not found",
            Error::ArgumentDecode(_) => "argument decode",
        }
    }
}

/// Result type alias for System Call operations
pub type Result<T> = std::result::Result<T, Error>;
