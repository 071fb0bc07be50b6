//! Error types.

use thiserror::Error;

/// Result type alias for automaton operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the parser and by algorithms whose preconditions do not hold.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed automaton text.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The algorithm requires a deterministic automaton.
    #[error("automaton is not deterministic: state {state:?} on {symbol:?}")]
    NotDeterministic { state: String, symbol: String },

    /// The algorithm requires a complete (total) automaton.
    #[error("automaton is not complete: state {state:?} has no transition on {symbol:?}")]
    NotComplete { state: String, symbol: String },

    /// Neither alphabet contains the other.
    #[error("incompatible alphabets: {left:?} and {right:?}")]
    IncompatibleAlphabets { left: Vec<String>, right: Vec<String> },

    /// A preorder does not range over the expected state space.
    #[error("preorder ranges over {found} states, expected {expected}")]
    PreorderMismatch { expected: usize, found: usize },

    /// A state referenced by name does not exist.
    #[error("unknown state: {0:?}")]
    UnknownState(String),

    /// A symbol referenced by name is not in the alphabet.
    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(String),

    /// I/O error (file operations).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
