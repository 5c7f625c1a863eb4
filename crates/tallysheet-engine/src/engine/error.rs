//! Error types for formula construction and evaluation.

use thiserror::Error;

/// A formula failed validation while being constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("The formula is empty; it needs at least one token")]
    Empty,

    #[error("{0} is not a valid token")]
    InvalidToken(String),

    #[error("The first token must be a number, variable, or opening parenthesis, found {0}")]
    BadStart(String),

    #[error("The last token must be a number, variable, or closing parenthesis, found {0}")]
    BadEnd(String),

    #[error("Closing parenthesis at token {position} has no matching opening parenthesis")]
    UnmatchedClose { position: usize },

    #[error("{open} opening parentheses but {close} closing parentheses")]
    Unbalanced { open: usize, close: usize },

    #[error("{found} follows {after}; expected a number, variable, or opening parenthesis")]
    ExpectedOperand { after: String, found: String },

    #[error("{found} follows {after}; expected an operator or closing parenthesis")]
    ExpectedOperator { after: String, found: String },

    #[error("After normalizing {token} to {normalized}, it is not a valid variable")]
    InvalidVariable { token: String, normalized: String },

    #[error("Variable {token} (normalized {normalized}) was rejected by the validator")]
    RejectedVariable { token: String, normalized: String },
}

/// Evaluation failures. These are values, never panics: a formula that
/// divides by zero or references an undefined variable evaluates to one of
/// these.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvalError {
    #[error("The variable {0} is undefined.")]
    UndefinedVariable(String),

    #[error("Division by 0")]
    DivisionByZero,
}

impl EvalError {
    /// Human-readable reason, as shown in a cell holding this error.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
