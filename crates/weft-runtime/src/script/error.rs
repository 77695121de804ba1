// crates/weft-runtime/src/script/error.rs
//! Errors raised while parsing or evaluating template expressions.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A name that no scope frame, model field, global or host function defines.
    #[error("'{0}' is not defined")]
    Unbound(String),

    #[error("Syntax error in '{expr}': {message}")]
    Syntax { expr: String, message: String },

    #[error("Type error: {0}")]
    Type(String),

    #[error("Cannot assign to '{target}': {reason}")]
    Assignment { target: String, reason: String },

    #[error("Function '{name}' failed: {message}")]
    Call { name: String, message: String },
}

impl EvalError {
    /// Binding errors are the ones worth retrying against the root scope.
    pub fn is_binding(&self) -> bool {
        matches!(self, EvalError::Unbound(_))
    }

    pub(crate) fn syntax(expr: &str, message: impl Into<String>) -> Self {
        EvalError::Syntax {
            expr: expr.to_string(),
            message: message.into(),
        }
    }
}
