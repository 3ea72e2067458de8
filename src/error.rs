use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvalError>;

/// Everything that can go wrong while tokenizing, evaluating or assigning.
/// None of these are fatal: the caller keeps its last good result around.
#[derive(Debug, Clone, PartialEq, Diagnostic, Error)]
pub enum EvalError {
    #[error("malformed number literal '{literal}'")]
    #[diagnostic(code = "malformed_literal")]
    MalformedLiteral {
        literal: String,
        #[label("not a number")]
        span: SourceSpan,
    },

    #[error("unbalanced grouping: {0}")]
    #[diagnostic(code = "unbalanced_grouping")]
    UnbalancedGrouping(String),

    #[error("invalid call to function '{name}': {reason}")]
    #[diagnostic(code = "invalid_function_call")]
    InvalidFunctionCall { name: String, reason: String },

    #[error("cannot combine vectors of length {left} and {right}")]
    #[diagnostic(
        code = "shape_mismatch",
        help = "operands must have the same length, or one of them must be a scalar"
    )]
    ShapeMismatch { left: usize, right: usize },

    #[error("malformed expression: {0}")]
    #[diagnostic(code = "malformed_expression")]
    MalformedExpression(String),
}

impl EvalError {
    pub(crate) fn invalid_call(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFunctionCall {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedExpression(reason.into())
    }

    pub(crate) fn unbalanced(reason: impl Into<String>) -> Self {
        Self::UnbalancedGrouping(reason.into())
    }
}
