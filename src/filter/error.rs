// src/filter/error.rs

use thiserror::Error;

/// Errors raised while parsing a test-case filter string.
///
/// These are caller input errors: they are surfaced straight from
/// [`FilterExpression::parse`](super::FilterExpression::parse) and never
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterFormatError {
    #[error("filter contains an empty parenthesis '()'")]
    EmptyParenthesis,

    #[error("missing operand for '&' or '|'")]
    MissingOperand,

    #[error("missing '(' for a ')'")]
    MissingOpenParenthesis,

    #[error("missing ')' for a '('")]
    MissingCloseParenthesis,

    #[error("missing '&' or '|' between conditions")]
    MissingOperator,

    #[error("invalid condition '{0}': expected <property><operator><value>")]
    InvalidCondition(String),

    #[error("invalid escape sequence in '{0}'")]
    InvalidEscapeSequence(String),
}
