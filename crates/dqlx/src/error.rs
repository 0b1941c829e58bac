use thiserror::Error;

pub type DqlResult<T> = Result<T, DqlError>;

/// Errors raised while compiling a query or mutation.
///
/// Compilation is pure, so every error is final: the whole compilation is
/// aborted and no partial text is returned.
#[derive(Error, Debug)]
pub enum DqlError {
    /// An operand has the wrong shape for the clause it is used in,
    /// e.g. ordering by an expression that is not `val(..)`.
    #[error("malformed operand in {context}: {message}")]
    MalformedOperand { context: String, message: String },

    #[error("type mismatch in {context}: expected {expected}, got {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// A value that must be list-like was not.
    #[error("expected a list operand, got {0}")]
    NotAList(String),

    #[error("failed to serialize mutation payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl DqlError {
    pub(crate) fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        DqlError::MalformedOperand {
            context: context.into(),
            message: message.into(),
        }
    }

    pub(crate) fn mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        DqlError::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}
