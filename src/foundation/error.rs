use crate::expression::error::CompileError;

/// Convenience result type used across shadegraph.
pub type ShadegraphResult<T> = Result<T, ShadegraphError>;

/// Top-level error taxonomy used by the public API.
#[derive(thiserror::Error, Debug)]
pub enum ShadegraphError {
    /// Invalid user-provided data outside the expression pipeline (bad cell
    /// writes, malformed templates, out-of-range vector widths, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Expression compilation failure with source-offset context.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Errors when serializing or deserializing effect definitions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShadegraphError {
    /// Build a [`ShadegraphError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShadegraphError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// The compile error inside this error, if it is one.
    pub fn as_compile(&self) -> Option<&CompileError> {
        match self {
            Self::Compile(e) => Some(e),
            _ => None,
        }
    }
}
