use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Input did not match `YYYY-MM-DD`, or named a day that does not exist.
    InvalidDate(String),
    /// Provider reported a media type this model does not know about.
    UnknownMediaKind(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidDate(raw) => {
                write!(f, "invalid date format: {raw:?} (expected YYYY-MM-DD)")
            }
            ModelError::UnknownMediaKind(raw) => {
                write!(f, "unknown media kind: {raw:?}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
