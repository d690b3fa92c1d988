use thiserror::Error;

/// A payload failed boundary validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Normalized failure of a single remote store call
///
/// The message carried by each variant is what the editor surfaces to the
/// user, so it should be readable on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request was rejected (missing or invalid fields)
    #[error("{0}")]
    Validation(String),

    /// The target (or its declared parent) does not exist
    #[error("{0}")]
    NotFound(String),

    /// The store accepted the request but failed to process it
    #[error("{0}")]
    Server(String),

    /// The request never completed (connection, decoding)
    #[error("{0}")]
    Transport(String),
}

impl StoreError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        StoreError::NotFound(format!("{kind} {id} not found"))
    }

    /// The user-facing message
    pub fn message(&self) -> &str {
        match self {
            StoreError::Validation(m)
            | StoreError::NotFound(m)
            | StoreError::Server(m)
            | StoreError::Transport(m) => m,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        StoreError::Validation(e.to_string())
    }
}
