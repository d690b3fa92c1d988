use crate::error::StoreError;

/// Outcome of one remote store call: exactly one of value or error
pub type StoreResult<T> = Result<T, StoreError>;
