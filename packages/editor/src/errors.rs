//! Error types for the editor

use crate::document::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Store error: {0}")]
    Store(#[from] quire_common::StoreError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Document is not in edit mode")]
    NotEditing,

    #[error("Persisted node {0} must be deleted through the store")]
    PersistedDelete(NodeId),

    #[error("Subsection not found: {0}")]
    UnknownSubsection(NodeId),
}
