//! # Quire Editor
//!
//! Client-side editing engine for Quire documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: Document → Section → Subsection   │
//! │  - Local placeholder ids until promotion    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutations: pure tree edits                  │
//! │  - &Document in, new Document out           │
//! │  - Siblings renumbered from 0               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ reconcile: snapshot vs working copy         │
//! │  - Sequential create/update calls           │
//! │  - Stops at the first failure               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ RemoteStore (quire-common / quire-client)   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshot mirrors the store**: only successful calls advance it
//! 2. **Edits are local**: nothing reaches the store until save
//! 3. **Deletes are immediate**: persisted nodes are deleted remotely first
//! 4. **No rollback**: a failed save keeps every promotion made before it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_editor::{EditSession, Mutation};
//!
//! let mut session = EditSession::load(store, "doc-id").await?;
//! session.begin_edit();
//!
//! session.apply(Mutation::AddSection)?;
//! session.apply(Mutation::RenameDocument {
//!     title: "Field notes".to_string(),
//! })?;
//!
//! let stats = session.save().await?;
//! ```

mod document;
mod errors;
mod mutations;
mod reconcile;
mod session;

pub use document::{
    Document, NodeId, Section, Subsection, NEW_SECTION_TITLE, NEW_SUBSECTION_TITLE,
};
pub use errors::EditorError;
pub use mutations::{
    add_section, add_subsection, remove_section, remove_subsection, rename_document,
    rename_section, rename_subsection, reorder, update_subsection_content, Mutation,
    MutationError, NodeKind,
};
pub use reconcile::{reconcile, SaveOutcome, SaveStats};
pub use session::EditSession;
