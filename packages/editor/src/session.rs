//! # Edit Session
//!
//! One user's editing state for one document.
//!
//! The session holds two trees:
//! - the **snapshot**, mirroring the store as of the last successful sync
//! - the **working copy**, reflecting every local edit
//!
//! They are equal after loading and after a successful save. Edits only
//! touch the working copy and require edit mode. Saving diffs the two trees
//! through [`reconcile`]. Deletes bypass the save batch entirely: a
//! persisted node is deleted remotely right away, and only removed locally
//! once the store confirms.

use crate::document::{Document, NodeId, Subsection};
use crate::mutations::{remove_section, remove_subsection, Mutation, MutationError};
use crate::reconcile::{reconcile, SaveStats};
use crate::EditorError;
use quire_common::RemoteStore;

pub struct EditSession<S> {
    store: S,
    snapshot: Document,
    working: Document,
    editing: bool,
    /// Message of the last failed remote call, cleared by the next success
    last_error: Option<String>,
    selected: Option<NodeId>,
}

impl<S: RemoteStore> EditSession<S> {
    /// Fetch a document and start a session on it (not in edit mode)
    pub async fn load(store: S, id: &str) -> Result<Self, EditorError> {
        let record = store.fetch_document(id).await?;
        tracing::info!(id, sections = record.sections.len(), "document loaded");
        Ok(Self::from_document(store, Document::from(record)))
    }

    /// Session on an already persisted tree
    pub fn from_document(store: S, document: Document) -> Self {
        Self {
            store,
            snapshot: document.clone(),
            working: document,
            editing: false,
            last_error: None,
            selected: None,
        }
    }

    /// Session on a brand-new, unsaved document, already in edit mode
    pub fn new_document(store: S, title: impl Into<String>) -> Self {
        let mut session = Self::from_document(store, Document::new_local(title));
        session.editing = true;
        session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> &Document {
        &self.snapshot
    }

    pub fn working(&self) -> &Document {
        &self.working
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Working copy has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.working != self.snapshot
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// Leave edit mode, discarding unsaved edits
    pub fn cancel_edit(&mut self) {
        self.working = self.snapshot.clone();
        self.editing = false;
        if let Some(id) = &self.selected {
            if self.working.subsection(id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Apply one edit to the working copy
    ///
    /// Invalid edits leave the working copy untouched and are reported.
    /// Removing a persisted node is rejected here: use [`Self::delete_section`]
    /// or [`Self::delete_subsection`], which delete it remotely first.
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), EditorError> {
        if !self.editing {
            return Err(EditorError::NotEditing);
        }

        if let Err(e) = mutation.validate(&self.working) {
            tracing::warn!(mutation = mutation.name(), error = %e, "mutation rejected");
            return Err(e.into());
        }

        if let Some(id) = persisted_removal(&mutation) {
            tracing::warn!(%id, "removal of a persisted node rejected");
            return Err(EditorError::PersistedDelete(id.clone()));
        }

        tracing::debug!(mutation = mutation.name(), "applying mutation");
        self.working = mutation.apply(&self.working);

        if let Mutation::RemoveSubsection { subsection_id } = &mutation {
            self.clear_selection_if(subsection_id);
        }
        if self.selected.is_some() && self.selected_subsection().is_none() {
            self.selected = None;
        }
        Ok(())
    }

    /// Push the working copy to the store
    ///
    /// On success the working copy becomes the snapshot and edit mode ends.
    /// On failure the working copy keeps every promotion made before the
    /// failing call, the snapshot advances by the calls that succeeded, and
    /// edit mode stays on.
    pub async fn save(&mut self) -> Result<SaveStats, EditorError> {
        let outcome = reconcile(&self.store, &self.snapshot, &self.working).await;

        let selected_at = self.selected_position();
        self.working = outcome.tree;
        self.selected = selected_at.and_then(|(section, sub)| {
            self.working
                .sections
                .get(section)
                .and_then(|s| s.subsections.get(sub))
                .map(|s| s.id.clone())
        });

        match outcome.error {
            None => {
                self.snapshot = self.working.clone();
                self.editing = false;
                self.last_error = None;
                Ok(outcome.stats)
            }
            Some(e) => {
                self.snapshot = outcome.synced;
                self.last_error = Some(e.message().to_string());
                Err(e.into())
            }
        }
    }

    /// Delete a section and its subsections
    pub async fn delete_section(&mut self, id: &NodeId) -> Result<(), EditorError> {
        if self.working.section(id).is_none() {
            return Err(MutationError::SectionNotFound(id.clone()).into());
        }

        if let Some(remote) = id.as_remote() {
            if let Err(e) = self.store.delete_section(remote).await {
                tracing::error!(id = remote, error = %e, "section delete failed");
                self.last_error = Some(e.message().to_string());
                return Err(e.into());
            }
            // Raw removal: the snapshot keeps the store's orders, so the
            // renumbered siblings are pushed on the next save.
            self.snapshot.sections.retain(|s| &s.id != id);
            self.last_error = None;
        }

        tracing::info!(%id, "section deleted");
        self.working = remove_section(&self.working, id);
        if self.selected.is_some() && self.selected_subsection().is_none() {
            self.selected = None;
        }
        Ok(())
    }

    pub async fn delete_subsection(&mut self, id: &NodeId) -> Result<(), EditorError> {
        if self.working.subsection(id).is_none() {
            return Err(MutationError::SubsectionNotFound(id.clone()).into());
        }

        if let Some(remote) = id.as_remote() {
            if let Err(e) = self.store.delete_subsection(remote).await {
                tracing::error!(id = remote, error = %e, "subsection delete failed");
                self.last_error = Some(e.message().to_string());
                return Err(e.into());
            }
            for section in &mut self.snapshot.sections {
                section.subsections.retain(|s| &s.id != id);
            }
            self.last_error = None;
        }

        tracing::info!(%id, "subsection deleted");
        self.working = remove_subsection(&self.working, id);
        self.clear_selection_if(id);
        Ok(())
    }

    /// Re-fetch the document, dropping unsaved edits
    pub async fn reload(&mut self) -> Result<(), EditorError> {
        let Some(id) = self.snapshot.id.as_remote().map(str::to_string) else {
            return Ok(());
        };
        let record = self.store.fetch_document(&id).await?;
        self.snapshot = Document::from(record);
        self.working = self.snapshot.clone();
        self.editing = false;
        if self.selected.is_some() && self.selected_subsection().is_none() {
            self.selected = None;
        }
        Ok(())
    }

    /// Select the subsection shown in the content pane
    pub fn select_subsection(&mut self, id: NodeId) -> Result<(), EditorError> {
        if self.working.subsection(&id).is_none() {
            return Err(EditorError::UnknownSubsection(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    /// The selected subsection, read from the working copy
    pub fn selected_subsection(&self) -> Option<&Subsection> {
        self.selected
            .as_ref()
            .and_then(|id| self.working.subsection(id))
    }

    fn clear_selection_if(&mut self, id: &NodeId) {
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
    }

    /// Position of the selected subsection in the working copy
    ///
    /// Promotion keeps tree positions, so a selected placeholder is found
    /// again by position after a save.
    fn selected_position(&self) -> Option<(usize, usize)> {
        let id = self.selected.as_ref()?;
        self.working.sections.iter().enumerate().find_map(|(i, section)| {
            section
                .subsections
                .iter()
                .position(|s| &s.id == id)
                .map(|j| (i, j))
        })
    }
}

/// Target of a removal that the store would never learn about through a save
fn persisted_removal(mutation: &Mutation) -> Option<&NodeId> {
    let id = match mutation {
        Mutation::RemoveSection { section_id } => section_id,
        Mutation::RemoveSubsection { subsection_id } => subsection_id,
        _ => return None,
    };
    (!id.is_new()).then_some(id)
}
