//! # Save Reconciliation
//!
//! Turns the divergence between the last-synced snapshot and the working
//! copy into remote store calls.
//!
//! ```text
//! document   create (if new) | update title (if changed)
//!   section    create (if new) | update title/order (if changed)
//!     subsection create (if new) | update title/content/order (if changed)
//! ```
//!
//! Calls run strictly one after another, parents before children, so a new
//! section is created before its subsections reference it. The first failure
//! stops the save. Nodes promoted before the failure keep their server ids in
//! the returned tree; nothing is rolled back.
//!
//! Deletes are not part of a save. The session issues them immediately.

use crate::document::{Document, NodeId, Section, Subsection};
use quire_common::{
    DocumentPatch, NewDocument, NewSection, NewSubsection, RemoteStore, SectionPatch, StoreError,
    StoreResult, SubsectionPatch,
};

/// Counters for one save run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveStats {
    pub created: usize,
    pub updated: usize,
    /// Persisted nodes missing from the snapshot, left alone
    pub skipped: usize,
}

/// Result of a save
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// Working copy with every promotion that happened before any failure
    pub tree: Document,
    /// Snapshot advanced by every call that succeeded
    pub synced: Document,
    pub error: Option<StoreError>,
    pub stats: SaveStats,
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Push `working`'s changes relative to `snapshot` to the store
///
/// Neither input is modified; the output tree is built from a copy of
/// `working`.
pub async fn reconcile<S>(store: &S, snapshot: &Document, working: &Document) -> SaveOutcome
where
    S: RemoteStore + ?Sized,
{
    let mut run = SaveRun {
        snapshot,
        synced: snapshot.clone(),
        stats: SaveStats::default(),
    };
    let mut tree = working.clone();

    tracing::info!(document = %tree.id, nodes = tree.node_count(), "saving document");

    let error = match run.sync_document(store, &mut tree).await {
        Ok(()) => {
            tracing::info!(
                created = run.stats.created,
                updated = run.stats.updated,
                "save complete"
            );
            None
        }
        Err(e) => {
            tracing::error!(error = %e, stats = ?run.stats, "save aborted");
            Some(e)
        }
    };

    SaveOutcome {
        tree,
        synced: run.synced,
        error,
        stats: run.stats,
    }
}

struct SaveRun<'a> {
    snapshot: &'a Document,
    synced: Document,
    stats: SaveStats,
}

impl SaveRun<'_> {
    async fn sync_document<S>(&mut self, store: &S, tree: &mut Document) -> StoreResult<()>
    where
        S: RemoteStore + ?Sized,
    {
        let document_id = match &tree.id {
            NodeId::Local(_) => {
                let created = store
                    .create_document(&NewDocument {
                        title: tree.title.clone(),
                    })
                    .await?;
                tracing::debug!(id = %created.id, "document created");
                tree.id = NodeId::Remote(created.id.clone());
                self.synced.id = tree.id.clone();
                self.synced.title = created.title;
                self.stats.created += 1;
                created.id
            }
            NodeId::Remote(id) => {
                if self.snapshot.title != tree.title {
                    let patch = DocumentPatch {
                        title: Some(tree.title.clone()),
                        ..Default::default()
                    };
                    let updated = store.update_document(id, &patch).await?;
                    self.synced.title = updated.title;
                    self.stats.updated += 1;
                }
                id.clone()
            }
        };

        for section in &mut tree.sections {
            let section_id = self.sync_section(store, &document_id, section).await?;

            for subsection in &mut section.subsections {
                self.sync_subsection(store, &section_id, subsection).await?;
            }
        }

        Ok(())
    }

    /// Create or update one section, returning its server id
    async fn sync_section<S>(
        &mut self,
        store: &S,
        document_id: &str,
        section: &mut Section,
    ) -> StoreResult<String>
    where
        S: RemoteStore + ?Sized,
    {
        let id = match &section.id {
            NodeId::Local(_) => {
                let created = store
                    .create_section(&NewSection {
                        document_id: document_id.to_string(),
                        title: section.title.clone(),
                        order: Some(section.order),
                    })
                    .await?;
                tracing::debug!(placeholder = %section.id, id = %created.id, "section promoted");
                section.id = NodeId::Remote(created.id.clone());
                self.synced.sections.push(Section {
                    subsections: Vec::new(),
                    ..section.clone()
                });
                self.stats.created += 1;
                return Ok(created.id);
            }
            NodeId::Remote(id) => id.clone(),
        };

        match self.snapshot.section(&section.id) {
            Some(previous) => {
                let patch = SectionPatch {
                    title: changed(&previous.title, &section.title),
                    order: changed(&previous.order, &section.order),
                };
                if patch != SectionPatch::default() {
                    store.update_section(&id, &patch).await?;
                    if let Some(synced) =
                        self.synced.sections.iter_mut().find(|s| s.id == section.id)
                    {
                        synced.title = section.title.clone();
                        synced.order = section.order;
                    }
                    self.stats.updated += 1;
                }
            }
            None => {
                tracing::warn!(%id, "section missing from snapshot, skipping update");
                self.stats.skipped += 1;
            }
        }

        Ok(id)
    }

    async fn sync_subsection<S>(
        &mut self,
        store: &S,
        section_id: &str,
        subsection: &mut Subsection,
    ) -> StoreResult<()>
    where
        S: RemoteStore + ?Sized,
    {
        let parent = NodeId::remote(section_id);

        let id = match &subsection.id {
            NodeId::Local(_) => {
                let created = store
                    .create_subsection(&NewSubsection {
                        section_id: section_id.to_string(),
                        title: subsection.title.clone(),
                        content: Some(subsection.content.clone()),
                        order: Some(subsection.order),
                    })
                    .await?;
                tracing::debug!(
                    placeholder = %subsection.id,
                    id = %created.id,
                    "subsection promoted"
                );
                subsection.id = NodeId::Remote(created.id);
                if let Some(synced) = self.synced.sections.iter_mut().find(|s| s.id == parent) {
                    synced.subsections.push(subsection.clone());
                }
                self.stats.created += 1;
                return Ok(());
            }
            NodeId::Remote(id) => id.clone(),
        };

        match self.snapshot.subsection(&subsection.id) {
            Some(previous) => {
                let patch = SubsectionPatch {
                    title: changed(&previous.title, &subsection.title),
                    content: changed(&previous.content, &subsection.content),
                    order: changed(&previous.order, &subsection.order),
                };
                if patch != SubsectionPatch::default() {
                    store.update_subsection(&id, &patch).await?;
                    if let Some(synced) = self
                        .synced
                        .sections
                        .iter_mut()
                        .flat_map(|s| s.subsections.iter_mut())
                        .find(|s| s.id == subsection.id)
                    {
                        synced.title = subsection.title.clone();
                        synced.content = subsection.content.clone();
                        synced.order = subsection.order;
                    }
                    self.stats.updated += 1;
                }
            }
            None => {
                tracing::warn!(%id, "subsection missing from snapshot, skipping update");
                self.stats.skipped += 1;
            }
        }

        Ok(())
    }
}

fn changed<T: PartialEq + Clone>(previous: &T, current: &T) -> Option<T> {
    (previous != current).then(|| current.clone())
}
