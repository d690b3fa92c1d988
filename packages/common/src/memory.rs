//! In-memory [`RemoteStore`] with call recording and failure injection.
//!
//! Mirrors the resource server's rules (validation, unknown parents,
//! cascading deletes, append-by-default ordering) so editor code can be
//! exercised without a network.

use crate::api::{
    DocumentPatch, DocumentRecord, DocumentSummary, NewDocument, NewSection, NewSubsection,
    SectionPatch, SectionRecord, SubsectionPatch, SubsectionRecord, Validate,
};
use crate::error::StoreError;
use crate::result::StoreResult;
use crate::store::RemoteStore;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

/// Operation kind, used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    ListDocuments,
    FetchDocument,
    CreateDocument,
    UpdateDocument,
    DeleteDocument,
    CreateSection,
    UpdateSection,
    DeleteSection,
    CreateSubsection,
    UpdateSubsection,
    DeleteSubsection,
}

/// A recorded call, in the order it was received
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    ListDocuments,
    FetchDocument(String),
    CreateDocument(NewDocument),
    UpdateDocument(String, DocumentPatch),
    DeleteDocument(String),
    CreateSection(NewSection),
    UpdateSection(String, SectionPatch),
    DeleteSection(String),
    CreateSubsection(NewSubsection),
    UpdateSubsection(String, SubsectionPatch),
    DeleteSubsection(String),
}

impl StoreCall {
    pub fn op(&self) -> StoreOp {
        match self {
            StoreCall::ListDocuments => StoreOp::ListDocuments,
            StoreCall::FetchDocument(_) => StoreOp::FetchDocument,
            StoreCall::CreateDocument(_) => StoreOp::CreateDocument,
            StoreCall::UpdateDocument(..) => StoreOp::UpdateDocument,
            StoreCall::DeleteDocument(_) => StoreOp::DeleteDocument,
            StoreCall::CreateSection(_) => StoreOp::CreateSection,
            StoreCall::UpdateSection(..) => StoreOp::UpdateSection,
            StoreCall::DeleteSection(_) => StoreOp::DeleteSection,
            StoreCall::CreateSubsection(_) => StoreOp::CreateSubsection,
            StoreCall::UpdateSubsection(..) => StoreOp::UpdateSubsection,
            StoreCall::DeleteSubsection(_) => StoreOp::DeleteSubsection,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<DocumentRecord>,
    calls: Vec<StoreCall>,
    failures: Vec<(StoreOp, StoreError)>,
}

/// Shared handle; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing documents
    pub fn with_documents(documents: Vec<DocumentRecord>) -> Self {
        let store = Self::new();
        store.lock().documents = documents;
        store
    }

    /// Make the next call of `op` fail with `error`
    ///
    /// Multiple injections for the same op are consumed in order.
    pub fn fail_next(&self, op: StoreOp, error: StoreError) {
        self.lock().failures.push((op, error));
    }

    /// Every call received so far, failed ones included
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current stored state of a document, children in stored order
    pub fn document(&self, id: &str) -> Option<DocumentRecord> {
        self.lock()
            .documents
            .iter()
            .find(|d| d.id == id)
            .map(sorted_tree)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and pop an injected failure for it, if any
    fn begin(&self, call: StoreCall) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self.lock();
        let op = call.op();
        tracing::debug!(?call, "memory store call");
        inner.calls.push(call);

        if let Some(pos) = inner.failures.iter().position(|(o, _)| *o == op) {
            let (_, error) = inner.failures.remove(pos);
            return Err(error);
        }

        Ok(inner)
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn sorted_tree(doc: &DocumentRecord) -> DocumentRecord {
    let mut doc = doc.clone();
    doc.sections.sort_by_key(|s| s.order);
    for section in &mut doc.sections {
        section.subsections.sort_by_key(|s| s.order);
    }
    doc
}

fn find_document_mut<'a>(
    docs: &'a mut [DocumentRecord],
    id: &str,
) -> StoreResult<&'a mut DocumentRecord> {
    docs.iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(|| StoreError::not_found("document", id))
}

fn find_section_mut<'a>(
    docs: &'a mut [DocumentRecord],
    id: &str,
) -> StoreResult<&'a mut SectionRecord> {
    docs.iter_mut()
        .flat_map(|d| d.sections.iter_mut())
        .find(|s| s.id == id)
        .ok_or_else(|| StoreError::not_found("section", id))
}

fn find_subsection_mut<'a>(
    docs: &'a mut [DocumentRecord],
    id: &str,
) -> StoreResult<&'a mut SubsectionRecord> {
    docs.iter_mut()
        .flat_map(|d| d.sections.iter_mut())
        .flat_map(|s| s.subsections.iter_mut())
        .find(|s| s.id == id)
        .ok_or_else(|| StoreError::not_found("subsection", id))
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_documents(&self) -> StoreResult<Vec<DocumentSummary>> {
        let inner = self.begin(StoreCall::ListDocuments)?;
        Ok(inner.documents.iter().map(DocumentRecord::summary).collect())
    }

    async fn fetch_document(&self, id: &str) -> StoreResult<DocumentRecord> {
        let inner = self.begin(StoreCall::FetchDocument(id.to_string()))?;
        inner
            .documents
            .iter()
            .find(|d| d.id == id)
            .map(sorted_tree)
            .ok_or_else(|| StoreError::not_found("document", id))
    }

    async fn create_document(&self, payload: &NewDocument) -> StoreResult<DocumentSummary> {
        let mut inner = self.begin(StoreCall::CreateDocument(payload.clone()))?;
        payload.validate()?;

        let stamp = now();
        let record = DocumentRecord {
            id: new_id(),
            title: payload.title.clone(),
            created_at: stamp.clone(),
            updated_at: stamp,
            sections: Vec::new(),
        };
        let summary = record.summary();
        inner.documents.push(record);
        Ok(summary)
    }

    async fn update_document(
        &self,
        id: &str,
        patch: &DocumentPatch,
    ) -> StoreResult<DocumentRecord> {
        let mut inner = self.begin(StoreCall::UpdateDocument(id.to_string(), patch.clone()))?;
        patch.validate()?;

        let doc = find_document_mut(&mut inner.documents, id)?;
        if let Some(title) = &patch.title {
            doc.title = title.clone();
        }
        for import in &patch.sections {
            let section_id = new_id();
            let subsections = import
                .subsections
                .iter()
                .enumerate()
                .map(|(i, sub)| SubsectionRecord {
                    id: new_id(),
                    section_id: section_id.clone(),
                    title: sub.title.clone(),
                    content: sub.content.clone(),
                    order: i as i64,
                })
                .collect();
            let order = doc.sections.len() as i64;
            doc.sections.push(SectionRecord {
                id: section_id,
                document_id: doc.id.clone(),
                title: import.title.clone(),
                order,
                subsections,
            });
        }
        doc.updated_at = now();
        Ok(sorted_tree(doc))
    }

    async fn delete_document(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.begin(StoreCall::DeleteDocument(id.to_string()))?;
        let before = inner.documents.len();
        inner.documents.retain(|d| d.id != id);
        if inner.documents.len() == before {
            return Err(StoreError::not_found("document", id));
        }
        Ok(())
    }

    async fn create_section(&self, payload: &NewSection) -> StoreResult<SectionRecord> {
        let mut inner = self.begin(StoreCall::CreateSection(payload.clone()))?;
        payload.validate()?;

        let doc = find_document_mut(&mut inner.documents, &payload.document_id)?;
        let record = SectionRecord {
            id: new_id(),
            document_id: doc.id.clone(),
            title: payload.title.clone(),
            order: payload.order.unwrap_or(doc.sections.len() as i64),
            subsections: Vec::new(),
        };
        doc.sections.push(record.clone());
        Ok(record)
    }

    async fn update_section(&self, id: &str, patch: &SectionPatch) -> StoreResult<SectionRecord> {
        let mut inner = self.begin(StoreCall::UpdateSection(id.to_string(), patch.clone()))?;
        patch.validate()?;

        let section = find_section_mut(&mut inner.documents, id)?;
        if let Some(title) = &patch.title {
            section.title = title.clone();
        }
        if let Some(order) = patch.order {
            section.order = order;
        }
        Ok(section.clone())
    }

    async fn delete_section(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.begin(StoreCall::DeleteSection(id.to_string()))?;
        for doc in &mut inner.documents {
            if let Some(pos) = doc.sections.iter().position(|s| s.id == id) {
                doc.sections.remove(pos);
                return Ok(());
            }
        }
        Err(StoreError::not_found("section", id))
    }

    async fn create_subsection(&self, payload: &NewSubsection) -> StoreResult<SubsectionRecord> {
        let mut inner = self.begin(StoreCall::CreateSubsection(payload.clone()))?;
        payload.validate()?;

        let section = find_section_mut(&mut inner.documents, &payload.section_id)?;
        let record = SubsectionRecord {
            id: new_id(),
            section_id: section.id.clone(),
            title: payload.title.clone(),
            content: payload.content.clone().unwrap_or_default(),
            order: payload
                .order
                .unwrap_or(section.subsections.len() as i64),
        };
        section.subsections.push(record.clone());
        Ok(record)
    }

    async fn update_subsection(
        &self,
        id: &str,
        patch: &SubsectionPatch,
    ) -> StoreResult<SubsectionRecord> {
        let mut inner = self.begin(StoreCall::UpdateSubsection(id.to_string(), patch.clone()))?;
        patch.validate()?;

        let subsection = find_subsection_mut(&mut inner.documents, id)?;
        if let Some(title) = &patch.title {
            subsection.title = title.clone();
        }
        if let Some(content) = &patch.content {
            subsection.content = content.clone();
        }
        if let Some(order) = patch.order {
            subsection.order = order;
        }
        Ok(subsection.clone())
    }

    async fn delete_subsection(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.begin(StoreCall::DeleteSubsection(id.to_string()))?;
        for section in inner.documents.iter_mut().flat_map(|d| d.sections.iter_mut()) {
            if let Some(pos) = section.subsections.iter().position(|s| s.id == id) {
                section.subsections.remove(pos);
                return Ok(());
            }
        }
        Err(StoreError::not_found("subsection", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, String, String) {
        let store = MemoryStore::new();
        let doc = store
            .create_document(&NewDocument {
                title: "Paper".to_string(),
            })
            .await
            .unwrap();
        let section = store
            .create_section(&NewSection {
                document_id: doc.id.clone(),
                title: "Chapter".to_string(),
                order: None,
            })
            .await
            .unwrap();
        (store, doc.id, section.id)
    }

    #[tokio::test]
    async fn test_create_under_unknown_parent_is_not_found() {
        let store = MemoryStore::new();
        let result = store
            .create_section(&NewSection {
                document_id: "missing".to_string(),
                title: "Chapter".to_string(),
                order: None,
            })
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_without_title_is_validation_error() {
        let (store, doc_id, _) = seeded().await;
        let result = store
            .create_section(&NewSection {
                document_id: doc_id,
                title: String::new(),
                order: None,
            })
            .await;

        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_section_cascades() {
        let (store, doc_id, section_id) = seeded().await;
        let sub = store
            .create_subsection(&NewSubsection {
                section_id: section_id.clone(),
                title: "Topic".to_string(),
                content: None,
                order: None,
            })
            .await
            .unwrap();
        assert_eq!(sub.content, "");

        store.delete_section(&section_id).await.unwrap();

        let doc = store.document(&doc_id).unwrap();
        assert!(doc.sections.is_empty());
        assert!(matches!(
            store.delete_subsection(&sub.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let (store, _, section_id) = seeded().await;
        store.fail_next(StoreOp::UpdateSection, StoreError::Server("boom".to_string()));

        let patch = SectionPatch {
            title: Some("Renamed".to_string()),
            order: None,
        };
        assert_eq!(
            store.update_section(&section_id, &patch).await,
            Err(StoreError::Server("boom".to_string()))
        );
        assert_eq!(
            store.update_section(&section_id, &patch).await.unwrap().title,
            "Renamed"
        );

        let updates = store
            .calls()
            .into_iter()
            .filter(|c| c.op() == StoreOp::UpdateSection)
            .count();
        assert_eq!(updates, 2);
    }

    #[tokio::test]
    async fn test_fetch_sorts_children_by_order() {
        let (store, doc_id, _) = seeded().await;
        store
            .create_section(&NewSection {
                document_id: doc_id.clone(),
                title: "First".to_string(),
                order: Some(0),
            })
            .await
            .unwrap();

        let listed = store.list_documents().await.unwrap();
        assert_eq!(listed.len(), 1);

        let doc = store.fetch_document(&doc_id).await.unwrap();
        let orders: Vec<i64> = doc.sections.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 0]);
        assert_eq!(doc.sections[0].title, "Chapter");
    }
}
