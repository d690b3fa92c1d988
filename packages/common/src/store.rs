//! # Remote Store Boundary
//!
//! One method per entity per operation. Each call is exactly one round trip
//! against the store and comes back as a [`StoreResult`]; implementations
//! never retry and never panic on a failed request.

use crate::api::{
    DocumentPatch, DocumentRecord, DocumentSummary, NewDocument, NewSection, NewSubsection,
    SectionPatch, SectionRecord, SubsectionPatch, SubsectionRecord,
};
use crate::result::StoreResult;
use async_trait::async_trait;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Flat listing, no descendants
    async fn list_documents(&self) -> StoreResult<Vec<DocumentSummary>>;

    /// Document with all sections and their subsections
    async fn fetch_document(&self, id: &str) -> StoreResult<DocumentRecord>;

    async fn create_document(&self, payload: &NewDocument) -> StoreResult<DocumentSummary>;

    async fn update_document(&self, id: &str, patch: &DocumentPatch)
        -> StoreResult<DocumentRecord>;

    /// Cascades to sections and subsections
    async fn delete_document(&self, id: &str) -> StoreResult<()>;

    async fn create_section(&self, payload: &NewSection) -> StoreResult<SectionRecord>;

    async fn update_section(&self, id: &str, patch: &SectionPatch) -> StoreResult<SectionRecord>;

    /// Cascades to subsections
    async fn delete_section(&self, id: &str) -> StoreResult<()>;

    async fn create_subsection(&self, payload: &NewSubsection) -> StoreResult<SubsectionRecord>;

    async fn update_subsection(
        &self,
        id: &str,
        patch: &SubsectionPatch,
    ) -> StoreResult<SubsectionRecord>;

    async fn delete_subsection(&self, id: &str) -> StoreResult<()>;
}
