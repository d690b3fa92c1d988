//! # Quire Client
//!
//! [`RemoteStore`] over the resource server's HTTP API.
//!
//! Every call is one request. Responses are decoded into the shared wire
//! records; failures are folded into [`StoreError`] by status:
//!
//! | response | error |
//! |---|---|
//! | 400 | `Validation` |
//! | 404 | `NotFound` |
//! | other non-success | `Server` |
//! | no response / undecodable body | `Transport` |

use async_trait::async_trait;
use quire_common::{
    Ack, DocumentPatch, DocumentRecord, DocumentSummary, ErrorBody, NewDocument, NewSection,
    NewSubsection, RemoteStore, SectionPatch, SectionRecord, StoreError, StoreResult,
    SubsectionPatch, SubsectionRecord, Validate,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpStore {
    base: Url,
    client: reqwest::Client,
}

impl HttpStore {
    /// Store rooted at `base` (e.g. `http://127.0.0.1:3030`)
    pub fn new(base: &str) -> StoreResult<Self> {
        Self::build(base, reqwest::Client::builder())
    }

    /// Store whose requests give up after `timeout`
    pub fn with_timeout(base: &str, timeout: Duration) -> StoreResult<Self> {
        Self::build(base, reqwest::Client::builder().timeout(timeout))
    }

    fn build(base: &str, builder: reqwest::ClientBuilder) -> StoreResult<Self> {
        let base = Url::parse(base)
            .map_err(|e| StoreError::Transport(format!("Invalid server URL {base}: {e}")))?;
        let client = builder
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL extended by `segments`, each percent-encoded as one segment
    ///
    /// Any path prefix on the base is kept.
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| matches!(**s, "" | "." | ".."))
        {
            return Err(StoreError::Validation(format!("Invalid id: {bad:?}")));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Transport(format!("Server URL {} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B, T>(&self, method: Method, path: &[&str], body: Option<&B>) -> StoreResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let path = url.path().to_string();
        tracing::debug!(%method, %url, "request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(%method, %path, error = %e, "request failed");
            StoreError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error = error_from_status(status, &text);
            tracing::warn!(%method, %path, %status, error = %error, "request rejected");
            return Err(error);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Transport(format!("Invalid response body: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> StoreResult<T> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    async fn delete(&self, path: &[&str]) -> StoreResult<()> {
        self.send::<(), Ack>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }
}

/// Map a non-success response to the matching error kind
pub fn error_from_status(status: StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| match status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => status.to_string(),
        });

    match status {
        StatusCode::BAD_REQUEST => StoreError::Validation(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        _ => StoreError::Server(message),
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list_documents(&self) -> StoreResult<Vec<DocumentSummary>> {
        self.get(&["api", "documents"]).await
    }

    async fn fetch_document(&self, id: &str) -> StoreResult<DocumentRecord> {
        self.get(&["api", "documents", id]).await
    }

    async fn create_document(&self, input: &NewDocument) -> StoreResult<DocumentSummary> {
        input.validate()?;
        self.send(Method::POST, &["api", "documents"], Some(input)).await
    }

    async fn update_document(&self, id: &str, patch: &DocumentPatch) -> StoreResult<DocumentRecord> {
        patch.validate()?;
        self.send(Method::PATCH, &["api", "documents", id], Some(patch))
            .await
    }

    async fn delete_document(&self, id: &str) -> StoreResult<()> {
        self.delete(&["api", "documents", id]).await
    }

    async fn create_section(&self, input: &NewSection) -> StoreResult<SectionRecord> {
        input.validate()?;
        self.send(Method::POST, &["api", "sections"], Some(input)).await
    }

    async fn update_section(&self, id: &str, patch: &SectionPatch) -> StoreResult<SectionRecord> {
        patch.validate()?;
        self.send(Method::PATCH, &["api", "sections", id], Some(patch))
            .await
    }

    async fn delete_section(&self, id: &str) -> StoreResult<()> {
        self.delete(&["api", "sections", id]).await
    }

    async fn create_subsection(&self, input: &NewSubsection) -> StoreResult<SubsectionRecord> {
        input.validate()?;
        self.send(Method::POST, &["api", "subsections"], Some(input)).await
    }

    async fn update_subsection(
        &self,
        id: &str,
        patch: &SubsectionPatch,
    ) -> StoreResult<SubsectionRecord> {
        patch.validate()?;
        self.send(Method::PATCH, &["api", "subsections", id], Some(patch))
            .await
    }

    async fn delete_subsection(&self, id: &str) -> StoreResult<()> {
        self.delete(&["api", "subsections", id]).await
    }
}
