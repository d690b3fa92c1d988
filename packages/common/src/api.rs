//! # Wire Model
//!
//! JSON records and request payloads exchanged between the editor and the
//! resource server. Field names are camelCase on the wire.
//!
//! Required string fields deserialize with a default so that a missing field
//! reaches [`Validate::validate`] and is reported as a validation error,
//! instead of failing inside the JSON decoder with a shape error.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Flat document row, as returned by the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Document with its full descendant tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
}

impl DocumentRecord {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    pub id: String,
    pub document_id: String,
    pub title: String,
    pub order: i64,
    #[serde(default)]
    pub subsections: Vec<SubsectionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsectionRecord {
    pub id: String,
    pub section_id: String,
    pub title: String,
    pub content: String,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    /// Appends after the existing sections when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubsection {
    #[serde(default)]
    pub section_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

/// Partial document update
///
/// `sections` appends whole section trees to the document in one
/// transaction (bulk import).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionImport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionImport {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subsections: Vec<SubsectionImport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsectionImport {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Success acknowledgement for deletes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
}

/// Body of every non-success response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Structural validation applied at the boundary, before any store logic
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn check_order(order: Option<i64>) -> Result<(), ValidationError> {
    match order {
        Some(o) if o < 0 => Err(ValidationError::InvalidField {
            field: "order",
            reason: format!("must not be negative (got {o})"),
        }),
        _ => Ok(()),
    }
}

impl Validate for NewDocument {
    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)
    }
}

impl Validate for NewSection {
    fn validate(&self) -> Result<(), ValidationError> {
        require("documentId", &self.document_id)?;
        require("title", &self.title)?;
        check_order(self.order)
    }
}

impl Validate for NewSubsection {
    fn validate(&self) -> Result<(), ValidationError> {
        require("sectionId", &self.section_id)?;
        require("title", &self.title)?;
        check_order(self.order)
    }
}

impl Validate for DocumentPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        self.sections.iter().try_for_each(Validate::validate)
    }
}

impl Validate for SectionPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        check_order(self.order)
    }
}

impl Validate for SubsectionPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        check_order(self.order)
    }
}

impl Validate for SectionImport {
    fn validate(&self) -> Result<(), ValidationError> {
        require("sections[].title", &self.title)?;
        self.subsections
            .iter()
            .try_for_each(|sub| require("sections[].subsections[].title", &sub.title))
    }
}
