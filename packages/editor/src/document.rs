//! # Document Tree
//!
//! In-memory model of one document: document → ordered sections → ordered
//! subsections.
//!
//! Every node carries a [`NodeId`]. A node created in the editor starts with
//! a `Local` placeholder and is promoted to a `Remote` id once the store has
//! created it, so "is this node new?" is a property of the id itself and
//! cannot drift out of sync with it.

use quire_common::{DocumentRecord, SectionRecord, SubsectionRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const NEW_SECTION_TITLE: &str = "New Section";
pub const NEW_SUBSECTION_TITLE: &str = "New Subsection";

/// Node identity: placeholder until the store assigns one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeId {
    /// Client-generated, not yet persisted
    Local(Uuid),
    /// Assigned by the remote store
    Remote(String),
}

impl NodeId {
    /// Fresh placeholder
    pub fn placeholder() -> Self {
        NodeId::Local(Uuid::new_v4())
    }

    pub fn remote(id: impl Into<String>) -> Self {
        NodeId::Remote(id.into())
    }

    /// True iff the node has no server-assigned identifier yet
    pub fn is_new(&self) -> bool {
        matches!(self, NodeId::Local(_))
    }

    /// Server id, if persisted
    pub fn as_remote(&self) -> Option<&str> {
        match self {
            NodeId::Remote(id) => Some(id),
            NodeId::Local(_) => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Local(uuid) => write!(f, "local:{uuid}"),
            NodeId::Remote(id) => f.write_str(id),
        }
    }
}

/// Leaf node holding rich-text content as serialized markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: NodeId,
    pub title: String,
    pub content: String,
    pub order: i64,
}

impl Subsection {
    pub fn placeholder(order: i64) -> Self {
        Self {
            id: NodeId::placeholder(),
            title: NEW_SUBSECTION_TITLE.to_string(),
            content: String::new(),
            order,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_new()
    }
}

impl From<SubsectionRecord> for Subsection {
    fn from(record: SubsectionRecord) -> Self {
        Self {
            id: NodeId::Remote(record.id),
            title: record.title,
            content: record.content,
            order: record.order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: NodeId,
    pub title: String,
    pub order: i64,
    pub subsections: Vec<Subsection>,
}

impl Section {
    pub fn placeholder(order: i64) -> Self {
        Self {
            id: NodeId::placeholder(),
            title: NEW_SECTION_TITLE.to_string(),
            order,
            subsections: Vec::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_new()
    }

    pub fn subsection(&self, id: &NodeId) -> Option<&Subsection> {
        self.subsections.iter().find(|s| &s.id == id)
    }
}

impl From<SectionRecord> for Section {
    fn from(record: SectionRecord) -> Self {
        Self {
            id: NodeId::Remote(record.id),
            title: record.title,
            order: record.order,
            subsections: record.subsections.into_iter().map(Into::into).collect(),
        }
    }
}

/// Root of the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: NodeId,
    pub title: String,
    pub sections: Vec<Section>,
}

impl Document {
    /// Unsaved document with no sections
    pub fn new_local(title: impl Into<String>) -> Self {
        Self {
            id: NodeId::placeholder(),
            title: title.into(),
            sections: Vec::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_new()
    }

    pub fn section(&self, id: &NodeId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    /// Subsection anywhere in the tree, with its parent section
    pub fn find_subsection(&self, id: &NodeId) -> Option<(&Section, &Subsection)> {
        self.sections
            .iter()
            .find_map(|section| section.subsection(id).map(|sub| (section, sub)))
    }

    pub fn subsection(&self, id: &NodeId) -> Option<&Subsection> {
        self.find_subsection(id).map(|(_, sub)| sub)
    }

    /// Sections plus subsections
    pub fn node_count(&self) -> usize {
        self.sections
            .iter()
            .map(|s| 1 + s.subsections.len())
            .sum()
    }
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: NodeId::Remote(record.id),
            title: record.title,
            sections: record.sections.into_iter().map(Into::into).collect(),
        }
    }
}
