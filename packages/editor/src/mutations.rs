//! # Tree Mutations
//!
//! Pure edit operations on a [`Document`].
//!
//! ## Semantics
//!
//! - Every operation takes the current tree and returns a new one. The input
//!   is never modified.
//! - Operations are total: an unknown id or an out-of-range index yields the
//!   tree unchanged. [`Mutation::validate`] reports those cases for callers
//!   that want to surface them.
//! - Add, remove and reorder renumber every sibling's `order` to its index,
//!   so orders stay unique and contiguous from 0.
//! - Content updates replace the markup string wholesale.
//! - Reorder only moves a node within its own parent.

use crate::document::{Document, NodeId, Section, Subsection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which sibling sequence a reorder targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Sections of a document; the container is the document id
    Section,
    /// Subsections of a section; the container is the section id
    Subsection,
}

/// Edit operations, replayable from scripts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    RenameDocument {
        title: String,
    },

    AddSection,

    #[serde(rename_all = "camelCase")]
    RenameSection {
        section_id: NodeId,
        title: String,
    },

    #[serde(rename_all = "camelCase")]
    RemoveSection {
        section_id: NodeId,
    },

    #[serde(rename_all = "camelCase")]
    AddSubsection {
        section_id: NodeId,
    },

    #[serde(rename_all = "camelCase")]
    RenameSubsection {
        subsection_id: NodeId,
        title: String,
    },

    /// Atomic replacement of the serialized markup
    #[serde(rename_all = "camelCase")]
    UpdateSubsectionContent {
        subsection_id: NodeId,
        content: String,
    },

    #[serde(rename_all = "camelCase")]
    RemoveSubsection {
        subsection_id: NodeId,
    },

    #[serde(rename_all = "camelCase")]
    Reorder {
        kind: NodeKind,
        container_id: NodeId,
        from_index: usize,
        to_index: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Section not found: {0}")]
    SectionNotFound(NodeId),

    #[error("Subsection not found: {0}")]
    SubsectionNotFound(NodeId),

    #[error("Container not found: {0}")]
    ContainerNotFound(NodeId),

    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

impl Mutation {
    /// Apply to `tree`, returning the edited copy
    pub fn apply(&self, tree: &Document) -> Document {
        match self {
            Mutation::RenameDocument { title } => rename_document(tree, title),
            Mutation::AddSection => add_section(tree),
            Mutation::RenameSection { section_id, title } => {
                rename_section(tree, section_id, title)
            }
            Mutation::RemoveSection { section_id } => remove_section(tree, section_id),
            Mutation::AddSubsection { section_id } => add_subsection(tree, section_id),
            Mutation::RenameSubsection {
                subsection_id,
                title,
            } => rename_subsection(tree, subsection_id, title),
            Mutation::UpdateSubsectionContent {
                subsection_id,
                content,
            } => update_subsection_content(tree, subsection_id, content),
            Mutation::RemoveSubsection { subsection_id } => {
                remove_subsection(tree, subsection_id)
            }
            Mutation::Reorder {
                kind,
                container_id,
                from_index,
                to_index,
            } => reorder(tree, *kind, container_id, *from_index, *to_index),
        }
    }

    /// Check preconditions without applying
    pub fn validate(&self, tree: &Document) -> Result<(), MutationError> {
        match self {
            Mutation::RenameDocument { .. } | Mutation::AddSection => Ok(()),

            Mutation::RenameSection { section_id, .. }
            | Mutation::RemoveSection { section_id }
            | Mutation::AddSubsection { section_id } => tree
                .section(section_id)
                .map(|_| ())
                .ok_or_else(|| MutationError::SectionNotFound(section_id.clone())),

            Mutation::RenameSubsection { subsection_id, .. }
            | Mutation::UpdateSubsectionContent { subsection_id, .. }
            | Mutation::RemoveSubsection { subsection_id } => tree
                .subsection(subsection_id)
                .map(|_| ())
                .ok_or_else(|| MutationError::SubsectionNotFound(subsection_id.clone())),

            Mutation::Reorder {
                kind,
                container_id,
                from_index,
                to_index,
            } => {
                let len = match kind {
                    NodeKind::Section if &tree.id == container_id => tree.sections.len(),
                    NodeKind::Subsection => tree
                        .section(container_id)
                        .map(|s| s.subsections.len())
                        .ok_or_else(|| MutationError::ContainerNotFound(container_id.clone()))?,
                    NodeKind::Section => {
                        return Err(MutationError::ContainerNotFound(container_id.clone()))
                    }
                };

                for index in [*from_index, *to_index] {
                    if index >= len {
                        return Err(MutationError::IndexOutOfRange { index, len });
                    }
                }
                Ok(())
            }
        }
    }

    /// Debug name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::RenameDocument { .. } => "rename_document",
            Mutation::AddSection => "add_section",
            Mutation::RenameSection { .. } => "rename_section",
            Mutation::RemoveSection { .. } => "remove_section",
            Mutation::AddSubsection { .. } => "add_subsection",
            Mutation::RenameSubsection { .. } => "rename_subsection",
            Mutation::UpdateSubsectionContent { .. } => "update_subsection_content",
            Mutation::RemoveSubsection { .. } => "remove_subsection",
            Mutation::Reorder { .. } => "reorder",
        }
    }
}

pub fn rename_document(tree: &Document, title: &str) -> Document {
    Document {
        title: title.to_string(),
        ..tree.clone()
    }
}

/// Append a placeholder section
pub fn add_section(tree: &Document) -> Document {
    let mut next = tree.clone();
    next.sections
        .push(Section::placeholder(next.sections.len() as i64));
    renumber_sections(&mut next.sections);
    next
}

pub fn rename_section(tree: &Document, section_id: &NodeId, title: &str) -> Document {
    edit_section(tree, section_id, |section| section.title = title.to_string())
}

/// Local removal only; the remote delete is the session's job
pub fn remove_section(tree: &Document, section_id: &NodeId) -> Document {
    let mut next = tree.clone();
    next.sections.retain(|s| &s.id != section_id);
    renumber_sections(&mut next.sections);
    next
}

/// Append a placeholder subsection under `section_id`
pub fn add_subsection(tree: &Document, section_id: &NodeId) -> Document {
    edit_section(tree, section_id, |section| {
        section
            .subsections
            .push(Subsection::placeholder(section.subsections.len() as i64));
        renumber_subsections(&mut section.subsections);
    })
}

pub fn rename_subsection(tree: &Document, subsection_id: &NodeId, title: &str) -> Document {
    edit_subsection(tree, subsection_id, |sub| sub.title = title.to_string())
}

pub fn update_subsection_content(
    tree: &Document,
    subsection_id: &NodeId,
    content: &str,
) -> Document {
    edit_subsection(tree, subsection_id, |sub| sub.content = content.to_string())
}

pub fn remove_subsection(tree: &Document, subsection_id: &NodeId) -> Document {
    let mut next = tree.clone();
    for section in &mut next.sections {
        let before = section.subsections.len();
        section.subsections.retain(|s| &s.id != subsection_id);
        if section.subsections.len() != before {
            renumber_subsections(&mut section.subsections);
            break;
        }
    }
    next
}

/// Move the item at `from_index` to `to_index` within one container
pub fn reorder(
    tree: &Document,
    kind: NodeKind,
    container_id: &NodeId,
    from_index: usize,
    to_index: usize,
) -> Document {
    let mut next = tree.clone();
    match kind {
        NodeKind::Section => {
            if &next.id == container_id && move_item(&mut next.sections, from_index, to_index) {
                renumber_sections(&mut next.sections);
            }
        }
        NodeKind::Subsection => {
            if let Some(section) = next.sections.iter_mut().find(|s| &s.id == container_id) {
                if move_item(&mut section.subsections, from_index, to_index) {
                    renumber_subsections(&mut section.subsections);
                }
            }
        }
    }
    next
}

fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

fn renumber_sections(sections: &mut [Section]) {
    for (i, section) in sections.iter_mut().enumerate() {
        section.order = i as i64;
    }
}

fn renumber_subsections(subsections: &mut [Subsection]) {
    for (i, sub) in subsections.iter_mut().enumerate() {
        sub.order = i as i64;
    }
}

fn edit_section(tree: &Document, id: &NodeId, f: impl FnOnce(&mut Section)) -> Document {
    let mut next = tree.clone();
    if let Some(section) = next.sections.iter_mut().find(|s| &s.id == id) {
        f(section);
    }
    next
}

fn edit_subsection(tree: &Document, id: &NodeId, f: impl FnOnce(&mut Subsection)) -> Document {
    let mut next = tree.clone();
    if let Some(sub) = next
        .sections
        .iter_mut()
        .flat_map(|s| s.subsections.iter_mut())
        .find(|s| &s.id == id)
    {
        f(sub);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted(sections: &[&str]) -> Document {
        Document {
            id: NodeId::remote("d1"),
            title: "T".to_string(),
            sections: sections
                .iter()
                .enumerate()
                .map(|(i, id)| Section {
                    id: NodeId::remote(*id),
                    title: id.to_uppercase(),
                    order: i as i64,
                    subsections: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_add_section_to_fresh_document() {
        let doc = persisted(&[]);
        let next = add_section(&doc);

        assert_eq!(next.sections.len(), 1);
        let section = &next.sections[0];
        assert_eq!(section.order, 0);
        assert!(section.is_new());
        assert_eq!(section.title, "New Section");
        assert!(doc.sections.is_empty(), "input must not change");
    }

    #[test]
    fn test_reorder_sections_swaps_and_renumbers() {
        let doc = persisted(&["s1", "s2"]);
        let next = reorder(&doc, NodeKind::Section, &NodeId::remote("d1"), 0, 1);

        let ids: Vec<_> = next.sections.iter().map(|s| (s.id.to_string(), s.order)).collect();
        assert_eq!(
            ids,
            vec![("s2".to_string(), 0), ("s1".to_string(), 1)]
        );
    }

    #[test]
    fn test_reorder_is_a_permutation() {
        let doc = persisted(&["a", "b", "c", "d", "e"]);

        for from in 0..5 {
            for to in 0..5 {
                let next = reorder(&doc, NodeKind::Section, &doc.id, from, to);
                let mut before: Vec<_> = doc.sections.iter().map(|s| s.id.to_string()).collect();
                let mut after: Vec<_> = next.sections.iter().map(|s| s.id.to_string()).collect();
                before.sort();
                after.sort();
                assert_eq!(before, after);

                let orders: Vec<i64> = next.sections.iter().map(|s| s.order).collect();
                assert_eq!(orders, vec![0, 1, 2, 3, 4]);
                assert_eq!(next.sections[to].id, doc.sections[from].id);
            }
        }
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let doc = persisted(&["s1", "s2"]);

        assert_eq!(reorder(&doc, NodeKind::Section, &doc.id, 0, 2), doc);
        assert_eq!(reorder(&doc, NodeKind::Section, &doc.id, 5, 0), doc);
        assert_eq!(
            reorder(&doc, NodeKind::Section, &NodeId::remote("other"), 0, 1),
            doc
        );

        let mutation = Mutation::Reorder {
            kind: NodeKind::Section,
            container_id: doc.id.clone(),
            from_index: 0,
            to_index: 2,
        };
        assert_eq!(
            mutation.validate(&doc),
            Err(MutationError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_reorder_subsections_within_section() {
        let mut doc = persisted(&["s1"]);
        let s1 = NodeId::remote("s1");
        for _ in 0..3 {
            doc = add_subsection(&doc, &s1);
        }
        let ids: Vec<NodeId> = doc.sections[0].subsections.iter().map(|s| s.id.clone()).collect();

        let next = reorder(&doc, NodeKind::Subsection, &s1, 2, 0);
        let moved: Vec<NodeId> = next.sections[0].subsections.iter().map(|s| s.id.clone()).collect();

        assert_eq!(moved, vec![ids[2].clone(), ids[0].clone(), ids[1].clone()]);
        let orders: Vec<i64> = next.sections[0].subsections.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_add_remove_sequence_keeps_orders_contiguous() {
        // xorshift so the sequence is reproducible
        let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next_rand = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        let mut doc = persisted(&["s1", "s2", "s3"]);
        let mut adds = 0usize;
        let mut removes = 0usize;

        for _ in 0..200 {
            if next_rand() % 3 == 0 && !doc.sections.is_empty() {
                let idx = (next_rand() as usize) % doc.sections.len();
                let id = doc.sections[idx].id.clone();
                doc = remove_section(&doc, &id);
                removes += 1;
            } else {
                doc = add_section(&doc);
                adds += 1;
            }

            let orders: Vec<i64> = doc.sections.iter().map(|s| s.order).collect();
            let expected: Vec<i64> = (0..doc.sections.len() as i64).collect();
            assert_eq!(orders, expected);
        }

        assert_eq!(doc.sections.len(), 3 + adds - removes);
    }

    #[test]
    fn test_content_update_is_idempotent() {
        let doc = add_subsection(&persisted(&["s1"]), &NodeId::remote("s1"));
        let id = doc.sections[0].subsections[0].id.clone();

        let once = update_subsection_content(&doc, &id, "<p>hello</p>");
        let twice = update_subsection_content(&once, &id, "<p>hello</p>");

        assert_eq!(once, twice);
        assert_eq!(once.subsection(&id).unwrap().content, "<p>hello</p>");
    }

    #[test]
    fn test_unknown_ids_leave_tree_unchanged() {
        let doc = persisted(&["s1"]);
        let ghost = NodeId::remote("ghost");

        assert_eq!(rename_section(&doc, &ghost, "x"), doc);
        assert_eq!(remove_section(&doc, &ghost), doc);
        assert_eq!(add_subsection(&doc, &ghost), doc);
        assert_eq!(rename_subsection(&doc, &ghost, "x"), doc);
        assert_eq!(remove_subsection(&doc, &ghost), doc);

        assert_eq!(
            Mutation::RemoveSection { section_id: ghost.clone() }.validate(&doc),
            Err(MutationError::SectionNotFound(ghost))
        );
    }

    #[test]
    fn test_remove_subsection_renumbers_siblings() {
        let s1 = NodeId::remote("s1");
        let mut doc = persisted(&["s1"]);
        for _ in 0..3 {
            doc = add_subsection(&doc, &s1);
        }
        let middle = doc.sections[0].subsections[1].id.clone();

        let next = remove_subsection(&doc, &middle);
        let orders: Vec<i64> = next.sections[0].subsections.iter().map(|s| s.order).collect();

        assert_eq!(orders, vec![0, 1]);
        assert!(next.subsection(&middle).is_none());
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::RenameSection {
            section_id: NodeId::remote("s1"),
            title: "Intro".to_string(),
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
        assert!(json.contains("\"type\":\"renameSection\""));
    }
}
