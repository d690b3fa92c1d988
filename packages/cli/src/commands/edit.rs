//! Scripted edits of an existing document
//!
//! A script is a JSON array of steps addressing nodes by position:
//!
//! ```json
//! [
//!   { "op": "renameDocument", "title": "Release notes" },
//!   { "op": "addSection", "title": "Fixes" },
//!   { "op": "addSubsection", "section": 1, "title": "Crash on save", "content": "<p>…</p>" },
//!   { "op": "moveSection", "from": 1, "to": 0 },
//!   { "op": "removeSubsection", "section": 0, "subsection": 2 }
//! ]
//! ```
//!
//! Removals go to the server right away; everything else is saved at the end.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use quire_common::RemoteStore;
use quire_editor::{EditSession, Mutation, NodeId, NodeKind};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Document id
    pub id: String,

    /// JSON file with the edit steps
    #[arg(short, long)]
    pub script: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditStep {
    RenameDocument {
        title: String,
    },
    AddSection {
        #[serde(default)]
        title: Option<String>,
    },
    RenameSection {
        section: usize,
        title: String,
    },
    RemoveSection {
        section: usize,
    },
    MoveSection {
        from: usize,
        to: usize,
    },
    AddSubsection {
        section: usize,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        content: Option<String>,
    },
    RenameSubsection {
        section: usize,
        subsection: usize,
        title: String,
    },
    SetContent {
        section: usize,
        subsection: usize,
        content: String,
    },
    RemoveSubsection {
        section: usize,
        subsection: usize,
    },
    MoveSubsection {
        section: usize,
        from: usize,
        to: usize,
    },
}

pub async fn edit<S: RemoteStore>(args: EditArgs, store: S) -> Result<()> {
    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("reading {}", args.script.display()))?;
    let steps: Vec<EditStep> = serde_json::from_str(&script)
        .with_context(|| format!("parsing {}", args.script.display()))?;

    let mut session = EditSession::load(store, &args.id).await?;
    session.begin_edit();

    for (i, step) in steps.iter().enumerate() {
        run_step(&mut session, step)
            .await
            .with_context(|| format!("step {}", i + 1))?;
    }

    let stats = session.save().await?;
    println!(
        "  {} Applied {} step(s): {} created, {} updated",
        "✓".green(),
        steps.len(),
        stats.created,
        stats.updated
    );
    if stats.skipped > 0 {
        println!(
            "  {} {} node(s) were not in the loaded copy and were left alone",
            "⚠️".yellow(),
            stats.skipped
        );
    }
    Ok(())
}

fn section_id<S: RemoteStore>(session: &EditSession<S>, index: usize) -> Result<NodeId> {
    session
        .working()
        .sections
        .get(index)
        .map(|s| s.id.clone())
        .ok_or_else(|| anyhow!("no section at position {index}"))
}

fn subsection_id<S: RemoteStore>(
    session: &EditSession<S>,
    section: usize,
    index: usize,
) -> Result<NodeId> {
    session
        .working()
        .sections
        .get(section)
        .and_then(|s| s.subsections.get(index))
        .map(|s| s.id.clone())
        .ok_or_else(|| anyhow!("no subsection at position {section}.{index}"))
}

/// Apply one step to the session
pub async fn run_step<S: RemoteStore>(session: &mut EditSession<S>, step: &EditStep) -> Result<()> {
    tracing::debug!(?step, "edit step");

    match step {
        EditStep::RenameDocument { title } => {
            session.apply(Mutation::RenameDocument {
                title: title.clone(),
            })?;
        }
        EditStep::AddSection { title } => {
            session.apply(Mutation::AddSection)?;
            if let Some(title) = title {
                let index = session.working().sections.len() - 1;
                let section_id = section_id(session, index)?;
                session.apply(Mutation::RenameSection {
                    section_id,
                    title: title.clone(),
                })?;
            }
        }
        EditStep::RenameSection { section, title } => {
            let section_id = section_id(session, *section)?;
            session.apply(Mutation::RenameSection {
                section_id,
                title: title.clone(),
            })?;
        }
        EditStep::RemoveSection { section } => {
            let id = section_id(session, *section)?;
            session.delete_section(&id).await?;
        }
        EditStep::MoveSection { from, to } => {
            let container_id = session.working().id.clone();
            session.apply(Mutation::Reorder {
                kind: NodeKind::Section,
                container_id,
                from_index: *from,
                to_index: *to,
            })?;
        }
        EditStep::AddSubsection {
            section,
            title,
            content,
        } => {
            let section_id = section_id(session, *section)?;
            session.apply(Mutation::AddSubsection {
                section_id: section_id.clone(),
            })?;
            let index = session
                .working()
                .section(&section_id)
                .map(|s| s.subsections.len())
                .unwrap_or_default()
                .saturating_sub(1);
            let subsection_id = subsection_id(session, *section, index)?;
            if let Some(title) = title {
                session.apply(Mutation::RenameSubsection {
                    subsection_id: subsection_id.clone(),
                    title: title.clone(),
                })?;
            }
            if let Some(content) = content {
                session.apply(Mutation::UpdateSubsectionContent {
                    subsection_id,
                    content: content.clone(),
                })?;
            }
        }
        EditStep::RenameSubsection {
            section,
            subsection,
            title,
        } => {
            let subsection_id = subsection_id(session, *section, *subsection)?;
            session.apply(Mutation::RenameSubsection {
                subsection_id,
                title: title.clone(),
            })?;
        }
        EditStep::SetContent {
            section,
            subsection,
            content,
        } => {
            let subsection_id = subsection_id(session, *section, *subsection)?;
            session.apply(Mutation::UpdateSubsectionContent {
                subsection_id,
                content: content.clone(),
            })?;
        }
        EditStep::RemoveSubsection {
            section,
            subsection,
        } => {
            let id = subsection_id(session, *section, *subsection)?;
            session.delete_subsection(&id).await?;
        }
        EditStep::MoveSubsection { section, from, to } => {
            let container_id = section_id(session, *section)?;
            session.apply(Mutation::Reorder {
                kind: NodeKind::Subsection,
                container_id,
                from_index: *from,
                to_index: *to,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_common::{MemoryStore, NewDocument, NewSection, StoreOp};

    async fn session_with(sections: &[&str]) -> EditSession<MemoryStore> {
        let store = MemoryStore::new();
        let doc = store
            .create_document(&NewDocument {
                title: "Log".to_string(),
            })
            .await
            .unwrap();
        for title in sections {
            store
                .create_section(&NewSection {
                    document_id: doc.id.clone(),
                    title: title.to_string(),
                    order: None,
                })
                .await
                .unwrap();
        }
        store.clear_calls();
        let mut session = EditSession::load(store, &doc.id).await.unwrap();
        session.begin_edit();
        session
    }

    fn steps(json: &str) -> Vec<EditStep> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_script() {
        let parsed = steps(
            r#"[
                { "op": "addSection" },
                { "op": "setContent", "section": 0, "subsection": 1, "content": "x" }
            ]"#,
        );
        assert_eq!(
            parsed,
            vec![
                EditStep::AddSection { title: None },
                EditStep::SetContent {
                    section: 0,
                    subsection: 1,
                    content: "x".to_string()
                }
            ]
        );
    }

    #[tokio::test]
    async fn test_add_with_title_and_content() {
        let mut session = session_with(&["Monday"]).await;

        for step in steps(
            r#"[
                { "op": "addSection", "title": "Tuesday" },
                { "op": "addSubsection", "section": 1, "title": "Standup", "content": "<p>ok</p>" }
            ]"#,
        ) {
            run_step(&mut session, &step).await.unwrap();
        }
        session.save().await.unwrap();

        let tuesday = &session.working().sections[1];
        assert_eq!(tuesday.title, "Tuesday");
        assert_eq!(tuesday.subsections[0].title, "Standup");
        assert_eq!(tuesday.subsections[0].content, "<p>ok</p>");
    }

    #[tokio::test]
    async fn test_remove_goes_to_server_immediately() {
        let mut session = session_with(&["A", "B"]).await;

        run_step(&mut session, &EditStep::RemoveSection { section: 0 })
            .await
            .unwrap();

        let ops: Vec<StoreOp> = session.store().calls().iter().map(|c| c.op()).collect();
        assert_eq!(ops, vec![StoreOp::DeleteSection]);
        assert_eq!(session.working().sections[0].title, "B");
        assert_eq!(session.working().sections[0].order, 0);
    }

    #[tokio::test]
    async fn test_move_section() {
        let mut session = session_with(&["A", "B", "C"]).await;

        run_step(&mut session, &EditStep::MoveSection { from: 0, to: 2 })
            .await
            .unwrap();

        let titles: Vec<&str> = session
            .working()
            .sections
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_bad_position_is_an_error() {
        let mut session = session_with(&["A"]).await;

        let result = run_step(
            &mut session,
            &EditStep::RenameSection {
                section: 4,
                title: "X".to_string(),
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(session.working().sections[0].title, "A");
    }
}
