use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use quire_common::{
    DocumentPatch, NewDocument, RemoteStore, SectionImport, SubsectionImport,
};
use quire_editor::{EditSession, Mutation};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file with the document tree
    pub file: PathBuf,

    /// Send the whole tree in one request instead of one call per node
    #[arg(long)]
    pub bulk: bool,
}

/// Import file format
#[derive(Debug, Clone, Deserialize)]
pub struct ImportFile {
    pub title: String,
    #[serde(default)]
    pub sections: Vec<ImportSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportSection {
    pub title: String,
    #[serde(default)]
    pub subsections: Vec<ImportSubsection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportSubsection {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl ImportFile {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

pub async fn import<S: RemoteStore>(args: ImportArgs, store: S) -> Result<()> {
    let file = ImportFile::read(&args.file)?;

    println!("{}", format!("Importing {}...", file.title).bright_blue().bold());

    let id = if args.bulk {
        import_bulk(&store, &file).await?
    } else {
        import_tree(store, &file).await?
    };

    println!("  {} Imported {} ({})", "✓".green(), file.title, id.cyan());
    Ok(())
}

/// Build the tree in an edit session and save it, one call per node
pub async fn import_tree<S: RemoteStore>(store: S, file: &ImportFile) -> Result<String> {
    let mut session = EditSession::new_document(store, file.title.clone());

    for section in &file.sections {
        session.apply(Mutation::AddSection)?;
        let section_id = session
            .working()
            .sections
            .last()
            .map(|s| s.id.clone())
            .ok_or_else(|| anyhow!("section was not added"))?;
        session.apply(Mutation::RenameSection {
            section_id: section_id.clone(),
            title: section.title.clone(),
        })?;

        for sub in &section.subsections {
            session.apply(Mutation::AddSubsection {
                section_id: section_id.clone(),
            })?;
            let subsection_id = session
                .working()
                .section(&section_id)
                .and_then(|s| s.subsections.last())
                .map(|s| s.id.clone())
                .ok_or_else(|| anyhow!("subsection was not added"))?;
            session.apply(Mutation::RenameSubsection {
                subsection_id: subsection_id.clone(),
                title: sub.title.clone(),
            })?;
            session.apply(Mutation::UpdateSubsectionContent {
                subsection_id,
                content: sub.content.clone(),
            })?;
        }
    }

    let stats = session.save().await?;
    tracing::info!(created = stats.created, "import saved");

    session
        .working()
        .id
        .as_remote()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("document was not created"))
}

/// Create the document, then append every section in one transactional patch
pub async fn import_bulk<S: RemoteStore>(store: &S, file: &ImportFile) -> Result<String> {
    let doc = store
        .create_document(&NewDocument {
            title: file.title.clone(),
        })
        .await?;

    let patch = DocumentPatch {
        title: None,
        sections: file
            .sections
            .iter()
            .map(|section| SectionImport {
                title: section.title.clone(),
                subsections: section
                    .subsections
                    .iter()
                    .map(|sub| SubsectionImport {
                        title: sub.title.clone(),
                        content: sub.content.clone(),
                    })
                    .collect(),
            })
            .collect(),
    };
    store.update_document(&doc.id, &patch).await?;
    Ok(doc.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_common::{MemoryStore, StoreOp};

    fn sample() -> ImportFile {
        serde_json::from_str(
            r#"{
                "title": "Handbook",
                "sections": [
                    { "title": "Start", "subsections": [
                        { "title": "Welcome", "content": "<p>hi</p>" },
                        { "title": "Rules" }
                    ]},
                    { "title": "End" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_import_tree_creates_every_node() {
        let store = MemoryStore::new();
        let id = import_tree(store.clone(), &sample()).await.unwrap();

        let doc = store.document(&id).unwrap();
        assert_eq!(doc.title, "Handbook");
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].subsections[0].content, "<p>hi</p>");
        assert_eq!(doc.sections[0].subsections[1].title, "Rules");
        assert_eq!(store.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_import_bulk_uses_one_patch() {
        let store = MemoryStore::new();
        let id = import_bulk(&store, &sample()).await.unwrap();

        let ops: Vec<StoreOp> = store.calls().iter().map(|c| c.op()).collect();
        assert_eq!(ops, vec![StoreOp::CreateDocument, StoreOp::UpdateDocument]);
        let doc = store.document(&id).unwrap();
        assert_eq!(doc.sections[1].title, "End");
    }
}
