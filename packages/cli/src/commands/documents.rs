use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_common::{DocumentRecord, NewDocument, RemoteStore};

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Title of the new document
    pub title: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Document id
    pub id: String,

    /// Print subsection content
    #[arg(short, long)]
    pub content: bool,

    /// Print the raw JSON record
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Document id
    pub id: String,
}

pub async fn list<S: RemoteStore>(store: &S) -> Result<()> {
    let docs = store.list_documents().await?;

    if docs.is_empty() {
        println!("{}", "No documents yet".yellow());
        return Ok(());
    }

    for doc in &docs {
        println!(
            "{}  {}  {}",
            doc.id.dimmed(),
            doc.title.bright_white().bold(),
            doc.updated_at.dimmed()
        );
    }
    println!();
    println!("{} document(s)", docs.len());
    Ok(())
}

pub async fn create<S: RemoteStore>(args: CreateArgs, store: &S) -> Result<()> {
    let doc = store
        .create_document(&NewDocument { title: args.title })
        .await?;
    println!("  {} Created {} ({})", "✓".green(), doc.title, doc.id.cyan());
    Ok(())
}

pub async fn show<S: RemoteStore>(args: ShowArgs, store: &S) -> Result<()> {
    let doc = store.fetch_document(&args.id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print!("{}", render_outline(&doc, args.content));
    }
    Ok(())
}

pub async fn delete<S: RemoteStore>(args: DeleteArgs, store: &S) -> Result<()> {
    store.delete_document(&args.id).await?;
    println!("  {} Deleted {}", "✓".green(), args.id.cyan());
    Ok(())
}

/// Numbered outline of a document tree
pub fn render_outline(doc: &DocumentRecord, with_content: bool) -> String {
    let mut out = format!("{} {}\n", doc.title.bold(), format!("({})", doc.id).dimmed());

    for (i, section) in doc.sections.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} {}\n",
            i + 1,
            section.title,
            format!("[{}]", section.id).dimmed()
        ));

        for (j, sub) in section.subsections.iter().enumerate() {
            out.push_str(&format!(
                "     {}.{} {} {}\n",
                i + 1,
                j + 1,
                sub.title,
                format!("[{}]", sub.id).dimmed()
            ));
            if with_content && !sub.content.is_empty() {
                out.push_str(&format!("         {}\n", sub.content));
            }
        }
    }
    out
}
