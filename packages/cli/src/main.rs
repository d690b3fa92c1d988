mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    create, delete, edit, import, init, list, show, CreateArgs, DeleteArgs, EditArgs, ImportArgs,
    InitArgs, ShowArgs,
};
use config::Config;
use quire_client::HttpStore;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Quire CLI - hierarchical documents from the terminal
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server URL (overrides quire.config.json)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log store calls and save progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a quire.config.json in the current directory
    Init(InitArgs),

    /// List documents
    List,

    /// Create an empty document
    Create(CreateArgs),

    /// Print a document outline
    Show(ShowArgs),

    /// Delete a document and everything in it
    Delete(DeleteArgs),

    /// Create a document from a JSON tree
    Import(ImportArgs),

    /// Apply a script of edits to a document and save
    Edit(EditArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn connect(cwd: &Path, server: Option<&str>) -> Result<HttpStore> {
    Config::load(cwd)?.store(server)
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let server = cli.server.as_deref();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::List => list(&connect(&cwd, server)?).await,
        Command::Create(args) => create(args, &connect(&cwd, server)?).await,
        Command::Show(args) => show(args, &connect(&cwd, server)?).await,
        Command::Delete(args) => delete(args, &connect(&cwd, server)?).await,
        Command::Import(args) => import(args, connect(&cwd, server)?).await,
        Command::Edit(args) => edit(args, connect(&cwd, server)?).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
