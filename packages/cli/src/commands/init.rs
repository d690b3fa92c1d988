use crate::config::{Config, DEFAULT_CONFIG_NAME, DEFAULT_SERVER_URL};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Server URL to store in the config
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    pub url: String,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = Config::path(cwd);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        server_url: args.url,
        timeout_secs: args.timeout,
    };
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Start the server: quire-server");
    println!("  2. Run: quire create \"My document\"");

    Ok(())
}
