mod anilist;
mod config;
mod error;
mod mapper;
mod notion;
mod pipeline;
mod ranking;
mod report;
mod selection;
mod title;

use crate::anilist::AnilistClient;
use crate::config::{get_config, Credentials, ImporterConfig};
use crate::notion::{NotionClient, Publisher};
use crate::pipeline::Importer;
use crate::selection::ConsolePrompt;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg: ImporterConfig = get_config()?;
    init_tracing(&cfg.log_level);

    let credentials = Credentials::from_env()?;
    let search = AnilistClient::new(credentials.anilist_token.clone())?;
    let store = NotionClient::new(&credentials.notion_api_key)?;

    let mut importer = Importer::new(search, Publisher::new(store, &cfg), ConsolePrompt);
    importer.run_file(&cfg.input_file)?;

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
