use anyhow::{bail, Result};
use inquire::{required, Text};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "anilist-notion-importer";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Text file with one title per line.
    pub input_file: PathBuf,
    /// Database the anime pages are created in.
    pub database_id: String,
    /// Database holding one page per genre.
    pub genre_database_id: String,
    pub genre_name_property: String,
    /// Also write "Next episode" and "Airing at" for airing shows.
    pub publish_next_airing: bool,
    pub log_level: String,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            input_file: "anime_list.txt".into(),
            database_id: "".into(),
            genre_database_id: "".into(),
            genre_name_property: "Name".into(),
            publish_next_airing: false,
            log_level: "warn".into(),
        }
    }
}

impl ImporterConfig {
    fn is_complete(&self) -> bool {
        !self.database_id.is_empty() && !self.genre_database_id.is_empty()
    }
}

pub fn get_config() -> Result<ImporterConfig> {
    let cfg: ImporterConfig = confy::load(APP_NAME, CONFIG_NAME)?;
    if !cfg.is_complete() {
        let new_cfg = complete_config(cfg)?;
        confy::store(APP_NAME, CONFIG_NAME, &new_cfg)?;
        return Ok(new_cfg);
    }

    Ok(cfg)
}

fn complete_config(mut cfg: ImporterConfig) -> Result<ImporterConfig> {
    if cfg.database_id.is_empty() {
        cfg.database_id = Text::new("Enter the Notion anime database id:")
            .with_validator(required!())
            .prompt()?;
    }
    if cfg.genre_database_id.is_empty() {
        cfg.genre_database_id = Text::new("Enter the Notion genre database id:")
            .with_validator(required!())
            .prompt()?;
    }

    Ok(cfg)
}

/// Secrets read from the environment once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub anilist_token: Option<String>,
    pub notion_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let Some(notion_api_key) = present("NOTION_API_KEY") else {
            bail!("NOTION_API_KEY is not set");
        };

        Ok(Self {
            anilist_token: present("ACCESS_TOKEN"),
            notion_api_key,
        })
    }
}
