use crate::config::ImporterConfig;
use crate::error::ImportError;
use crate::mapper::OutputProperties;
use crate::report;
use anyhow::Context;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

const API_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<PageRef>,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    id: String,
}

/// The two operations the importer needs from the page store.
pub trait RecordStore {
    /// Id of the first page in `database_id` whose `property` equals `value`.
    fn find_by_name(
        &self,
        database_id: &str,
        property: &str,
        value: &str,
    ) -> Result<Option<String>, ImportError>;

    /// Creates a page from a full request body and returns its id.
    fn create_page(&self, payload: &Value) -> Result<String, ImportError>;
}

pub struct NotionClient {
    client: Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(api_key: &str) -> anyhow::Result<Self> {
        Self::with_base_url(API_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .context("Notion API key is not a valid header value")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build Notion HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn send_post_request(&self, url_slug: &str, body: &Value) -> reqwest::Result<Response> {
        self.client
            .post(format!("{}/{}", self.base_url, url_slug))
            .json(body)
            .send()
    }
}

impl RecordStore for NotionClient {
    fn find_by_name(
        &self,
        database_id: &str,
        property: &str,
        value: &str,
    ) -> Result<Option<String>, ImportError> {
        let filter = json!({
            "filter": {
                "property": property,
                "rich_text": { "equals": value }
            }
        });

        let url_slug = format!("databases/{}/query", database_id);
        let response = self.send_post_request(&url_slug, &filter)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::LookupFailed {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let results: QueryResponse = response.json()?;
        Ok(results.results.into_iter().next().map(|p| p.id))
    }

    fn create_page(&self, payload: &Value) -> Result<String, ImportError> {
        let response = self.send_post_request("pages", payload)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::PublishFailed {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let page: PageRef = response.json()?;
        Ok(page.id)
    }
}

/// Genre relation ids plus one warning line per genre that could not be linked.
#[derive(Debug, Default)]
struct GenreLinks {
    ids: Vec<String>,
    warnings: Vec<String>,
}

pub struct Publisher<S> {
    store: S,
    database_id: String,
    genre_database_id: String,
    genre_name_property: String,
    publish_next_airing: bool,
}

impl<S: RecordStore> Publisher<S> {
    pub fn new(store: S, cfg: &ImporterConfig) -> Self {
        Self {
            store,
            database_id: cfg.database_id.clone(),
            genre_database_id: cfg.genre_database_id.clone(),
            genre_name_property: cfg.genre_name_property.clone(),
            publish_next_airing: cfg.publish_next_airing,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates the page and returns its id. Genre warnings are printed
    /// before the create call, so they show even when it fails.
    pub fn publish(&self, props: &OutputProperties) -> Result<String, ImportError> {
        let links = self.resolve_genres(&props.genres);
        for warning in &links.warnings {
            report::warning(warning);
        }

        let payload = page_payload(
            &self.database_id,
            props,
            &links.ids,
            self.publish_next_airing,
        );
        let page_id = self.store.create_page(&payload)?;
        info!(title = %props.title, page_id = %page_id, "created page");

        Ok(page_id)
    }

    fn resolve_genres(&self, genres: &str) -> GenreLinks {
        let mut links = GenreLinks::default();

        for name in split_genres(genres) {
            let found = self
                .store
                .find_by_name(&self.genre_database_id, &self.genre_name_property, name);

            match found {
                Ok(Some(id)) => {
                    debug!(genre = name, id = %id, "resolved genre");
                    links.ids.push(id);
                }
                Ok(None) => {
                    warn!(genre = name, "genre not found in the related database");
                    links.warnings.push(format!(
                        "Warning: The genre '{}' was not found in the related database.",
                        name
                    ));
                }
                Err(e) => {
                    warn!(genre = name, error = %e, "genre lookup failed");
                    links.warnings.push(format!(
                        "Warning: Could not look up the genre '{}': {}.",
                        name, e
                    ));
                }
            }
        }

        links
    }
}

fn split_genres(genres: &str) -> impl Iterator<Item = &str> {
    genres.split(", ").filter(|g| !g.is_empty())
}

/// Body of the create-page request for one mapped record.
pub fn page_payload(
    database_id: &str,
    props: &OutputProperties,
    genre_ids: &[String],
    include_next_airing: bool,
) -> Value {
    let cover_files: Vec<Value> = props
        .cover
        .iter()
        .map(|url| {
            json!({
                "type": "external",
                "name": "Cover",
                "external": { "url": url }
            })
        })
        .collect();

    let relations: Vec<Value> = genre_ids.iter().map(|id| json!({ "id": id })).collect();

    let mut properties = json!({
        "Title": { "title": [{ "text": { "content": props.title } }] },
        "Cover": { "files": cover_files },
        "Format": { "select": { "name": props.format } },
        "Debut": { "rich_text": [{ "text": { "content": props.debut } }] },
        "Studios": { "rich_text": [{ "text": { "content": props.studios } }] },
        "Watched seasons": { "number": props.watched_seasons },
        "Genres": { "relation": relations },
    });

    if include_next_airing {
        if let Some(next) = &props.next_airing {
            properties["Next episode"] = json!({ "number": next.episode });
            properties["Airing at"] = json!({ "date": { "start": next.airing_at.to_rfc3339() } });
        }
    }

    let mut payload = json!({
        "parent": { "database_id": database_id },
        "icon": { "type": "emoji", "emoji": props.icon },
        "properties": properties,
    });

    if let Some(banner) = &props.banner {
        payload["cover"] = json!({ "type": "external", "external": { "url": banner } });
    }

    payload
}
