use crate::error::ImportError;
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::fmt::{Display, Formatter};
use tracing::debug;

const ANILIST_URL: &str = "https://graphql.anilist.co/";

const SEARCH_QUERY: &str = "\
query ($search: String) {
  Page (page: 1, perPage: 10) {
    media (search: $search, type: ANIME) {
      title {
        english
        romaji
      }
      countryOfOrigin
      status
      format
      genres
      coverImage {
        extraLarge
      }
      bannerImage
      startDate {
        year
      }
      airingSchedule {
        nodes {
          episode
          timeUntilAiring
        }
      }
      studios {
        edges {
          node {
            name
            isAnimationStudio
          }
        }
      }
    }
  }
}";

#[derive(Deserialize)]
struct SearchResponse {
    data: Option<SearchData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct SearchData {
    #[serde(rename = "Page")]
    page: SearchPage,
}

#[derive(Deserialize)]
struct SearchPage {
    media: Vec<AnilistMedia>,
}

/// A single search candidate. Every field AniList may leave out is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnilistMedia {
    #[serde(default)]
    pub title: AnilistTitle,
    #[serde(rename = "countryOfOrigin")]
    pub country_of_origin: Option<String>,
    pub status: Option<AnilistStatus>,
    pub format: Option<String>,
    pub genres: Option<Vec<String>>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<AnilistCover>,
    #[serde(rename = "bannerImage")]
    pub banner_image: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<FuzzyDate>,
    #[serde(rename = "airingSchedule")]
    pub airing_schedule: Option<AiringSchedule>,
    pub studios: Option<AnilistStudios>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnilistTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnilistCover {
    #[serde(rename = "extraLarge")]
    pub extra_large: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiringSchedule {
    pub nodes: Vec<AiringNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiringNode {
    pub episode: i32,
    #[serde(rename = "timeUntilAiring")]
    pub time_until_airing: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnilistStudios {
    pub edges: Vec<AnilistStudioEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnilistStudioEdge {
    pub node: AnilistStudio,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnilistStudio {
    pub name: String,
    #[serde(rename = "isAnimationStudio")]
    pub is_animation_studio: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AnilistStatus {
    #[serde(rename = "FINISHED")]
    Finished,
    #[serde(rename = "RELEASING")]
    Releasing,
    #[serde(rename = "NOT_YET_RELEASED")]
    NotYetReleased,
    #[serde(rename = "CANCELLED")]
    Cancelled,
    #[serde(rename = "HIATUS")]
    Hiatus,
    #[serde(other)]
    Unknown,
}

impl Display for AnilistStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let code = match self {
            AnilistStatus::Finished => "FINISHED",
            AnilistStatus::Releasing => "RELEASING",
            AnilistStatus::NotYetReleased => "NOT_YET_RELEASED",
            AnilistStatus::Cancelled => "CANCELLED",
            AnilistStatus::Hiatus => "HIATUS",
            AnilistStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{}", code)
    }
}

impl AnilistMedia {
    pub fn start_year(&self) -> Option<i32> {
        self.start_date.as_ref().and_then(|d| d.year)
    }

    pub fn genres(&self) -> &[String] {
        self.genres.as_deref().unwrap_or_default()
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_image
            .as_ref()
            .and_then(|c| c.extra_large.as_deref())
    }

    pub fn studios(&self) -> impl Iterator<Item = &AnilistStudio> {
        self.studios
            .iter()
            .flat_map(|s| s.edges.iter().map(|e| &e.node))
    }

    pub fn airing_nodes(&self) -> &[AiringNode] {
        self.airing_schedule
            .as_ref()
            .map(|s| s.nodes.as_slice())
            .unwrap_or_default()
    }
}

impl Display for AnilistMedia {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let unknown = || "Unknown".to_string();
        write!(
            f,
            "{} / {} - Format: {}, Status: {}, Year: {}",
            self.title.romaji.clone().unwrap_or_else(unknown),
            self.title.english.clone().unwrap_or_else(unknown),
            self.format.clone().unwrap_or_else(unknown),
            self.status.map(|s| s.to_string()).unwrap_or_else(unknown),
            self.start_year().map(|y| y.to_string()).unwrap_or_else(unknown),
        )
    }
}

/// Anything that can turn a title into a list of candidates.
pub trait MediaSearch {
    fn search(&self, query: &str) -> Result<Vec<AnilistMedia>, ImportError>;
}

pub struct AnilistClient {
    client: Client,
    url: String,
    access_token: Option<String>,
}

impl AnilistClient {
    pub fn new(access_token: Option<String>) -> anyhow::Result<Self> {
        Self::with_url(ANILIST_URL, access_token)
    }

    pub fn with_url(url: &str, access_token: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("anilist-notion-importer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build AniList HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
            access_token,
        })
    }
}

impl MediaSearch for AnilistClient {
    fn search(&self, query: &str) -> Result<Vec<AnilistMedia>, ImportError> {
        let json = json!(
            {"query": SEARCH_QUERY, "variables": {"search": query}}
        );

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(json.to_string());
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        debug!(query, "searching AniList");
        let response = request.send()?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ImportError::SearchFailed {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let body = response.text()?;
        parse_search_response(query, &body)
    }
}

fn parse_search_response(query: &str, body: &str) -> Result<Vec<AnilistMedia>, ImportError> {
    let resp: SearchResponse =
        serde_json::from_str(body).map_err(|e| ImportError::SearchFailed {
            status: StatusCode::OK.as_u16(),
            body: format!("unreadable response: {}", e),
        })?;

    let media = match (resp.data, resp.errors) {
        (Some(data), _) => data.page.media,
        (None, Some(errors)) => {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ImportError::SearchFailed {
                status: StatusCode::OK.as_u16(),
                body: messages.join("; "),
            });
        }
        (None, None) => Vec::new(),
    };

    if media.is_empty() {
        return Err(ImportError::NoResults(query.to_string()));
    }

    debug!(query, count = media.len(), "received candidates");
    Ok(media)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const SAMPLE: &str = r#"{
      "data": {
        "Page": {
          "media": [
            {
              "title": { "english": "Attack on Titan", "romaji": "Shingeki no Kyojin" },
              "countryOfOrigin": "JP",
              "status": "FINISHED",
              "format": "TV",
              "genres": ["Action", "Drama"],
              "coverImage": { "extraLarge": "https://img.anili.st/cover.png" },
              "bannerImage": null,
              "startDate": { "year": 2013 },
              "airingSchedule": { "nodes": [] },
              "studios": {
                "edges": [
                  { "node": { "name": "Wit Studio", "isAnimationStudio": true } },
                  { "node": { "name": "Pony Canyon", "isAnimationStudio": false } }
                ]
              }
            },
            {
              "title": { "english": null, "romaji": "Shingeki no Kyojin: Lost Girls" },
              "countryOfOrigin": null,
              "status": null,
              "format": null,
              "genres": null,
              "coverImage": null,
              "bannerImage": null,
              "startDate": { "year": null },
              "airingSchedule": null,
              "studios": null
            }
          ]
        }
      }
    }"#;

    #[test]
    fn test_parse_candidates() {
        let media = parse_search_response("Attack on Titan", SAMPLE).unwrap();
        assert_eq!(media.len(), 2);

        let first = &media[0];
        assert_eq!(first.title.english.as_deref(), Some("Attack on Titan"));
        assert_eq!(first.status, Some(AnilistStatus::Finished));
        assert_eq!(first.start_year(), Some(2013));
        assert_eq!(first.cover_url(), Some("https://img.anili.st/cover.png"));
        assert_eq!(first.studios().count(), 2);

        let second = &media[1];
        assert!(second.genres().is_empty());
        assert!(second.airing_nodes().is_empty());
        assert_eq!(second.start_year(), None);
        assert_eq!(second.cover_url(), None);
    }

    #[test]
    fn test_empty_page_is_no_results() {
        let body = r#"{"data": {"Page": {"media": []}}}"#;
        match parse_search_response("Nothing", body) {
            Err(ImportError::NoResults(q)) => assert_eq!(q, "Nothing"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_graphql_errors_are_search_failures() {
        let body = r#"{"data": null, "errors": [{"message": "Too Many Requests."}]}"#;
        match parse_search_response("Frieren", body) {
            Err(ImportError::SearchFailed { body, .. }) => {
                assert_eq!(body, "Too Many Requests.")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unrecognised_status_keeps_candidate() {
        let body = r#"{"data": {"Page": {"media": [
            {"title": {"romaji": "Frieren"}, "status": "SOME_NEW_STATUS"}
        ]}}}"#;
        let media = parse_search_response("Frieren", body).unwrap();
        assert_eq!(media[0].status, Some(AnilistStatus::Unknown));
    }

    #[test]
    fn test_search_sends_query_and_token() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", "Bearer anilist-token")
            .match_body(Matcher::PartialJson(json!({
                "variables": { "search": "Attack on Titan" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SAMPLE)
            .create();

        let client =
            AnilistClient::with_url(&server.url(), Some("anilist-token".into())).unwrap();
        let media = client.search("Attack on Titan").unwrap();

        mock.assert();
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].title.romaji.as_deref(), Some("Shingeki no Kyojin"));
    }

    #[test]
    fn test_search_without_token_omits_authorization() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"data": {"Page": {"media": []}}}"#)
            .create();

        let client = AnilistClient::with_url(&server.url(), None).unwrap();
        let result = client.search("Nothing");

        mock.assert();
        assert!(matches!(result, Err(ImportError::NoResults(_))));
    }

    #[test]
    fn test_search_non_200_keeps_raw_body() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/")
            .with_status(500)
            .with_body("Internal Server Error")
            .create();

        let client = AnilistClient::with_url(&server.url(), None).unwrap();
        let result = client.search("Frieren");

        mock.assert();
        match result {
            Err(ImportError::SearchFailed { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "Internal Server Error");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_display_falls_back_to_unknown() {
        let media = AnilistMedia {
            title: AnilistTitle {
                romaji: Some("Sousou no Frieren".into()),
                english: None,
            },
            format: Some("TV".into()),
            ..Default::default()
        };
        assert_eq!(
            media.to_string(),
            "Sousou no Frieren / Unknown - Format: TV, Status: Unknown, Year: Unknown"
        );
    }
}
