use crate::anilist::{AiringNode, AnilistMedia, AnilistStatus};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::LazyLock;

const ALLOWED_GENRES: [&str; 17] = [
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Ecchi",
    "Fantasy",
    "Horror",
    "Mecha",
    "Mystery",
    "Music",
    "Psychological",
    "Romance",
    "Sci-Fi",
    "Slice of Life",
    "Sports",
    "Supernatural",
    "Thriller",
];

const DEFAULT_ICON: &str = "🌐";

static SEASON_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(S(\d+)\)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextAiring {
    pub episode: i32,
    pub airing_at: DateTime<Utc>,
}

/// The properties of one database page, ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputProperties {
    pub title: String,
    pub cover: Option<String>,
    pub banner: Option<String>,
    pub format: String,
    pub debut: String,
    pub studios: String,
    pub genres: String,
    pub watched_seasons: Option<i64>,
    pub icon: &'static str,
    pub next_airing: Option<NextAiring>,
}

impl OutputProperties {
    /// `Key: value` pairs for the preview printed before publishing.
    pub fn preview(&self) -> Vec<(&'static str, String)> {
        let or_none = |v: Option<String>| v.unwrap_or_else(|| "None".to_string());
        vec![
            ("Title", self.title.clone()),
            ("Cover", or_none(self.cover.clone())),
            ("Banner", or_none(self.banner.clone())),
            ("Format", self.format.clone()),
            ("Debut", self.debut.clone()),
            ("Studios", self.studios.clone()),
            (
                "Next episode",
                or_none(self.next_airing.as_ref().map(|n| n.episode.to_string())),
            ),
            (
                "Airing at",
                or_none(self.next_airing.as_ref().map(|n| n.airing_at.to_rfc3339())),
            ),
            ("Genres", self.genres.clone()),
            (
                "Watched seasons",
                or_none(self.watched_seasons.map(|s| s.to_string())),
            ),
            ("Icon", self.icon.to_string()),
        ]
    }
}

pub fn map_candidate(media: &AnilistMedia, full_title: &str) -> OutputProperties {
    map_candidate_at(media, full_title, Utc::now())
}

pub fn map_candidate_at(
    media: &AnilistMedia,
    full_title: &str,
    now: DateTime<Utc>,
) -> OutputProperties {
    let title = [&media.title.english, &media.title.romaji]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty())
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string());

    let format = media
        .format
        .as_deref()
        .map(format_label)
        .unwrap_or_else(|| "N/A".to_string());

    let studios: Vec<&str> = media
        .studios()
        .filter(|s| s.is_animation_studio)
        .map(|s| s.name.as_str())
        .collect();

    let genres: Vec<&str> = media
        .genres()
        .iter()
        .map(String::as_str)
        .filter(|g| ALLOWED_GENRES.contains(g))
        .collect();

    let next_airing = if format == "TV" && media.status == Some(AnilistStatus::Releasing) {
        next_airing(media.airing_nodes(), now)
    } else {
        None
    };

    OutputProperties {
        title,
        cover: media.cover_url().map(str::to_string),
        banner: media.banner_image.clone(),
        format,
        debut: media
            .start_year()
            .map(|y| y.to_string())
            .unwrap_or_default(),
        studios: studios.join(", "),
        genres: genres.join(", "),
        watched_seasons: parse_season(full_title),
        icon: country_icon(media.country_of_origin.as_deref()),
        next_airing,
    }
}

/// `(S<n>)` anywhere in the title gives `n - 1` already watched seasons.
pub fn parse_season(full_title: &str) -> Option<i64> {
    let caps = SEASON_MARKER.captures(full_title)?;
    let season: i64 = caps[1].parse().ok()?;
    Some(season - 1)
}

fn format_label(code: &str) -> String {
    match code {
        "TV" => "TV",
        "MOVIE" => "Movie",
        "OVA" => "OVA",
        "ONA" => "ONA",
        "SPECIAL" => "Special",
        other => other,
    }
    .to_string()
}

pub fn country_icon(code: Option<&str>) -> &'static str {
    match code {
        Some("JP") => "🇯🇵",
        Some("KR") => "🇰🇷",
        Some("CN") => "🇨🇳",
        Some("TW") => "🇹🇼",
        Some("US") => "🇺🇸",
        Some("CA") => "🇨🇦",
        Some("GB") => "🇬🇧",
        Some("FR") => "🇫🇷",
        _ => DEFAULT_ICON,
    }
}

/// Earliest episode that has not aired yet.
pub fn next_airing(nodes: &[AiringNode], now: DateTime<Utc>) -> Option<NextAiring> {
    nodes
        .iter()
        .filter(|n| n.time_until_airing > 0)
        .min_by_key(|n| n.time_until_airing)
        .and_then(|n| {
            let airing_at =
                now.checked_add_signed(Duration::seconds(i64::from(n.time_until_airing)))?;
            Some(NextAiring {
                episode: n.episode,
                airing_at,
            })
        })
}
