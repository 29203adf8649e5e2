use regex::Regex;
use std::sync::LazyLock;

static TRAILING_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*(\(.*\))?$").unwrap());

/// One line of the input list.
///
/// `search_key` is what gets sent to AniList, `full_title` keeps the
/// trailing parenthetical so a season marker like `(S2)` survives until
/// the fields are mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleLine {
    pub search_key: String,
    pub full_title: String,
}

pub fn parse_title_line(line: &str) -> TitleLine {
    let full_title = line.trim().to_string();

    let core = TRAILING_PARENTHETICAL
        .captures(&full_title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_default();

    // A line that is nothing but a parenthetical keeps the whole line as key
    let search_key = if core.is_empty() {
        full_title.clone()
    } else {
        core.to_string()
    };

    TitleLine {
        search_key,
        full_title,
    }
}
