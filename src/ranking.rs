use crate::anilist::AnilistMedia;

/// TV entries first, then by start year with unknown years last.
/// The sort is stable so AniList's relevance order breaks ties.
pub fn rank_candidates(mut candidates: Vec<AnilistMedia>) -> Vec<AnilistMedia> {
    candidates.sort_by_key(sort_key);
    candidates
}

fn sort_key(media: &AnilistMedia) -> (u8, bool, Option<i32>) {
    let format_rank = match media.format.as_deref() {
        Some(format) if format.eq_ignore_ascii_case("TV") => 0,
        _ => 1,
    };
    let year = media.start_year();
    (format_rank, year.is_none(), year)
}

/// One numbered line per candidate, starting at 1.
pub fn render_candidates(candidates: &[AnilistMedia]) -> Vec<String> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, media)| format!("{}. {}", i + 1, media))
        .collect()
}
