use plexarr_models::{AsMedia, MediaIds};

/// Title form used for fallback matching: lowercase ASCII alphanumerics,
/// single spaces, no leading "the", "a" or "an".
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    let mut normalized = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    for article in ["the ", "a ", "an "] {
        if let Some(rest) = normalized.strip_prefix(article) {
            normalized = rest.to_string();
        }
    }
    normalized
}

/// Identity of a title during one merge. Never leaves this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum MergeKey {
    Tmdb(u32),
    Tvdb(u32),
    Imdb(String),
    Plex(String),
    Manager(u32),
    Title(String),
}

/// Movies: TMDB, then IMDb, then normalized title
pub(crate) fn derive_movie_key<T: AsMedia>(item: &T) -> MergeKey {
    let media = item.media();
    let ids = &media.ids;
    if let Some(id) = ids.tmdb_id {
        MergeKey::Tmdb(id)
    } else if let Some(ref id) = ids.imdb_id {
        MergeKey::Imdb(id.clone())
    } else {
        MergeKey::Title(normalize_title(&media.title))
    }
}

/// Shows: TVDB, then IMDb, then Plex rating key, then Sonarr id, then
/// normalized title
pub(crate) fn derive_show_key<T: AsMedia>(item: &T) -> MergeKey {
    let media = item.media();
    let ids = &media.ids;
    if let Some(id) = ids.tvdb_id {
        MergeKey::Tvdb(id)
    } else if let Some(ref id) = ids.imdb_id {
        MergeKey::Imdb(id.clone())
    } else if let Some(ref key) = ids.plex_rating_key {
        MergeKey::Plex(key.clone())
    } else if let Some(id) = ids.manager_id {
        MergeKey::Manager(id)
    } else {
        MergeKey::Title(normalize_title(&media.title))
    }
}

/// True when both sides carry the same kind of external id with different
/// values. Such records are different titles whatever their names say.
pub(crate) fn strong_ids_conflict(a: &MediaIds, b: &MediaIds) -> bool {
    fn differ<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
        matches!((a, b), (Some(x), Some(y)) if x != y)
    }
    differ(&a.tmdb_id, &b.tmdb_id) || differ(&a.tvdb_id, &b.tvdb_id) || differ(&a.imdb_id, &b.imdb_id)
}
