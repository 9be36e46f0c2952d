use chrono::{DateTime, TimeZone, Utc};
use plexarr_config::PlexConfig;
use plexarr_models::{
    Availability, EpisodeKey, EpisodeRecord, MediaIds, MediaItem, Movie, TvShow, WatchStatus,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use crate::error::SourceError;
use crate::plex::rss::{parse_feed, FeedEntry};

const SERVICE: &str = "Plex";
const DISCOVER_BASE_URL: &str = "https://discover.provider.plex.tv";
const CLIENT_IDENTIFIER: &str = "plexarr";

/// Plex `type` query parameter values
pub const MOVIE_TYPE: u8 = 1;
pub const SHOW_TYPE: u8 = 2;

#[derive(Debug, Deserialize)]
struct PlexResponse<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectoryContainer {
    #[serde(rename = "Directory", default)]
    pub directory: Vec<LibrarySection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibrarySection {
    pub key: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub title: String,
}

/// One entry of a `Metadata` array. Movies, shows and episodes share the
/// shape; fields a kind does not use are simply absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlexMetadata {
    #[serde(default)]
    pub rating_key: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub view_count: Option<u32>,
    #[serde(default)]
    pub view_offset: Option<u64>,
    #[serde(default)]
    pub last_viewed_at: Option<i64>,
    #[serde(default)]
    pub added_at: Option<i64>,
    #[serde(rename = "Guid", default)]
    pub guids: Vec<PlexGuid>,
    #[serde(rename = "Media", default)]
    pub media: Vec<PlexMedia>,
    #[serde(default)]
    pub leaf_count: Option<u32>,
    #[serde(default)]
    pub viewed_leaf_count: Option<u32>,
    #[serde(default)]
    pub child_count: Option<u32>,
    /// Season number on episodes
    #[serde(default)]
    pub parent_index: Option<u32>,
    /// Episode number on episodes
    #[serde(default)]
    pub index: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlexGuid {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexMedia {
    #[serde(rename = "Part", default)]
    pub parts: Vec<PlexPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlexPart {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

pub struct PlexHttpClient {
    client: Client,
    /// No Plex headers: the feed URL is its own credential
    feed_client: Client,
    base_url: String,
    discover_base_url: String,
}

impl PlexHttpClient {
    pub fn new(config: &PlexConfig) -> Result<Self, SourceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::HeaderName::from_static("x-plex-token"),
            reqwest::header::HeaderValue::from_str(&config.token).map_err(|e| {
                SourceError::InvalidConfig {
                    service: SERVICE,
                    message: format!("token is not a valid header value: {}", e),
                }
            })?,
        );
        headers.insert(
            reqwest::header::HeaderName::from_static("x-plex-client-identifier"),
            reqwest::header::HeaderValue::from_static(CLIENT_IDENTIFIER),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::http(SERVICE, e))?;

        let feed_client = Client::builder()
            .build()
            .map_err(|e| SourceError::http(SERVICE, e))?;

        Ok(Self {
            client,
            feed_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            discover_base_url: DISCOVER_BASE_URL.to_string(),
        })
    }

    async fn get<T: DeserializeOwned + Default>(&self, url: &str) -> Result<T, SourceError> {
        debug!("Plex: GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::http(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::http(SERVICE, e))?;
        trace!("Plex response: {} bytes", body.len());
        parse_container(&body)
    }

    pub async fn get_sections(&self) -> Result<Vec<LibrarySection>, SourceError> {
        let url = format!("{}/library/sections", self.base_url);
        let container: DirectoryContainer = self.get(&url).await?;
        Ok(container.directory)
    }

    pub async fn get_section_items(
        &self,
        section_key: &str,
        type_code: u8,
    ) -> Result<Vec<PlexMetadata>, SourceError> {
        let url = format!(
            "{}/library/sections/{}/all?type={}&includeGuids=1",
            self.base_url, section_key, type_code
        );
        let container: MetadataContainer = self.get(&url).await?;
        debug!("Plex section {}: {} items", section_key, container.metadata.len());
        Ok(container.metadata)
    }

    /// Every episode of a show, across seasons
    pub async fn get_all_leaves(&self, rating_key: &str) -> Result<Vec<PlexMetadata>, SourceError> {
        let url = format!(
            "{}/library/metadata/{}/allLeaves",
            self.base_url,
            urlencoding::encode(rating_key)
        );
        let container: MetadataContainer = self.get(&url).await?;
        Ok(container.metadata)
    }

    pub async fn get_watchlist(&self, type_code: u8) -> Result<Vec<PlexMetadata>, SourceError> {
        let url = format!(
            "{}/library/sections/watchlist/all?type={}&includeGuids=1",
            self.discover_base_url, type_code
        );
        let container: MetadataContainer = self.get(&url).await?;
        debug!("Plex watchlist returned {} items", container.metadata.len());
        Ok(container.metadata)
    }

    /// The watchlist RSS feed at `url`
    pub async fn get_watchlist_feed(&self, url: &str) -> Result<Vec<FeedEntry>, SourceError> {
        debug!("Plex: GET watchlist feed");
        let response = self
            .feed_client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::http(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::http(SERVICE, e))?;
        let entries = parse_feed(&body)?;
        debug!("Plex watchlist feed returned {} items", entries.len());
        Ok(entries)
    }
}

/// Decode the `MediaContainer` envelope. An empty body is an empty container.
pub fn parse_container<T: DeserializeOwned + Default>(body: &str) -> Result<T, SourceError> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    let response: PlexResponse<T> =
        serde_json::from_str(body).map_err(|e| SourceError::decode(SERVICE, e))?;
    Ok(response.media_container)
}

fn parse_timestamp(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

/// External ids carried by Plex GUIDs (`imdb://tt…`, `tmdb://603`, `tvdb://81189`)
pub fn ids_from_guids(guids: &[PlexGuid]) -> MediaIds {
    let mut ids = MediaIds::default();
    for guid in guids {
        apply_guid(&mut ids, &guid.id);
    }
    ids
}

/// Record the id one GUID carries; other schemes are ignored
pub fn apply_guid(ids: &mut MediaIds, guid: &str) {
    let Some((scheme, value)) = guid.trim().split_once("://") else {
        return;
    };
    match scheme {
        "imdb" if !value.is_empty() => ids.imdb_id = Some(value.to_string()),
        "tmdb" => ids.tmdb_id = value.parse().ok().filter(|id| *id != 0),
        "tvdb" => ids.tvdb_id = value.parse().ok().filter(|id| *id != 0),
        _ => {}
    }
}

fn apply_view_state(item: &mut MediaItem, meta: &PlexMetadata) {
    let last_viewed = parse_timestamp(meta.last_viewed_at);
    if meta.view_count.unwrap_or(0) > 0 {
        item.set_watched(last_viewed);
    } else if meta.view_offset.unwrap_or(0) > 0 {
        item.set_in_progress(last_viewed);
    }
}

fn base_item(meta: &PlexMetadata) -> MediaItem {
    let mut ids = ids_from_guids(&meta.guids);
    ids.plex_rating_key = meta.rating_key.clone();

    let mut item = MediaItem::new(meta.title.clone(), Availability::Plex).with_ids(ids);
    item.year = meta.year;
    item.added_date = parse_timestamp(meta.added_at);
    item
}

pub fn decode_movie(meta: &PlexMetadata) -> Movie {
    let mut item = base_item(meta);
    apply_view_state(&mut item, meta);

    let parts = meta.media.iter().flat_map(|m| m.parts.iter());
    for part in parts {
        if item.file_path.is_none() {
            item.file_path = part.file.clone();
        }
        if let Some(size) = part.size {
            item.file_size = Some(item.file_size.unwrap_or(0) + size);
        }
    }

    Movie { media: item }
}

/// Shows are watched when every leaf (episode) is viewed and in progress
/// when only some are.
pub fn decode_show(meta: &PlexMetadata) -> TvShow {
    let mut item = base_item(meta);
    let leaves = meta.leaf_count.unwrap_or(0);
    let viewed = meta.viewed_leaf_count.unwrap_or(0);
    let last_viewed = parse_timestamp(meta.last_viewed_at);
    if leaves > 0 && viewed >= leaves {
        item.set_watched(last_viewed);
    } else if viewed > 0 {
        item.set_in_progress(last_viewed);
    }

    TvShow {
        media: item,
        episode_count: meta.leaf_count,
        season_count: meta.child_count,
    }
}

/// Episodes without season/episode numbers are skipped
pub fn decode_episode(meta: &PlexMetadata) -> Option<EpisodeRecord> {
    let key = EpisodeKey::new(meta.parent_index?, meta.index?);
    let last_viewed = parse_timestamp(meta.last_viewed_at);

    let (watch_status, last_viewed_at) = if meta.view_count.unwrap_or(0) > 0 {
        (WatchStatus::Watched, last_viewed)
    } else if meta.view_offset.unwrap_or(0) > 0 {
        (WatchStatus::InProgress, last_viewed)
    } else {
        (WatchStatus::NotWatched, None)
    };

    Some(EpisodeRecord {
        key,
        title: meta.title.clone(),
        watch_status,
        last_viewed_at,
        rating_key: meta.rating_key.clone(),
    })
}

/// Watchlist entries are not in the library, so they carry no rating key
pub fn decode_watchlist_item(meta: &PlexMetadata) -> MediaItem {
    let mut item = MediaItem::new(meta.title.clone(), Availability::Plex)
        .with_ids(ids_from_guids(&meta.guids));
    item.year = meta.year;
    item.in_watchlist = true;
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIES_FIXTURE: &str = r#"{
        "MediaContainer": {
            "size": 3,
            "Metadata": [
                {
                    "ratingKey": "101",
                    "title": "The Matrix",
                    "type": "movie",
                    "year": 1999,
                    "viewCount": 2,
                    "lastViewedAt": 1700000000,
                    "addedAt": 1600000000,
                    "Guid": [{"id": "imdb://tt0133093"}, {"id": "tmdb://603"}],
                    "Media": [{"Part": [
                        {"file": "/movies/The Matrix/part1.mkv", "size": 1000},
                        {"file": "/movies/The Matrix/part2.mkv", "size": 500}
                    ]}]
                },
                {
                    "ratingKey": "102",
                    "title": "Heat",
                    "type": "movie",
                    "viewOffset": 120000,
                    "lastViewedAt": 1700000100
                },
                {
                    "ratingKey": "103",
                    "title": "Alien"
                }
            ]
        }
    }"#;

    #[test]
    fn test_decode_movies() {
        let container: MetadataContainer = parse_container(MOVIES_FIXTURE).unwrap();
        let movies: Vec<Movie> = container.metadata.iter().map(decode_movie).collect();
        assert_eq!(movies.len(), 3);

        let matrix = &movies[0].media;
        assert_eq!(matrix.watch_status, WatchStatus::Watched);
        assert!(matrix.watch_date.is_some());
        assert_eq!(matrix.ids.tmdb_id, Some(603));
        assert_eq!(matrix.ids.imdb_id.as_deref(), Some("tt0133093"));
        assert_eq!(matrix.ids.plex_rating_key.as_deref(), Some("101"));
        assert_eq!(matrix.file_size, Some(1500));
        assert_eq!(matrix.file_path.as_deref(), Some("/movies/The Matrix/part1.mkv"));
        assert_eq!(matrix.year, Some(1999));
        assert!(matrix.added_date.is_some());

        let heat = &movies[1].media;
        assert_eq!(heat.watch_status, WatchStatus::InProgress);
        assert!(heat.progress_date.is_some());
        assert!(heat.watch_date.is_none());

        let alien = &movies[2].media;
        assert_eq!(alien.watch_status, WatchStatus::NotWatched);
        assert!(alien.file_size.is_none());
        assert!(alien.ids.tmdb_id.is_none());
    }

    #[test]
    fn test_decode_show_progress() {
        let body = r#"{"MediaContainer": {"Metadata": [
            {"ratingKey": "7", "title": "Severance", "leafCount": 19, "viewedLeafCount": 4,
             "childCount": 2, "lastViewedAt": 1700000000, "Guid": [{"id": "tvdb://371980"}]},
            {"ratingKey": "8", "title": "Dark", "leafCount": 26, "viewedLeafCount": 26, "childCount": 3},
            {"ratingKey": "9", "title": "Andor", "leafCount": 12, "viewedLeafCount": 0}
        ]}}"#;
        let container: MetadataContainer = parse_container(body).unwrap();
        let shows: Vec<TvShow> = container.metadata.iter().map(decode_show).collect();

        assert_eq!(shows[0].media.watch_status, WatchStatus::InProgress);
        assert_eq!(shows[0].media.ids.tvdb_id, Some(371980));
        assert_eq!(shows[0].episode_count, Some(19));
        assert_eq!(shows[0].season_count, Some(2));
        assert_eq!(shows[1].media.watch_status, WatchStatus::Watched);
        assert_eq!(shows[2].media.watch_status, WatchStatus::NotWatched);
    }

    #[test]
    fn test_decode_episodes_skips_unnumbered() {
        let body = r#"{"MediaContainer": {"Metadata": [
            {"ratingKey": "71", "title": "Good News About Hell", "parentIndex": 1, "index": 1,
             "viewCount": 1, "lastViewedAt": 1700000000},
            {"ratingKey": "72", "title": "Half Loop", "parentIndex": 1, "index": 2,
             "viewOffset": 5000, "lastViewedAt": 1700000500},
            {"ratingKey": "73", "title": "In Perpetuity", "parentIndex": 1, "index": 3},
            {"ratingKey": "74", "title": "Special"}
        ]}}"#;
        let container: MetadataContainer = parse_container(body).unwrap();
        let episodes: Vec<EpisodeRecord> =
            container.metadata.iter().filter_map(decode_episode).collect();

        assert_eq!(episodes.len(), 3);
        assert_eq!(episodes[0].key, EpisodeKey::new(1, 1));
        assert_eq!(episodes[0].watch_status, WatchStatus::Watched);
        assert_eq!(episodes[1].watch_status, WatchStatus::InProgress);
        assert_eq!(episodes[2].watch_status, WatchStatus::NotWatched);
        assert!(episodes[2].last_viewed_at.is_none());
    }

    #[test]
    fn test_decode_watchlist_and_sections() {
        let body = r#"{"MediaContainer": {"Metadata": [
            {"ratingKey": "5d776", "title": "Dune", "type": "movie", "year": 2021,
             "Guid": [{"id": "tmdb://438631"}, {"id": "tvdb://0"}]}
        ]}}"#;
        let container: MetadataContainer = parse_container(body).unwrap();
        let item = decode_watchlist_item(&container.metadata[0]);
        assert!(item.in_watchlist);
        assert_eq!(item.ids.tmdb_id, Some(438631));
        assert_eq!(item.ids.tvdb_id, None);
        assert!(item.ids.plex_rating_key.is_none());

        let body = r#"{"MediaContainer": {"Directory": [
            {"key": "1", "type": "movie", "title": "Movies"},
            {"key": "2", "type": "show", "title": "TV Shows"}
        ]}}"#;
        let sections: DirectoryContainer = parse_container(body).unwrap();
        assert_eq!(sections.directory.len(), 2);
        assert_eq!(sections.directory[1].type_, "show");

        let empty: MetadataContainer = parse_container("").unwrap();
        assert!(empty.metadata.is_empty());
        assert!(parse_container::<MetadataContainer>("not json").is_err());
    }

    #[test]
    fn test_ids_from_guids_ignores_unknown_schemes() {
        let guids = vec![
            PlexGuid { id: "plex://movie/5d776".to_string() },
            PlexGuid { id: "tmdb://abc".to_string() },
            PlexGuid { id: "imdb://tt1".to_string() },
        ];
        let ids = ids_from_guids(&guids);
        assert_eq!(ids.tmdb_id, None);
        assert_eq!(ids.imdb_id.as_deref(), Some("tt1"));
    }
}
