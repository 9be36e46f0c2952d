use async_trait::async_trait;
use plexarr_config::PlexConfig;
use plexarr_models::{EpisodeRecord, Movie, TvShow};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use crate::error::SourceError;
use crate::plex::api::{
    decode_episode, decode_movie, decode_show, decode_watchlist_item, LibrarySection,
    PlexHttpClient, PlexMetadata, MOVIE_TYPE, SHOW_TYPE,
};
use crate::plex::rss::FeedEntry;
use crate::traits::{EpisodeCatalog, PrimaryCatalog};

pub struct PlexClient {
    api: PlexHttpClient,
    watchlist_enabled: bool,
    watchlist_feed: Option<String>,
    // Library sections rarely change within one invocation
    sections_cache: Arc<RwLock<Option<Vec<LibrarySection>>>>,
    // Movies and shows come from the same feed
    feed_cache: Arc<RwLock<Option<Vec<FeedEntry>>>>,
}

impl PlexClient {
    pub fn new(config: &PlexConfig) -> Result<Self, SourceError> {
        Ok(Self {
            api: PlexHttpClient::new(config)?,
            watchlist_enabled: config.watchlist,
            watchlist_feed: config.watchlist_rss.clone().filter(|url| !url.trim().is_empty()),
            sections_cache: Arc::new(RwLock::new(None)),
            feed_cache: Arc::new(RwLock::new(None)),
        })
    }

    async fn sections(&self) -> Result<Vec<LibrarySection>, SourceError> {
        {
            let cached = self.sections_cache.read().await;
            if let Some(ref sections) = *cached {
                return Ok(sections.clone());
            }
        }

        let sections = self.api.get_sections().await?;
        debug!("Plex: {} library sections", sections.len());
        *self.sections_cache.write().await = Some(sections.clone());
        Ok(sections)
    }

    /// Raw metadata of every section of `section_type` ("movie" or "show")
    async fn library_items(
        &self,
        section_type: &str,
        type_code: u8,
    ) -> Result<Vec<PlexMetadata>, SourceError> {
        let mut items = Vec::new();
        for section in self.sections().await? {
            if section.type_ != section_type {
                continue;
            }
            debug!("Plex: reading section '{}' ({})", section.title, section.key);
            items.extend(self.api.get_section_items(&section.key, type_code).await?);
        }
        Ok(items)
    }

    /// Watchlist as read from the discover provider
    async fn watchlist_items(&self, type_code: u8) -> Result<Vec<PlexMetadata>, SourceError> {
        self.api.get_watchlist(type_code).await
    }

    /// Watchlist as read from the RSS feed. `None` when no feed is
    /// configured or it could not be read, so the caller falls back to the
    /// discover provider.
    async fn feed_entries(&self) -> Option<Vec<FeedEntry>> {
        let url = self.watchlist_feed.as_deref()?;
        {
            let cached = self.feed_cache.read().await;
            if let Some(ref entries) = *cached {
                return Some(entries.clone());
            }
        }

        match self.api.get_watchlist_feed(url).await {
            Ok(entries) => {
                *self.feed_cache.write().await = Some(entries.clone());
                Some(entries)
            }
            Err(e) => {
                warn!("Plex watchlist feed unavailable, using the discover provider: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl PrimaryCatalog<Movie> for PlexClient {
    fn source_name(&self) -> &str {
        "Plex"
    }

    async fn list_items(&self) -> Result<Vec<Movie>, SourceError> {
        let movies: Vec<Movie> = self
            .library_items("movie", MOVIE_TYPE)
            .await?
            .iter()
            .map(decode_movie)
            .collect();
        info!("Plex: {} movies", movies.len());
        Ok(movies)
    }

    async fn list_watchlist(&self) -> Result<Vec<Movie>, SourceError> {
        if !self.watchlist_enabled {
            debug!("Plex watchlist disabled in config");
            return Ok(Vec::new());
        }
        if let Some(entries) = self.feed_entries().await {
            let items: Vec<Movie> = entries
                .iter()
                .filter(|entry| entry.is_movie())
                .map(|entry| Movie { media: entry.to_item() })
                .collect();
            info!("Plex: {} movies on watchlist feed", items.len());
            return Ok(items);
        }

        let items: Vec<Movie> = self
            .watchlist_items(MOVIE_TYPE)
            .await?
            .iter()
            .filter(|meta| meta.type_.as_deref().map_or(true, |t| t == "movie"))
            .map(|meta| Movie { media: decode_watchlist_item(meta) })
            .collect();
        info!("Plex: {} movies on watchlist", items.len());
        Ok(items)
    }
}

#[async_trait]
impl PrimaryCatalog<TvShow> for PlexClient {
    fn source_name(&self) -> &str {
        "Plex"
    }

    async fn list_items(&self) -> Result<Vec<TvShow>, SourceError> {
        let shows: Vec<TvShow> = self
            .library_items("show", SHOW_TYPE)
            .await?
            .iter()
            .map(decode_show)
            .collect();
        info!("Plex: {} shows", shows.len());
        Ok(shows)
    }

    async fn list_watchlist(&self) -> Result<Vec<TvShow>, SourceError> {
        if !self.watchlist_enabled {
            debug!("Plex watchlist disabled in config");
            return Ok(Vec::new());
        }
        if let Some(entries) = self.feed_entries().await {
            let items: Vec<TvShow> = entries
                .iter()
                .filter(|entry| entry.is_show())
                .map(|entry| TvShow {
                    media: entry.to_item(),
                    episode_count: None,
                    season_count: None,
                })
                .collect();
            info!("Plex: {} shows on watchlist feed", items.len());
            return Ok(items);
        }

        let items: Vec<TvShow> = self
            .watchlist_items(SHOW_TYPE)
            .await?
            .iter()
            .filter(|meta| meta.type_.as_deref().map_or(true, |t| t == "show"))
            .map(|meta| TvShow {
                media: decode_watchlist_item(meta),
                episode_count: None,
                season_count: None,
            })
            .collect();
        info!("Plex: {} shows on watchlist", items.len());
        Ok(items)
    }
}

#[async_trait]
impl EpisodeCatalog for PlexClient {
    async fn list_episodes(&self, show_rating_key: &str) -> Result<Vec<EpisodeRecord>, SourceError> {
        let leaves = self.api.get_all_leaves(show_rating_key).await?;
        let mut episodes: Vec<EpisodeRecord> = leaves.iter().filter_map(decode_episode).collect();
        episodes.sort_by_key(|e| e.key);
        debug!("Plex: show {} has {} episodes", show_rating_key, episodes.len());
        Ok(episodes)
    }
}
