use async_trait::async_trait;
use plexarr_models::{EpisodeRecord, FileVariant, ManagerEpisode, QualityProfile, RootFolder, TvShow};
use crate::error::SourceError;

/// The playback library (Plex). Implemented once per media type.
#[async_trait]
pub trait PrimaryCatalog<T>: Send + Sync {
    fn source_name(&self) -> &str;

    /// Every item in the libraries of this media type
    async fn list_items(&self) -> Result<Vec<T>, SourceError>;

    /// Items of this media type on the account watchlist
    async fn list_watchlist(&self) -> Result<Vec<T>, SourceError>;
}

/// Episode-level view of the playback library
#[async_trait]
pub trait EpisodeCatalog: Send + Sync {
    /// All episodes of the show with the given Plex rating key
    async fn list_episodes(&self, show_rating_key: &str) -> Result<Vec<EpisodeRecord>, SourceError>;
}

/// A manager item together with its tag ids
#[derive(Debug, Clone)]
pub struct ItemDetails<T> {
    pub item: T,
    pub tags: Vec<u32>,
}

/// An acquisition manager (Radarr for movies, Sonarr for shows)
#[async_trait]
pub trait AcquisitionManager<T>: Send + Sync {
    fn source_name(&self) -> &str;

    async fn list_items(&self) -> Result<Vec<T>, SourceError>;
    async fn get_item_details(&self, id: u32) -> Result<ItemDetails<T>, SourceError>;

    /// Weight of a quality id; higher is better
    async fn get_quality_weight(&self, quality_id: u32) -> Result<i64, SourceError>;
    async fn list_tag_names(&self, tag_ids: &[u32]) -> Result<Vec<String>, SourceError>;

    /// Add an item. Fails with [`SourceError::MissingIdentifier`] when the
    /// item has no external id the manager can key on.
    async fn add_item(&self, item: &T, quality_profile_id: u32) -> Result<T, SourceError>;
    async fn delete_item(&self, id: u32, delete_files: bool) -> Result<(), SourceError>;

    /// Files on disk backing one item
    async fn list_files(&self, item_id: u32) -> Result<Vec<FileVariant>, SourceError>;
    async fn delete_file(&self, file_id: u32) -> Result<(), SourceError>;

    async fn list_root_folders(&self) -> Result<Vec<RootFolder>, SourceError>;
    async fn list_quality_profiles(&self) -> Result<Vec<QualityProfile>, SourceError>;
}

/// Episode operations only the show manager (Sonarr) offers
#[async_trait]
pub trait EpisodeManager: AcquisitionManager<TvShow> {
    async fn get_episodes(&self, series_id: u32) -> Result<Vec<ManagerEpisode>, SourceError>;
    async fn request_episode_search(&self, episode_ids: &[u32]) -> Result<(), SourceError>;
    async fn set_episode_monitored(&self, episode_id: u32, monitored: bool) -> Result<(), SourceError>;
    async fn find_show_by_title(&self, title: &str) -> Result<Option<TvShow>, SourceError>;
    async fn find_show_by_external_id(&self, tvdb_id: u32) -> Result<Option<TvShow>, SourceError>;
}
