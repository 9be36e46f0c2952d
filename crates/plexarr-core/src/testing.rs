//! In-memory fakes of the service traits for workflow tests.

use async_trait::async_trait;
use plexarr_models::{
    AsMedia, EpisodeRecord, FileVariant, ManagerEpisode, QualityProfile, RootFolder, TvShow,
};
use plexarr_sources::{
    AcquisitionManager, EpisodeCatalog, EpisodeManager, ItemDetails, PrimaryCatalog, SourceError,
};
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) struct FakeCatalog<T> {
    pub items: Vec<T>,
    pub watchlist: Vec<T>,
    pub fail: bool,
}

impl<T> FakeCatalog<T> {
    pub fn new(items: Vec<T>, watchlist: Vec<T>) -> Self {
        Self {
            items,
            watchlist,
            fail: false,
        }
    }

    fn check(&self) -> Result<(), SourceError> {
        if self.fail {
            return Err(SourceError::Api {
                service: "Plex",
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> PrimaryCatalog<T> for FakeCatalog<T> {
    fn source_name(&self) -> &str {
        "Plex"
    }

    async fn list_items(&self) -> Result<Vec<T>, SourceError> {
        self.check()?;
        Ok(self.items.clone())
    }

    async fn list_watchlist(&self) -> Result<Vec<T>, SourceError> {
        self.check()?;
        Ok(self.watchlist.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeEpisodes {
    pub by_show: HashMap<String, Vec<EpisodeRecord>>,
}

#[async_trait]
impl EpisodeCatalog for FakeEpisodes {
    async fn list_episodes(&self, show_rating_key: &str) -> Result<Vec<EpisodeRecord>, SourceError> {
        self.by_show
            .get(show_rating_key)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("show {}", show_rating_key)))
    }
}

/// A manager holding items in memory and recording every mutation as a
/// `verb:argument` string
pub(crate) struct FakeManager<T> {
    name: &'static str,
    pub items: Mutex<Vec<T>>,
    pub files: HashMap<u32, Vec<FileVariant>>,
    pub weights: HashMap<u32, i64>,
    pub tags: HashMap<u32, Vec<u32>>,
    pub tag_names: HashMap<u32, String>,
    pub root_folders: Vec<RootFolder>,
    pub episodes: HashMap<u32, Vec<ManagerEpisode>>,
    pub fail_list: bool,
    pub fail_deletes: Vec<u32>,
    pub calls: Mutex<Vec<String>>,
}

impl<T> FakeManager<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Mutex::new(Vec::new()),
            files: HashMap::new(),
            weights: HashMap::new(),
            tags: HashMap::new(),
            tag_names: HashMap::new(),
            root_folders: vec![RootFolder {
                id: Some(1),
                path: "/media".to_string(),
                free_space: None,
            }],
            episodes: HashMap::new(),
            fail_list: false,
            fail_deletes: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_items(self, items: Vec<T>) -> Self {
        *self.items.lock().unwrap() = items;
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[async_trait]
impl<T> AcquisitionManager<T> for FakeManager<T>
where
    T: AsMedia + Clone + Send + Sync + 'static,
{
    fn source_name(&self) -> &str {
        self.name
    }

    async fn list_items(&self) -> Result<Vec<T>, SourceError> {
        if self.fail_list {
            return Err(SourceError::NotFound("connection refused".to_string()));
        }
        Ok(self.items.lock().unwrap().clone())
    }

    async fn get_item_details(&self, id: u32) -> Result<ItemDetails<T>, SourceError> {
        let item = self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.media().ids.manager_id == Some(id))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("item {}", id)))?;
        Ok(ItemDetails {
            item,
            tags: self.tags.get(&id).cloned().unwrap_or_default(),
        })
    }

    async fn get_quality_weight(&self, quality_id: u32) -> Result<i64, SourceError> {
        self.record(format!("quality:{}", quality_id));
        self.weights
            .get(&quality_id)
            .copied()
            .ok_or_else(|| SourceError::NotFound(format!("quality {}", quality_id)))
    }

    async fn list_tag_names(&self, tag_ids: &[u32]) -> Result<Vec<String>, SourceError> {
        Ok(tag_ids.iter().filter_map(|id| self.tag_names.get(id).cloned()).collect())
    }

    async fn add_item(&self, item: &T, quality_profile_id: u32) -> Result<T, SourceError> {
        let media = item.media();
        if !media.ids.has_external_id() {
            return Err(SourceError::MissingIdentifier(media.title.clone()));
        }
        self.record(format!("add:{}:{}", media.title, quality_profile_id));

        let mut items = self.items.lock().unwrap();
        let mut added = item.clone();
        added.media_mut().ids.manager_id = Some(1000 + items.len() as u32);
        items.push(added.clone());
        Ok(added)
    }

    async fn delete_item(&self, id: u32, delete_files: bool) -> Result<(), SourceError> {
        if self.fail_deletes.contains(&id) {
            return Err(SourceError::Api {
                service: self.name,
                status: 500,
                message: "boom".to_string(),
            });
        }
        self.record(format!("delete:{}:{}", id, delete_files));
        Ok(())
    }

    async fn list_files(&self, item_id: u32) -> Result<Vec<FileVariant>, SourceError> {
        Ok(self.files.get(&item_id).cloned().unwrap_or_default())
    }

    async fn delete_file(&self, file_id: u32) -> Result<(), SourceError> {
        self.record(format!("delete_file:{}", file_id));
        Ok(())
    }

    async fn list_root_folders(&self) -> Result<Vec<RootFolder>, SourceError> {
        Ok(self.root_folders.clone())
    }

    async fn list_quality_profiles(&self) -> Result<Vec<QualityProfile>, SourceError> {
        Ok(vec![QualityProfile {
            id: 1,
            name: "Any".to_string(),
        }])
    }
}

#[async_trait]
impl EpisodeManager for FakeManager<TvShow> {
    async fn get_episodes(&self, series_id: u32) -> Result<Vec<ManagerEpisode>, SourceError> {
        let mut episodes = self.episodes.get(&series_id).cloned().unwrap_or_default();
        episodes.sort_by_key(|e| e.key);
        Ok(episodes)
    }

    async fn request_episode_search(&self, episode_ids: &[u32]) -> Result<(), SourceError> {
        let ids: Vec<String> = episode_ids.iter().map(|id| id.to_string()).collect();
        self.record(format!("search:{}", ids.join(",")));
        Ok(())
    }

    async fn set_episode_monitored(&self, episode_id: u32, monitored: bool) -> Result<(), SourceError> {
        self.record(format!("monitor:{}:{}", episode_id, monitored));
        Ok(())
    }

    async fn find_show_by_title(&self, title: &str) -> Result<Option<TvShow>, SourceError> {
        let wanted = title.to_lowercase();
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.media.title.to_lowercase() == wanted)
            .cloned())
    }

    async fn find_show_by_external_id(&self, tvdb_id: u32) -> Result<Option<TvShow>, SourceError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.media.ids.tvdb_id == Some(tvdb_id))
            .cloned())
    }
}
