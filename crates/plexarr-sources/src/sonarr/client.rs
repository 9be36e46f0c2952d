use async_trait::async_trait;
use plexarr_config::ArrConfig;
use plexarr_models::{FileVariant, ManagerEpisode, QualityProfile, RootFolder, TvShow};
use serde_json::Value;
use tracing::{debug, info};
use crate::arr::{decode_file, ArrHttpClient, ArrMediaFile};
use crate::error::SourceError;
use crate::sonarr::api::{
    decode_episode, decode_series, AddSeriesOptions, AddSeriesRequest, EpisodeMonitorRequest,
    EpisodeSearchCommand, SonarrEpisode, SonarrSeries,
};
use crate::traits::{AcquisitionManager, EpisodeManager, ItemDetails};

const DEFAULT_LANGUAGE_PROFILE_ID: u32 = 1;

pub struct SonarrClient {
    http: ArrHttpClient,
}

impl SonarrClient {
    pub fn new(config: &ArrConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http: ArrHttpClient::new("Sonarr", config)?,
        })
    }

    async fn all_series(&self) -> Result<Vec<SonarrSeries>, SourceError> {
        self.http.get("series").await
    }

    /// TVDB id for a show that only carries an IMDb id, via `series/lookup`
    async fn lookup_tvdb_id(&self, show: &TvShow) -> Result<u32, SourceError> {
        let missing = || {
            SourceError::MissingIdentifier(format!(
                "'{}' has no TVDB or IMDb id; Sonarr needs one to add a show",
                show.media.title
            ))
        };
        let imdb_id = show.media.ids.imdb_id.as_deref().ok_or_else(missing)?;

        let term = urlencoding::encode(&format!("imdb:{}", imdb_id)).into_owned();
        let results: Vec<SonarrSeries> = self.http.get(&format!("series/lookup?term={}", term)).await?;
        debug!("Sonarr lookup imdb:{} returned {} results", imdb_id, results.len());

        results
            .iter()
            .find_map(|s| s.tvdb_id.filter(|id| *id != 0))
            .ok_or_else(|| {
                SourceError::MissingIdentifier(format!(
                    "Sonarr could not resolve a TVDB id for '{}' (imdb:{})",
                    show.media.title, imdb_id
                ))
            })
    }
}

#[async_trait]
impl AcquisitionManager<TvShow> for SonarrClient {
    fn source_name(&self) -> &str {
        self.http.service()
    }

    async fn list_items(&self) -> Result<Vec<TvShow>, SourceError> {
        let raw = self.all_series().await?;
        info!("Sonarr: {} series", raw.len());
        Ok(raw.iter().map(decode_series).collect())
    }

    async fn get_item_details(&self, id: u32) -> Result<ItemDetails<TvShow>, SourceError> {
        let raw: SonarrSeries = self.http.get(&format!("series/{}", id)).await?;
        Ok(ItemDetails {
            item: decode_series(&raw),
            tags: raw.tags,
        })
    }

    async fn get_quality_weight(&self, quality_id: u32) -> Result<i64, SourceError> {
        self.http.quality_weight(quality_id).await
    }

    async fn list_tag_names(&self, tag_ids: &[u32]) -> Result<Vec<String>, SourceError> {
        self.http.tag_names(tag_ids).await
    }

    async fn add_item(&self, show: &TvShow, quality_profile_id: u32) -> Result<TvShow, SourceError> {
        let tvdb_id = match show.media.ids.tvdb_id {
            Some(id) => id,
            None => self.lookup_tvdb_id(show).await?,
        };

        let root_folder_path = self.http.first_root_folder().await?;
        debug!("Sonarr: adding '{}' (tvdb:{}) under {}", show.media.title, tvdb_id, root_folder_path);

        let request = AddSeriesRequest {
            title: show.media.title.clone(),
            tvdb_id,
            imdb_id: show.media.ids.imdb_id.clone(),
            quality_profile_id,
            language_profile_id: DEFAULT_LANGUAGE_PROFILE_ID,
            root_folder_path,
            monitored: true,
            season_folder: true,
            add_options: AddSeriesOptions {
                search_for_missing_episodes: false,
            },
        };
        let added: SonarrSeries = self.http.post("series", &request).await?;
        Ok(decode_series(&added))
    }

    async fn delete_item(&self, id: u32, delete_files: bool) -> Result<(), SourceError> {
        self.http
            .delete(&format!("series/{}?deleteFiles={}", id, delete_files))
            .await
    }

    async fn list_files(&self, item_id: u32) -> Result<Vec<FileVariant>, SourceError> {
        let raw: Vec<ArrMediaFile> = self.http.get(&format!("episodefile?seriesId={}", item_id)).await?;
        Ok(raw.iter().map(decode_file).collect())
    }

    async fn delete_file(&self, file_id: u32) -> Result<(), SourceError> {
        self.http.delete(&format!("episodefile/{}", file_id)).await
    }

    async fn list_root_folders(&self) -> Result<Vec<RootFolder>, SourceError> {
        self.http.root_folders().await
    }

    async fn list_quality_profiles(&self) -> Result<Vec<QualityProfile>, SourceError> {
        self.http.quality_profiles().await
    }
}

#[async_trait]
impl EpisodeManager for SonarrClient {
    async fn get_episodes(&self, series_id: u32) -> Result<Vec<ManagerEpisode>, SourceError> {
        let raw: Vec<SonarrEpisode> = self.http.get(&format!("episode?seriesId={}", series_id)).await?;
        let mut episodes: Vec<ManagerEpisode> = raw.iter().map(decode_episode).collect();
        episodes.sort_by_key(|e| e.key);
        Ok(episodes)
    }

    async fn request_episode_search(&self, episode_ids: &[u32]) -> Result<(), SourceError> {
        if episode_ids.is_empty() {
            return Ok(());
        }
        let command = EpisodeSearchCommand {
            name: "EpisodeSearch",
            episode_ids: episode_ids.to_vec(),
        };
        let _: Value = self.http.post("command", &command).await?;
        info!("Sonarr: search requested for {} episode(s)", episode_ids.len());
        Ok(())
    }

    async fn set_episode_monitored(&self, episode_id: u32, monitored: bool) -> Result<(), SourceError> {
        let request = EpisodeMonitorRequest {
            episode_ids: vec![episode_id],
            monitored,
        };
        let _: Value = self.http.put("episode/monitor", &request).await?;
        Ok(())
    }

    /// Exact case-insensitive title match first, then substring match
    async fn find_show_by_title(&self, title: &str) -> Result<Option<TvShow>, SourceError> {
        let wanted = title.to_lowercase();
        let series = self.all_series().await?;

        let found = series
            .iter()
            .find(|s| s.title.to_lowercase() == wanted)
            .or_else(|| series.iter().find(|s| s.title.to_lowercase().contains(&wanted)));
        Ok(found.map(decode_series))
    }

    async fn find_show_by_external_id(&self, tvdb_id: u32) -> Result<Option<TvShow>, SourceError> {
        let series = self.all_series().await?;
        Ok(series
            .iter()
            .find(|s| s.tvdb_id == Some(tvdb_id))
            .map(decode_series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexarr_models::Availability;

    #[tokio::test]
    async fn test_add_without_ids_fails_before_any_request() {
        let sonarr = SonarrClient::new(&ArrConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "key".to_string(),
        })
        .unwrap();
        let show = TvShow::new("Severance", Availability::Plex);

        let err = sonarr.add_item(&show, 1).await.unwrap_err();
        assert!(matches!(err, SourceError::MissingIdentifier(ref m) if m.contains("Severance")), "{:?}", err);
    }
}
