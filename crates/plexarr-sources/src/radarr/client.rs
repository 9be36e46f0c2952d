use async_trait::async_trait;
use plexarr_config::ArrConfig;
use plexarr_models::{FileVariant, Movie, QualityProfile, RootFolder};
use tracing::{debug, info};
use crate::arr::{decode_file, ArrHttpClient, ArrMediaFile};
use crate::error::SourceError;
use crate::radarr::api::{decode_movie, AddMovieOptions, AddMovieRequest, RadarrMovie};
use crate::traits::{AcquisitionManager, ItemDetails};

pub struct RadarrClient {
    http: ArrHttpClient,
}

impl RadarrClient {
    pub fn new(config: &ArrConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http: ArrHttpClient::new("Radarr", config)?,
        })
    }
}

#[async_trait]
impl AcquisitionManager<Movie> for RadarrClient {
    fn source_name(&self) -> &str {
        self.http.service()
    }

    async fn list_items(&self) -> Result<Vec<Movie>, SourceError> {
        let raw: Vec<RadarrMovie> = self.http.get("movie").await?;
        info!("Radarr: {} movies", raw.len());
        Ok(raw.iter().map(decode_movie).collect())
    }

    async fn get_item_details(&self, id: u32) -> Result<ItemDetails<Movie>, SourceError> {
        let raw: RadarrMovie = self.http.get(&format!("movie/{}", id)).await?;
        Ok(ItemDetails {
            item: decode_movie(&raw),
            tags: raw.tags,
        })
    }

    async fn get_quality_weight(&self, quality_id: u32) -> Result<i64, SourceError> {
        self.http.quality_weight(quality_id).await
    }

    async fn list_tag_names(&self, tag_ids: &[u32]) -> Result<Vec<String>, SourceError> {
        self.http.tag_names(tag_ids).await
    }

    async fn add_item(&self, movie: &Movie, quality_profile_id: u32) -> Result<Movie, SourceError> {
        let tmdb_id = movie.media.ids.tmdb_id.ok_or_else(|| {
            SourceError::MissingIdentifier(format!(
                "'{}' has no TMDB id; Radarr needs one to add a movie",
                movie.media.title
            ))
        })?;

        let root_folder_path = self.http.first_root_folder().await?;
        debug!("Radarr: adding '{}' (tmdb:{}) under {}", movie.media.title, tmdb_id, root_folder_path);

        let request = AddMovieRequest {
            title: movie.media.title.clone(),
            tmdb_id,
            year: movie.media.year,
            quality_profile_id,
            root_folder_path,
            monitored: true,
            minimum_availability: "released",
            add_options: AddMovieOptions { search_for_movie: true },
        };
        let added: RadarrMovie = self.http.post("movie", &request).await?;
        Ok(decode_movie(&added))
    }

    async fn delete_item(&self, id: u32, delete_files: bool) -> Result<(), SourceError> {
        self.http
            .delete(&format!(
                "movie/{}?deleteFiles={}&addImportExclusion=false",
                id, delete_files
            ))
            .await
    }

    async fn list_files(&self, item_id: u32) -> Result<Vec<FileVariant>, SourceError> {
        let raw: Vec<ArrMediaFile> = self.http.get(&format!("moviefile?movieId={}", item_id)).await?;
        Ok(raw.iter().map(decode_file).collect())
    }

    async fn delete_file(&self, file_id: u32) -> Result<(), SourceError> {
        self.http.delete(&format!("moviefile/{}", file_id)).await
    }

    async fn list_root_folders(&self) -> Result<Vec<RootFolder>, SourceError> {
        self.http.root_folders().await
    }

    async fn list_quality_profiles(&self) -> Result<Vec<QualityProfile>, SourceError> {
        self.http.quality_profiles().await
    }
}
