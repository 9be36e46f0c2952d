//! Radarr v3 payloads and their conversion into models

use chrono::{DateTime, Utc};
use plexarr_models::{Availability, MediaIds, MediaItem, Movie};
use serde::{Deserialize, Serialize};
use crate::arr::{non_empty, non_zero, real_date, ArrMediaFile};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrMovie {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub tmdb_id: Option<u32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub size_on_disk: Option<u64>,
    #[serde(default)]
    pub movie_file: Option<ArrMediaFile>,
    #[serde(default)]
    pub tags: Vec<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMovieRequest {
    pub title: String,
    pub tmdb_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub quality_profile_id: u32,
    pub root_folder_path: String,
    pub monitored: bool,
    pub minimum_availability: &'static str,
    pub add_options: AddMovieOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMovieOptions {
    pub search_for_movie: bool,
}

pub fn decode_movie(raw: &RadarrMovie) -> Movie {
    let ids = MediaIds {
        manager_id: Some(raw.id),
        tmdb_id: non_zero(raw.tmdb_id),
        imdb_id: non_empty(raw.imdb_id.clone()),
        ..MediaIds::default()
    };

    let mut item = MediaItem::new(raw.title.clone(), Availability::Radarr).with_ids(ids);
    item.year = raw.year.filter(|y| *y > 0);
    item.added_date = real_date(raw.added);

    if let Some(ref file) = raw.movie_file {
        item.file_path = file.path.clone().or_else(|| file.relative_path.clone());
        item.file_size = Some(file.size).filter(|s| *s > 0);
    }
    if item.file_size.is_none() {
        item.file_size = raw.size_on_disk.filter(|s| *s > 0);
    }

    Movie { media: item }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOVIES_FIXTURE: &str = r#"[
        {
            "id": 12,
            "title": "The Matrix",
            "year": 1999,
            "tmdbId": 603,
            "imdbId": "tt0133093",
            "added": "2023-05-01T10:00:00Z",
            "sizeOnDisk": 8000,
            "hasFile": true,
            "tags": [1, 3],
            "movieFile": {
                "id": 40,
                "relativePath": "The Matrix (1999).mkv",
                "path": "/movies/The Matrix (1999)/The Matrix (1999).mkv",
                "size": 7500,
                "quality": {"quality": {"id": 7, "name": "Bluray-1080p"}, "revision": {"version": 1}}
            }
        },
        {
            "id": 13,
            "title": "Upcoming",
            "tmdbId": 0,
            "imdbId": "",
            "added": "0001-01-01T00:00:00Z",
            "sizeOnDisk": 0
        }
    ]"#;

    #[test]
    fn test_decode_movies() {
        let raw: Vec<RadarrMovie> = serde_json::from_str(MOVIES_FIXTURE).unwrap();
        let movies: Vec<Movie> = raw.iter().map(decode_movie).collect();

        let matrix = &movies[0].media;
        assert_eq!(matrix.availability, Availability::Radarr);
        assert_eq!(matrix.ids.manager_id, Some(12));
        assert_eq!(matrix.ids.tmdb_id, Some(603));
        assert_eq!(matrix.file_size, Some(7500));
        assert_eq!(
            matrix.file_path.as_deref(),
            Some("/movies/The Matrix (1999)/The Matrix (1999).mkv")
        );
        assert!(matrix.added_date.is_some());
        assert_eq!(raw[0].tags, vec![1, 3]);

        let upcoming = &movies[1].media;
        assert_eq!(upcoming.ids.tmdb_id, None);
        assert_eq!(upcoming.ids.imdb_id, None);
        assert_eq!(upcoming.added_date, None);
        assert_eq!(upcoming.file_size, None);
    }

    #[test]
    fn test_add_request_shape() {
        let request = AddMovieRequest {
            title: "The Matrix".to_string(),
            tmdb_id: 603,
            year: Some(1999),
            quality_profile_id: 4,
            root_folder_path: "/movies".to_string(),
            monitored: true,
            minimum_availability: "released",
            add_options: AddMovieOptions { search_for_movie: true },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tmdbId"], 603);
        assert_eq!(json["qualityProfileId"], 4);
        assert_eq!(json["rootFolderPath"], "/movies");
        assert_eq!(json["addOptions"]["searchForMovie"], true);
    }
}
