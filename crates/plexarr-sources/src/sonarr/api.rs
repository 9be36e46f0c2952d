//! Sonarr v3 payloads and their conversion into models

use chrono::{DateTime, Utc};
use plexarr_models::{Availability, EpisodeKey, ManagerEpisode, MediaIds, MediaItem, TvShow};
use serde::{Deserialize, Serialize};
use crate::arr::{non_empty, non_zero, real_date};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrSeries {
    /// Absent on `series/lookup` results that are not in the library yet
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub tvdb_id: Option<u32>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub seasons: Vec<SonarrSeason>,
    #[serde(default)]
    pub tags: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrSeason {
    pub season_number: u32,
    #[serde(default)]
    pub statistics: Option<SeasonStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonStatistics {
    #[serde(default)]
    pub episode_count: u32,
    #[serde(default)]
    pub size_on_disk: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrEpisode {
    pub id: u32,
    pub season_number: u32,
    pub episode_number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub monitored: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSeriesRequest {
    pub title: String,
    pub tvdb_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    pub quality_profile_id: u32,
    /// Sonarr v3 requires it; v4 ignores it
    pub language_profile_id: u32,
    pub root_folder_path: String,
    pub monitored: bool,
    pub season_folder: bool,
    pub add_options: AddSeriesOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSeriesOptions {
    pub search_for_missing_episodes: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeSearchCommand {
    pub name: &'static str,
    pub episode_ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeMonitorRequest {
    pub episode_ids: Vec<u32>,
    pub monitored: bool,
}

/// Size, episode and season totals are summed over `seasons[].statistics`
pub fn decode_series(raw: &SonarrSeries) -> TvShow {
    let ids = MediaIds {
        manager_id: raw.id,
        tvdb_id: non_zero(raw.tvdb_id),
        imdb_id: non_empty(raw.imdb_id.clone()),
        ..MediaIds::default()
    };

    let mut item = MediaItem::new(raw.title.clone(), Availability::Sonarr).with_ids(ids);
    item.year = raw.year.filter(|y| *y > 0);
    item.added_date = real_date(raw.added);
    item.file_path = raw.path.clone();

    let stats = raw.seasons.iter().filter_map(|s| s.statistics.as_ref());
    let (episodes, size) = stats.fold((0u32, 0u64), |(episodes, size), s| {
        (episodes + s.episode_count, size + s.size_on_disk)
    });
    item.file_size = Some(size).filter(|s| *s > 0);

    TvShow {
        media: item,
        episode_count: Some(episodes).filter(|e| *e > 0),
        season_count: Some(raw.seasons.len() as u32).filter(|s| *s > 0),
    }
}

pub fn decode_episode(raw: &SonarrEpisode) -> ManagerEpisode {
    ManagerEpisode {
        id: raw.id,
        key: EpisodeKey::new(raw.season_number, raw.episode_number),
        title: raw.title.clone(),
        has_file: raw.has_file,
        monitored: raw.monitored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES_FIXTURE: &str = r#"[
        {
            "id": 3,
            "title": "Severance",
            "year": 2022,
            "tvdbId": 371980,
            "imdbId": "tt11280740",
            "added": "2024-02-10T08:30:00Z",
            "path": "/tv/Severance",
            "tags": [2],
            "seasons": [
                {"seasonNumber": 1, "monitored": true,
                 "statistics": {"episodeCount": 9, "totalEpisodeCount": 9, "sizeOnDisk": 9000}},
                {"seasonNumber": 2, "monitored": true,
                 "statistics": {"episodeCount": 4, "totalEpisodeCount": 10, "sizeOnDisk": 4000}}
            ]
        },
        {
            "title": "Lookup Result",
            "tvdbId": 0,
            "seasons": []
        }
    ]"#;

    #[test]
    fn test_decode_series_sums_statistics() {
        let raw: Vec<SonarrSeries> = serde_json::from_str(SERIES_FIXTURE).unwrap();
        let shows: Vec<TvShow> = raw.iter().map(decode_series).collect();

        let severance = &shows[0];
        assert_eq!(severance.media.availability, Availability::Sonarr);
        assert_eq!(severance.media.ids.manager_id, Some(3));
        assert_eq!(severance.media.ids.tvdb_id, Some(371980));
        assert_eq!(severance.media.file_size, Some(13000));
        assert_eq!(severance.episode_count, Some(13));
        assert_eq!(severance.season_count, Some(2));

        let lookup = &shows[1];
        assert_eq!(lookup.media.ids.manager_id, None);
        assert_eq!(lookup.media.ids.tvdb_id, None);
        assert_eq!(lookup.media.file_size, None);
        assert_eq!(lookup.episode_count, None);
        assert_eq!(lookup.season_count, None);
    }

    #[test]
    fn test_decode_episodes() {
        let raw: Vec<SonarrEpisode> = serde_json::from_str(
            r#"[
                {"id": 100, "seasonNumber": 1, "episodeNumber": 1, "title": "Good News About Hell",
                 "hasFile": true, "monitored": true},
                {"id": 101, "seasonNumber": 1, "episodeNumber": 2}
            ]"#,
        )
        .unwrap();
        let episodes: Vec<ManagerEpisode> = raw.iter().map(decode_episode).collect();
        assert_eq!(episodes[0].key, EpisodeKey::new(1, 1));
        assert!(episodes[0].has_file);
        assert!(!episodes[1].has_file);
        assert!(!episodes[1].monitored);
        assert_eq!(episodes[1].title, None);
    }

    #[test]
    fn test_search_command_shape() {
        let command = EpisodeSearchCommand {
            name: "EpisodeSearch",
            episode_ids: vec![100, 101],
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["name"], "EpisodeSearch");
        assert_eq!(json["episodeIds"][1], 101);
    }
}
