use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::media::WatchStatus;

/// A (season, episode) position. Orders by season, then episode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpisodeKey {
    pub season: u32,
    pub episode: u32,
}

impl EpisodeKey {
    pub fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

/// An episode as Plex reports it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeRecord {
    pub key: EpisodeKey,
    pub title: String,
    pub watch_status: WatchStatus,
    /// Last time the episode was played, fully or partially
    pub last_viewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_key: Option<String>,
}

/// An episode the next-episode finder believes should be fetched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeRef {
    pub key: EpisodeKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Sonarr episode id, when Sonarr knows the episode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_episode_id: Option<u32>,
    /// Sonarr already has a file for it (downloaded, not yet in Plex)
    pub has_file: bool,
}

/// An episode as Sonarr reports it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagerEpisode {
    pub id: u32,
    pub key: EpisodeKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub has_file: bool,
    pub monitored: bool,
}
