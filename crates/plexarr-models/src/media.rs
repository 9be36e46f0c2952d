use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::media_ids::MediaIds;

/// Which catalog(s) currently hold a title.
///
/// `Both` means "in Plex and in the acquisition manager for this media
/// type". There is no separate state for "also in the watchlist"; that is
/// tracked by [`MediaItem::in_watchlist`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Plex,
    Radarr,
    Sonarr,
    Both,
}

impl Availability {
    pub fn label(&self) -> &'static str {
        match self {
            Availability::Plex => "Plex",
            Availability::Radarr => "Radarr",
            Availability::Sonarr => "Sonarr",
            Availability::Both => "Both",
        }
    }

    pub fn in_plex(&self) -> bool {
        matches!(self, Availability::Plex | Availability::Both)
    }

    pub fn in_manager(&self) -> bool {
        !matches!(self, Availability::Plex)
    }

    /// Presence after another catalog reported the same title.
    ///
    /// Never less present than `self`: two different catalogs make `Both`,
    /// and `Both` stays `Both`.
    pub fn combine(self, other: Availability) -> Availability {
        if self == other {
            self
        } else {
            Availability::Both
        }
    }

    /// Number of catalogs represented (1 or 2)
    pub fn presence(&self) -> u8 {
        match self {
            Availability::Both => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    #[default]
    NotWatched,
    InProgress,
    Watched,
}

impl WatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WatchStatus::NotWatched => "Not Watched",
            WatchStatus::InProgress => "In Progress",
            WatchStatus::Watched => "Watched",
        }
    }
}

/// One real-world title as seen by one catalog, or after merging, by all
/// of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub availability: Availability,
    pub watch_status: WatchStatus,
    /// Only meaningful when `watch_status` is `Watched`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_date: Option<DateTime<Utc>>,
    /// Only meaningful when `watch_status` is `InProgress`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_date: Option<DateTime<Utc>>,
    pub in_watchlist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub ids: MediaIds,
}

impl MediaItem {
    pub fn new(title: impl Into<String>, availability: Availability) -> Self {
        Self {
            title: title.into(),
            year: None,
            availability,
            watch_status: WatchStatus::NotWatched,
            watch_date: None,
            progress_date: None,
            added_date: None,
            in_watchlist: false,
            file_size: None,
            file_path: None,
            ids: MediaIds::default(),
        }
    }

    pub fn with_ids(mut self, ids: MediaIds) -> Self {
        self.ids = ids;
        self
    }

    /// The date that best describes the item: watched, then in progress,
    /// then added.
    pub fn relevant_date(&self) -> Option<DateTime<Utc>> {
        self.watch_date.or(self.progress_date).or(self.added_date)
    }

    /// Mark as watched at `date`, clearing any progress date
    pub fn set_watched(&mut self, date: Option<DateTime<Utc>>) {
        self.watch_status = WatchStatus::Watched;
        self.watch_date = date;
        self.progress_date = None;
    }

    /// Mark as in progress since `date`, clearing any watch date
    pub fn set_in_progress(&mut self, date: Option<DateTime<Utc>>) {
        self.watch_status = WatchStatus::InProgress;
        self.progress_date = date;
        self.watch_date = None;
    }
}

/// Shared access to the [`MediaItem`] part of movies and shows
pub trait AsMedia {
    fn media(&self) -> &MediaItem;
    fn media_mut(&mut self) -> &mut MediaItem;
}

impl AsMedia for MediaItem {
    fn media(&self) -> &MediaItem {
        self
    }

    fn media_mut(&mut self) -> &mut MediaItem {
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    #[serde(flatten)]
    pub media: MediaItem,
}

impl Movie {
    pub fn new(title: impl Into<String>, availability: Availability) -> Self {
        Self { media: MediaItem::new(title, availability) }
    }
}

impl AsMedia for Movie {
    fn media(&self) -> &MediaItem {
        &self.media
    }

    fn media_mut(&mut self) -> &mut MediaItem {
        &mut self.media
    }
}

/// A TV show. `file_size` on the inner item is the sum over all episode
/// files on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TvShow {
    #[serde(flatten)]
    pub media: MediaItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_count: Option<u32>,
}

impl TvShow {
    pub fn new(title: impl Into<String>, availability: Availability) -> Self {
        Self {
            media: MediaItem::new(title, availability),
            episode_count: None,
            season_count: None,
        }
    }
}

impl AsMedia for TvShow {
    fn media(&self) -> &MediaItem {
        &self.media
    }

    fn media_mut(&mut self) -> &mut MediaItem {
        &mut self.media
    }
}
