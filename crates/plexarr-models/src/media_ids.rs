use serde::{Deserialize, Serialize};

/// Identifiers a title carries across Plex, the acquisition managers and
/// the external metadata databases.
///
/// Every field is optional: Plex only knows the GUIDs the agent matched,
/// the managers know their own id plus whatever external ids they were
/// added with, and watchlist entries often carry nothing but a title.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MediaIds {
    /// Plex `ratingKey`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plex_rating_key: Option<String>,
    /// Radarr movie id or Sonarr series id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tvdb_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

impl MediaIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge IDs from another source, keeping all available IDs
    ///
    /// Only fills in `None` values. Existing values are never overwritten,
    /// so an id attached by an earlier pass survives every later one.
    pub fn merge(&mut self, other: &MediaIds) {
        if self.plex_rating_key.is_none() {
            self.plex_rating_key = other.plex_rating_key.clone();
        }
        if self.manager_id.is_none() {
            self.manager_id = other.manager_id;
        }
        if self.tmdb_id.is_none() {
            self.tmdb_id = other.tmdb_id;
        }
        if self.tvdb_id.is_none() {
            self.tvdb_id = other.tvdb_id;
        }
        if self.imdb_id.is_none() {
            self.imdb_id = other.imdb_id.clone();
        }
    }

    /// Check if all ID fields are empty
    pub fn is_empty(&self) -> bool {
        self.plex_rating_key.is_none()
            && self.manager_id.is_none()
            && self.tmdb_id.is_none()
            && self.tvdb_id.is_none()
            && self.imdb_id.is_none()
    }

    /// True when an external database id (TMDB, TVDB or IMDb) is present
    pub fn has_external_id(&self) -> bool {
        self.tmdb_id.is_some() || self.tvdb_id.is_some() || self.imdb_id.is_some()
    }

    /// Short human label of the best external id, e.g. `tmdb:603`
    pub fn describe(&self) -> Option<String> {
        self.tmdb_id
            .map(|id| format!("tmdb:{}", id))
            .or_else(|| self.tvdb_id.map(|id| format!("tvdb:{}", id)))
            .or_else(|| self.imdb_id.as_ref().map(|id| format!("imdb:{}", id)))
    }
}
