pub mod episode;
pub mod manager;
pub mod media;
pub mod media_ids;

pub use episode::{EpisodeKey, EpisodeRecord, EpisodeRef, ManagerEpisode};
pub use manager::{FileVariant, QualityProfile, RootFolder};
pub use media::{AsMedia, Availability, MediaItem, Movie, TvShow, WatchStatus};
pub use media_ids::MediaIds;
