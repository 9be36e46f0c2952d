pub mod arr;
pub mod error;
pub mod plex;
pub mod radarr;
pub mod sonarr;
pub mod traits;

pub use error::SourceError;
pub use plex::PlexClient;
pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;
pub use traits::{AcquisitionManager, EpisodeCatalog, EpisodeManager, ItemDetails, PrimaryCatalog};
