use plexarr_sources::SourceError;
use thiserror::Error;

/// Failures of the workflows that drive Plex, Radarr and Sonarr.
///
/// The merge, resolve and gap-finding engines never fail; only the steps
/// that talk to a service do.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The item lacks the id the operation keys on
    #[error("'{title}' has no {needed}")]
    MissingIdentifier { title: String, needed: &'static str },

    /// The show is not in Sonarr and no quality profile was given to add it
    #[error("'{0}' is not in Sonarr; pass a quality profile to add it")]
    NotInManager(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
