pub mod clean;
pub mod config;
pub mod delete;
pub mod download_next;
pub mod filters;
pub mod list;
pub mod manager_info;
pub mod progress;
pub mod prompts;
pub mod shows;
pub mod sync;
pub mod tables;

use crate::output::Output;
use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use plexarr_config::{Config, PathManager};
use plexarr_core::ActionReport;
use plexarr_models::{Movie, TvShow};
use plexarr_sources::{AcquisitionManager, EpisodeManager, PlexClient, RadarrClient, SonarrClient};
use std::path::Path;
use tracing::debug;

/// Find, parse and validate the configuration
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path_manager = PathManager::new().map_err(|e| eyre!("{}", e))?;
    let path = path_manager.find_config_file(explicit).map_err(|e| eyre!("{}", e))?;
    debug!("Loading config from {}", path.display());

    let config = Config::load_from_file(&path)
        .map_err(|e| eyre!("{}", e))
        .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?;
    config
        .validate()
        .map_err(|e| eyre!("Invalid configuration in {}: {}", path.display(), e))?;
    Ok(config)
}

/// Clients for every configured service
pub struct Services {
    pub config: Config,
    pub plex: PlexClient,
    radarr: Option<RadarrClient>,
    sonarr: Option<SonarrClient>,
}

impl Services {
    pub fn connect(config: Config) -> Result<Self> {
        let plex = PlexClient::new(&config.plex)?;
        let radarr = config.radarr.as_ref().map(RadarrClient::new).transpose()?;
        let sonarr = config.sonarr.as_ref().map(SonarrClient::new).transpose()?;
        debug!("Configured services: {}", config.get_configured_services().join(", "));
        Ok(Self {
            config,
            plex,
            radarr,
            sonarr,
        })
    }

    pub fn radarr(&self) -> Option<&dyn AcquisitionManager<Movie>> {
        self.radarr.as_ref().map(|r| r as &dyn AcquisitionManager<Movie>)
    }

    pub fn sonarr(&self) -> Option<&dyn EpisodeManager> {
        self.sonarr.as_ref().map(|s| s as &dyn EpisodeManager)
    }

    pub fn sonarr_shows(&self) -> Option<&dyn AcquisitionManager<TvShow>> {
        self.sonarr.as_ref().map(|s| s as &dyn AcquisitionManager<TvShow>)
    }

    pub fn require_radarr(&self) -> Result<&dyn AcquisitionManager<Movie>> {
        self.radarr()
            .ok_or_else(|| eyre!("Radarr is not configured. Add a [radarr] section to your config"))
    }

    pub fn require_sonarr(&self) -> Result<&dyn EpisodeManager> {
        self.sonarr()
            .ok_or_else(|| eyre!("Sonarr is not configured. Add a [sonarr] section to your config"))
    }
}

/// Print what an action did, then fail if any item failed
pub fn finish_report(output: &Output, verb: &str, report: &ActionReport) -> Result<()> {
    if output.is_human() {
        for title in &report.planned {
            output.info(format!("Would {}: {}", verb, title));
        }
        for title in &report.succeeded {
            output.success(title);
        }
        for title in &report.skipped {
            output.warn(format!("Skipped: {}", title));
        }
        for failure in &report.failed {
            output.error(format!("{}: {}", failure.title, failure.error));
        }
        if !report.planned.is_empty() {
            output.info(format!("Dry run: {} item(s) planned, nothing changed", report.planned.len()));
        }
    } else {
        output.data(report);
    }

    if report.has_failures() {
        return Err(eyre!(
            "{} of {} item(s) failed",
            report.failed.len(),
            report.failed.len() + report.succeeded.len()
        ));
    }
    Ok(())
}
