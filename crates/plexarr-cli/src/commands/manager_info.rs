use color_eyre::eyre::eyre;
use color_eyre::Result;
use plexarr_models::{Movie, TvShow};
use plexarr_sources::AcquisitionManager;
use crate::commands::{tables, Services};
use crate::output::Output;

/// Radarr, or Sonarr with `--sonarr`
#[derive(Clone, Copy)]
enum Manager<'a> {
    Radarr(&'a dyn AcquisitionManager<Movie>),
    Sonarr(&'a dyn AcquisitionManager<TvShow>),
}

impl<'a> Manager<'a> {
    fn pick(services: &'a Services, sonarr: bool) -> Result<Self> {
        if sonarr {
            services
                .sonarr_shows()
                .map(Manager::Sonarr)
                .ok_or_else(|| eyre!("Sonarr is not configured. Add a [sonarr] section to your config"))
        } else {
            services.require_radarr().map(Manager::Radarr)
        }
    }

    fn name(&self) -> &str {
        match self {
            Manager::Radarr(m) => m.source_name(),
            Manager::Sonarr(m) => m.source_name(),
        }
    }
}

pub async fn run_profiles(services: &Services, sonarr: bool, output: &Output) -> Result<()> {
    let manager = Manager::pick(services, sonarr)?;
    let profiles = match manager {
        Manager::Radarr(m) => m.list_quality_profiles().await?,
        Manager::Sonarr(m) => m.list_quality_profiles().await?,
    };

    if !output.is_human() {
        output.data(&profiles);
    } else if profiles.is_empty() {
        output.warn(format!("{} has no quality profiles", manager.name()));
    } else {
        output.println(tables::quality_profile_table(&profiles).to_string());
    }
    Ok(())
}

pub async fn run_folders(services: &Services, sonarr: bool, output: &Output) -> Result<()> {
    let manager = Manager::pick(services, sonarr)?;
    let folders = match manager {
        Manager::Radarr(m) => m.list_root_folders().await?,
        Manager::Sonarr(m) => m.list_root_folders().await?,
    };

    if !output.is_human() {
        output.data(&folders);
    } else if folders.is_empty() {
        output.warn(format!("{} has no root folders; adding titles will fail", manager.name()));
    } else {
        output.println(tables::root_folder_table(&folders).to_string());
    }
    Ok(())
}
