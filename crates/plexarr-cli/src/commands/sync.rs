use color_eyre::eyre::eyre;
use color_eyre::Result;
use plexarr_core::{collect_movies, collect_shows, sync_candidates, sync_missing, ActionOptions, ActionReport, Confirm};
use plexarr_models::{AsMedia, Movie, TvShow};
use plexarr_sources::{AcquisitionManager, PrimaryCatalog};
use tracing::{debug, info};
use crate::commands::progress::Spinner;
use crate::commands::{finish_report, prompts, Services};
use crate::output::Output;

/// Add every Plex-only title to Radarr (or Sonarr with `shows`)
pub async fn run_sync(
    services: &Services,
    shows: bool,
    quality_profile_id: u32,
    dry_run: bool,
    confirm: bool,
    output: &Output,
) -> Result<()> {
    let options = ActionOptions {
        dry_run,
        confirm,
        ..Default::default()
    };

    let report = if shows {
        let sonarr = services
            .sonarr_shows()
            .ok_or_else(|| eyre!("Sonarr is not configured. Add a [sonarr] section to your config"))?;
        let spinner = Spinner::start("Fetching shows from Plex and Sonarr...", output.is_human());
        let plex: &dyn PrimaryCatalog<TvShow> = &services.plex;
        let collected = collect_shows(Some(plex), Some(sonarr)).await;
        spinner.finish();
        sync_to(sonarr, &collected.items, quality_profile_id, &options, output).await?
    } else {
        let radarr = services.require_radarr()?;
        let spinner = Spinner::start("Fetching movies from Plex and Radarr...", output.is_human());
        let plex: &dyn PrimaryCatalog<Movie> = &services.plex;
        let collected = collect_movies(Some(plex), Some(radarr)).await;
        spinner.finish();
        sync_to(radarr, &collected.items, quality_profile_id, &options, output).await?
    };

    finish_report(output, "add", &report)
}

async fn sync_to<T: AsMedia + Clone>(
    manager: &dyn AcquisitionManager<T>,
    items: &[T],
    quality_profile_id: u32,
    options: &ActionOptions,
    output: &Output,
) -> Result<ActionReport> {
    let service = manager.source_name();
    check_quality_profile(manager, quality_profile_id).await?;

    let candidates = sync_candidates(items);
    info!("{} title(s) in Plex but not in {}", candidates.len(), service);
    if candidates.is_empty() {
        output.success(format!("Everything in Plex is already in {}", service));
        return Ok(ActionReport::default());
    }

    let mut ask = prompts::confirm_each();
    let confirm: Option<Confirm<'_>> = if options.confirm { Some(&mut ask) } else { None };
    Ok(sync_missing(manager, &candidates, quality_profile_id, options, confirm).await)
}

async fn check_quality_profile<T>(manager: &dyn AcquisitionManager<T>, quality_profile_id: u32) -> Result<()> {
    let profiles = manager.list_quality_profiles().await?;
    if profiles.iter().any(|p| p.id == quality_profile_id) {
        return Ok(());
    }
    debug!("Known quality profiles: {:?}", profiles);
    Err(eyre!(
        "{} has no quality profile with id {}. Run `plexarr profiles` to list them",
        manager.source_name(),
        quality_profile_id
    ))
}
