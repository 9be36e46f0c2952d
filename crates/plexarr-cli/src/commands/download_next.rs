use color_eyre::eyre::eyre;
use color_eyre::Result;
use plexarr_core::{
    collect_shows, plan_next_episodes, request_downloads, ActionFailure, ActionOptions, ActionReport, EpisodePlan,
};
use plexarr_models::{TvShow, WatchStatus};
use plexarr_sources::{EpisodeCatalog, PrimaryCatalog};
use serde_json::json;
use tracing::{info, warn};
use crate::commands::progress::Spinner;
use crate::commands::{finish_report, tables, Services};
use crate::output::Output;

/// Shows to plan for: the one with Plex rating key `show_id`, or every
/// show in progress
fn select_shows(shows: Vec<TvShow>, show_id: Option<&str>) -> Result<Vec<TvShow>> {
    match show_id {
        Some(id) => {
            let show = shows
                .into_iter()
                .find(|s| s.media.ids.plex_rating_key.as_deref() == Some(id))
                .ok_or_else(|| eyre!("No show in Plex with rating key {}", id))?;
            Ok(vec![show])
        }
        None => Ok(shows
            .into_iter()
            .filter(|s| s.media.watch_status == WatchStatus::InProgress && s.media.ids.plex_rating_key.is_some())
            .collect()),
    }
}

/// Find the next `count` unwatched episodes missing from Plex and, with
/// `confirm`, ask Sonarr to search for them
pub async fn run_download_next(
    services: &Services,
    show_id: Option<&str>,
    count: usize,
    quality_profile_id: Option<u32>,
    confirm: bool,
    output: &Output,
) -> Result<()> {
    let sonarr = services.sonarr();
    if confirm && sonarr.is_none() {
        return Err(eyre!("Sonarr is not configured. Add a [sonarr] section to your config"));
    }

    let spinner = Spinner::start("Fetching shows from Plex and Sonarr...", output.is_human());
    let plex_shows: &dyn PrimaryCatalog<TvShow> = &services.plex;
    let collected = collect_shows(Some(plex_shows), services.sonarr_shows()).await;
    let shows = select_shows(collected.items, show_id)?;

    let plex_episodes: &dyn EpisodeCatalog = &services.plex;
    let mut plans = Vec::new();
    for show in &shows {
        spinner.set_message(format!("Checking episodes of {}...", show.media.title));
        match plan_next_episodes(plex_episodes, sonarr, show, count).await {
            Ok(plan) if plan.gaps.is_empty() => info!("'{}' has nothing missing", plan.title),
            Ok(plan) => plans.push((show, plan)),
            Err(e) => warn!("Skipping '{}': {}", show.media.title, e),
        }
    }
    spinner.finish();

    let plan_list: Vec<&EpisodePlan> = plans.iter().map(|(_, plan)| plan).collect();
    if plans.is_empty() {
        output.success("No missing episodes found");
        return Ok(());
    }

    let Some(sonarr) = sonarr.filter(|_| confirm) else {
        if output.is_human() {
            output.println(tables::episode_plan_table(plan_list).to_string());
            output.info("Pass --confirm to request these episodes from Sonarr");
        } else {
            output.data(&json!({ "plans": plan_list }));
        }
        return Ok(());
    };

    let options = ActionOptions::default();
    let mut report = ActionReport::default();
    for (show, plan) in &plans {
        match request_downloads(sonarr, show, plan, quality_profile_id, &options, None).await {
            Ok(show_report) => {
                report.succeeded.extend(show_report.succeeded);
                report.skipped.extend(show_report.skipped);
                report.failed.extend(show_report.failed);
            }
            Err(e) => report.failed.push(ActionFailure {
                title: plan.title.clone(),
                error: e.to_string(),
            }),
        }
    }
    finish_report(output, "search", &report)
}
