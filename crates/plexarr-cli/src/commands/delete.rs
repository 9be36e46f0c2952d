use chrono::Utc;
use color_eyre::Result;
use plexarr_core::{collect_movies, delete_items, ActionOptions, Confirm};
use plexarr_models::Movie;
use plexarr_sources::PrimaryCatalog;
use std::time::Duration;
use tracing::info;
use crate::commands::filters::FilterArgs;
use crate::commands::progress::Spinner;
use crate::commands::{finish_report, prompts, tables, Services};
use crate::output::Output;

/// Delete the movies matching `filters` from Radarr. Nothing is deleted
/// unless `execute` is set.
pub async fn run_delete(
    services: &Services,
    filters: &FilterArgs,
    execute: bool,
    confirm: bool,
    keep_files: bool,
    output: &Output,
) -> Result<()> {
    let radarr = services.require_radarr()?;

    let spinner = Spinner::start("Fetching movies from Plex and Radarr...", output.is_human());
    let plex: &dyn PrimaryCatalog<Movie> = &services.plex;
    let collected = collect_movies(Some(plex), Some(radarr)).await;
    spinner.finish();

    let now = Utc::now();
    let movies = filters.apply(collected.items, Some(radarr), now).await?;
    let targets: Vec<Movie> = movies
        .into_iter()
        .filter(|m| m.media.ids.manager_id.is_some())
        .collect();
    info!("{} movie(s) in Radarr match the filters", targets.len());

    if targets.is_empty() {
        output.info("No movies in Radarr match the given filters");
        return Ok(());
    }
    output.println(tables::movie_table(&targets, now).to_string());

    let options = ActionOptions {
        dry_run: !execute,
        confirm,
        delay: Duration::from_millis(services.config.actions.delete_delay_ms),
    };
    let mut ask = prompts::confirm_each();
    let ask: Option<Confirm<'_>> = if confirm && execute { Some(&mut ask) } else { None };
    let report = delete_items(radarr, &targets, !keep_files, &options, ask).await;

    if !execute {
        output.info("Pass --execute to delete these movies");
    }
    finish_report(output, "delete", &report)
}
