use chrono::Utc;
use color_eyre::Result;
use plexarr_core::{collect_shows, MediaFilter};
use plexarr_models::TvShow;
use plexarr_sources::PrimaryCatalog;
use serde_json::json;
use tracing::info;
use crate::commands::filters::FilterArgs;
use crate::commands::progress::Spinner;
use crate::commands::{tables, Services};
use crate::output::{format_size, Output};

pub async fn run_shows(
    services: &Services,
    filters: &FilterArgs,
    search: Option<&str>,
    output: &Output,
) -> Result<()> {
    let spinner = Spinner::start("Fetching shows from Plex and Sonarr...", output.is_human());
    let plex: &dyn PrimaryCatalog<TvShow> = &services.plex;
    let collected = collect_shows(Some(plex), services.sonarr_shows()).await;
    spinner.finish();

    let mut shows = collected.items;
    if let Some(needle) = search {
        shows = MediaFilter::new().title_contains(needle).apply(shows);
    }
    let now = Utc::now();
    let shows = filters.apply(shows, services.sonarr_shows(), now).await?;
    info!("{} show(s) after filtering", shows.len());

    if !output.is_human() {
        output.data(&json!({
            "counts": collected.counts,
            "shows": shows,
        }));
        return Ok(());
    }

    if shows.is_empty() {
        output.info("No shows match the given filters");
        return Ok(());
    }

    output.println(tables::show_table(&shows, now).to_string());
    let total: u64 = shows.iter().filter_map(|s| s.media.file_size).sum();
    output.info(format!("{} show(s), {} on disk", shows.len(), format_size(total)));
    Ok(())
}
