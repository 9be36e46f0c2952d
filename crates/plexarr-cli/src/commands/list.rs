use chrono::Utc;
use color_eyre::Result;
use plexarr_core::collect_movies;
use plexarr_models::Movie;
use plexarr_sources::PrimaryCatalog;
use serde_json::json;
use tracing::info;
use crate::commands::filters::FilterArgs;
use crate::commands::progress::Spinner;
use crate::commands::{tables, Services};
use crate::output::{format_size, Output};

pub async fn run_list(services: &Services, filters: &FilterArgs, output: &Output) -> Result<()> {
    let spinner = Spinner::start("Fetching movies from Plex and Radarr...", output.is_human());
    let plex: &dyn PrimaryCatalog<Movie> = &services.plex;
    let collected = collect_movies(Some(plex), services.radarr()).await;
    spinner.finish();

    let now = Utc::now();
    let movies = filters.apply(collected.items, services.radarr(), now).await?;
    info!("{} movie(s) after filtering", movies.len());

    if !output.is_human() {
        output.data(&json!({
            "counts": collected.counts,
            "movies": movies,
        }));
        return Ok(());
    }

    if movies.is_empty() {
        output.info("No movies match the given filters");
        return Ok(());
    }

    output.println(tables::movie_table(&movies, now).to_string());
    let total: u64 = movies.iter().filter_map(|m| m.media.file_size).sum();
    output.info(format!("{} movie(s), {} on disk", movies.len(), format_size(total)));
    Ok(())
}
