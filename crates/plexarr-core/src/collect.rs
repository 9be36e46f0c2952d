//! Fetching the three batches and merging them.
//!
//! A service that fails is logged and treated as empty for this run, so
//! one unreachable server never hides what the others report.

use plexarr_models::{Movie, TvShow};
use plexarr_sources::{AcquisitionManager, PrimaryCatalog, SourceError};
use serde::Serialize;
use std::future::Future;
use tracing::{info, warn};
use crate::merge::{merge_movies, merge_shows};

/// How many records each batch contributed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub plex: usize,
    pub manager: usize,
    pub watchlist: usize,
    pub merged: usize,
}

#[derive(Debug, Clone)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub counts: BatchCounts,
}

async fn fetch_or_empty<T, F>(source: &str, what: &str, fetch: F) -> Vec<T>
where
    F: Future<Output = Result<Vec<T>, SourceError>>,
{
    match fetch.await {
        Ok(items) => items,
        Err(e) => {
            warn!("Failed to fetch {} from {}, continuing without it: {}", what, source, e);
            Vec::new()
        }
    }
}

struct Batches<T> {
    primary: Vec<T>,
    acquisition: Vec<T>,
    watchlist: Vec<T>,
}

async fn fetch_batches<T>(
    plex: Option<&dyn PrimaryCatalog<T>>,
    manager: Option<&dyn AcquisitionManager<T>>,
    what: &str,
) -> Batches<T> {
    let (primary, watchlist) = match plex {
        Some(plex) => (
            fetch_or_empty(plex.source_name(), what, plex.list_items()).await,
            fetch_or_empty(plex.source_name(), "watchlist", plex.list_watchlist()).await,
        ),
        None => (Vec::new(), Vec::new()),
    };
    let acquisition = match manager {
        Some(manager) => fetch_or_empty(manager.source_name(), what, manager.list_items()).await,
        None => Vec::new(),
    };
    Batches {
        primary,
        acquisition,
        watchlist,
    }
}

fn finish<T>(batches: Batches<T>, merge: fn(Vec<T>, Vec<T>, Vec<T>) -> Vec<T>, what: &str) -> Collected<T> {
    let mut counts = BatchCounts {
        plex: batches.primary.len(),
        manager: batches.acquisition.len(),
        watchlist: batches.watchlist.len(),
        merged: 0,
    };
    let items = merge(batches.primary, batches.acquisition, batches.watchlist);
    counts.merged = items.len();

    info!(
        "Merged {} {} (Plex: {}, manager: {}, watchlist: {})",
        counts.merged, what, counts.plex, counts.manager, counts.watchlist
    );
    Collected { items, counts }
}

/// Movies from Plex, Radarr and the Plex watchlist, merged
pub async fn collect_movies(
    plex: Option<&dyn PrimaryCatalog<Movie>>,
    radarr: Option<&dyn AcquisitionManager<Movie>>,
) -> Collected<Movie> {
    let batches = fetch_batches(plex, radarr, "movies").await;
    finish(batches, merge_movies, "movies")
}

/// Shows from Plex, Sonarr and the Plex watchlist, merged
pub async fn collect_shows(
    plex: Option<&dyn PrimaryCatalog<TvShow>>,
    sonarr: Option<&dyn AcquisitionManager<TvShow>>,
) -> Collected<TvShow> {
    let batches = fetch_batches(plex, sonarr, "shows").await;
    finish(batches, merge_shows, "shows")
}
