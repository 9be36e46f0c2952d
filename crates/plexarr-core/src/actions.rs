//! Mutations driven by a merged collection: adding Plex-only titles to a
//! manager, removing duplicate files, deleting titles.
//!
//! Every action works item by item. A failing item is recorded in the
//! [`ActionReport`] and the batch carries on.

use plexarr_models::{AsMedia, Movie};
use plexarr_sources::AcquisitionManager;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use crate::duplicates::{QualityWeights, Resolution};

/// Asks the user whether to go ahead with one item
pub type Confirm<'a> = &'a mut dyn FnMut(&str) -> bool;

#[derive(Debug, Clone, Copy, Default)]
pub struct ActionOptions {
    /// Report what would happen without touching anything
    pub dry_run: bool,
    /// Ask before each item
    pub confirm: bool,
    /// Pause between consecutive mutations
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    pub title: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    /// Items a dry run would have acted on
    pub planned: Vec<String>,
    pub succeeded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<ActionFailure>,
}

impl ActionReport {
    pub(crate) fn fail(&mut self, title: impl Into<String>, error: impl ToString) {
        let title = title.into();
        let error = error.to_string();
        warn!("{}: {}", title, error);
        self.failed.push(ActionFailure { title, error });
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Decide whether to act on `title`. Dry runs record it as planned.
pub(crate) fn approve(
    title: &str,
    prompt: &str,
    options: &ActionOptions,
    confirm: &mut Option<Confirm<'_>>,
    report: &mut ActionReport,
) -> bool {
    if options.dry_run {
        report.planned.push(title.to_string());
        return false;
    }
    if options.confirm {
        if let Some(ask) = confirm.as_mut() {
            if !ask(prompt) {
                report.skipped.push(title.to_string());
                return false;
            }
        }
    }
    true
}

/// Titles present only in Plex: the ones a sync would add to the manager
pub fn sync_candidates<T: AsMedia + Clone>(items: &[T]) -> Vec<T> {
    items
        .iter()
        .filter(|item| {
            let availability = item.media().availability;
            availability.in_plex() && !availability.in_manager()
        })
        .cloned()
        .collect()
}

/// Add every candidate to the manager with the given quality profile
pub async fn sync_missing<T: AsMedia>(
    manager: &dyn AcquisitionManager<T>,
    candidates: &[T],
    quality_profile_id: u32,
    options: &ActionOptions,
    mut confirm: Option<Confirm<'_>>,
) -> ActionReport {
    let mut report = ActionReport::default();
    let service = manager.source_name().to_string();

    for item in candidates {
        let title = label(item);
        let prompt = format!("Add '{}' to {}?", title, service);
        if !approve(&title, &prompt, options, &mut confirm, &mut report) {
            continue;
        }

        match manager.add_item(item, quality_profile_id).await {
            Ok(_) => {
                info!("Added '{}' to {}", title, service);
                report.succeeded.push(title);
            }
            Err(e) => report.fail(title, e),
        }
    }
    report
}

/// One title with more than one file in Radarr
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatePlan {
    pub title: String,
    pub movie_id: u32,
    #[serde(flatten)]
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanReport {
    pub plans: Vec<DuplicatePlan>,
    pub files: ActionReport,
}

/// Keep the best file of every Radarr movie that has several, delete the
/// rest
pub async fn clean_duplicates(
    radarr: &dyn AcquisitionManager<Movie>,
    movies: &[Movie],
    options: &ActionOptions,
    mut confirm: Option<Confirm<'_>>,
) -> CleanReport {
    let mut weights = QualityWeights::new();
    let mut report = CleanReport::default();

    for movie in movies {
        let Some(movie_id) = movie.media.ids.manager_id else {
            continue;
        };
        let title = label(movie);

        let files = match radarr.list_files(movie_id).await {
            Ok(files) => files,
            Err(e) => {
                report.files.fail(title, e);
                continue;
            }
        };
        if files.len() < 2 {
            continue;
        }

        weights.ensure(radarr, &files).await;
        let Some(resolution) = weights.resolve(files) else {
            continue;
        };
        debug!(
            "'{}': keeping {}, removing {} file(s)",
            title,
            resolution.keep.display_name(),
            resolution.remove.len()
        );
        report.plans.push(DuplicatePlan {
            title: title.clone(),
            movie_id,
            resolution: resolution.clone(),
        });

        for file in &resolution.remove {
            let name = format!("{}: {}", title, file.display_name());
            let prompt = format!("Delete {} (keeping {})?", name, resolution.keep.display_name());
            if !approve(&name, &prompt, options, &mut confirm, &mut report.files) {
                continue;
            }
            match radarr.delete_file(file.id).await {
                Ok(()) => {
                    info!("Deleted {}", name);
                    report.files.succeeded.push(name);
                }
                Err(e) => report.files.fail(name, e),
            }
        }
    }

    info!(
        "{} movie(s) with duplicate files, {} file(s) deleted",
        report.plans.len(),
        report.files.succeeded.len()
    );
    report
}

/// Delete items from the manager, pausing `options.delay` between
/// deletes. Items the manager does not hold are skipped.
pub async fn delete_items<T: AsMedia>(
    manager: &dyn AcquisitionManager<T>,
    items: &[T],
    delete_files: bool,
    options: &ActionOptions,
    mut confirm: Option<Confirm<'_>>,
) -> ActionReport {
    let mut report = ActionReport::default();
    let service = manager.source_name().to_string();
    let mut deleted_any = false;

    for item in items {
        let title = label(item);
        let media = item.media();
        let Some(id) = media.ids.manager_id.filter(|_| media.availability.in_manager()) else {
            debug!("'{}' is not in {}, skipping", title, service);
            report.skipped.push(title);
            continue;
        };
        let prompt = format!("Delete '{}' from {}?", title, service);
        if !approve(&title, &prompt, options, &mut confirm, &mut report) {
            continue;
        }

        if deleted_any && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
        deleted_any = true;

        match manager.delete_item(id, delete_files).await {
            Ok(()) => {
                info!("Deleted '{}' from {}", title, service);
                report.succeeded.push(title);
            }
            Err(e) => report.fail(title, e),
        }
    }
    report
}

/// Keep the items whose manager entry carries `tag` (case-insensitive).
/// Items not in the manager never match; lookup failures drop the item.
pub async fn filter_by_tag<T: AsMedia>(manager: &dyn AcquisitionManager<T>, items: Vec<T>, tag: &str) -> Vec<T> {
    let wanted = tag.to_lowercase();
    let mut kept = Vec::new();

    for item in items {
        let Some(id) = item.media().ids.manager_id else {
            continue;
        };
        let names = match manager.get_item_details(id).await {
            Ok(details) if details.tags.is_empty() => Vec::new(),
            Ok(details) => match manager.list_tag_names(&details.tags).await {
                Ok(names) => names,
                Err(e) => {
                    warn!("Failed to resolve tags of '{}': {}", item.media().title, e);
                    continue;
                }
            },
            Err(e) => {
                warn!("Failed to get details of '{}': {}", item.media().title, e);
                continue;
            }
        };
        if names.iter().any(|name| name.to_lowercase() == wanted) {
            kept.push(item);
        }
    }
    kept
}

fn label<T: AsMedia>(item: &T) -> String {
    let media = item.media();
    match media.year {
        Some(year) => format!("{} ({})", media.title, year),
        None => media.title.clone(),
    }
}
