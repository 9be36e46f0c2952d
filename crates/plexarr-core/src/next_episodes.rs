//! Planning and requesting the next episodes of shows in progress.

use plexarr_models::{EpisodeKey, EpisodeRef, ManagerEpisode, TvShow};
use plexarr_sources::{EpisodeCatalog, EpisodeManager};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use crate::actions::{approve, ActionOptions, ActionReport, Confirm};
use crate::error::{CoreError, Result};
use crate::gaps::{find_gaps, season_lengths, ShowProgress};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodePlan {
    pub title: String,
    /// Where the viewer is; `None` when nothing has been watched
    pub reference: Option<EpisodeKey>,
    pub gaps: Vec<EpisodeRef>,
}

/// Work out the next `count` episodes of `show` missing from Plex.
///
/// Season lengths come from Sonarr's episode list when the show is there;
/// a Sonarr failure only costs that knowledge.
pub async fn plan_next_episodes(
    plex: &dyn EpisodeCatalog,
    sonarr: Option<&dyn EpisodeManager>,
    show: &TvShow,
    count: usize,
) -> Result<EpisodePlan> {
    let title = show.media.title.clone();
    let rating_key = show
        .media
        .ids
        .plex_rating_key
        .as_deref()
        .ok_or_else(|| CoreError::MissingIdentifier {
            title: title.clone(),
            needed: "Plex rating key",
        })?;

    let episodes = plex.list_episodes(rating_key).await?;
    let progress = ShowProgress::from_episodes(&episodes);

    let manager_episodes = match (sonarr, show.media.ids.manager_id) {
        (Some(sonarr), Some(series_id)) => match sonarr.get_episodes(series_id).await {
            Ok(episodes) => episodes,
            Err(e) => {
                warn!("Could not get Sonarr episodes of '{}', guessing season lengths: {}", title, e);
                Vec::new()
            }
        },
        _ => Vec::new(),
    };
    let lengths = (!manager_episodes.is_empty()).then(|| season_lengths(manager_episodes.iter().map(|e| e.key)));

    let gaps: Vec<EpisodeRef> = find_gaps(&progress, lengths.as_ref(), count)
        .into_iter()
        .map(|key| {
            let known = manager_episodes.iter().find(|e| e.key == key);
            EpisodeRef {
                key,
                title: known.and_then(|e| e.title.clone()),
                manager_episode_id: known.map(|e| e.id),
                has_file: known.is_some_and(|e| e.has_file),
            }
        })
        .collect();

    match progress.reference {
        Some(reference) => info!("'{}': at {}, {} episode(s) to fetch", title, reference, gaps.len()),
        None => debug!("'{}': nothing watched yet", title),
    }
    Ok(EpisodePlan {
        title,
        reference: progress.reference,
        gaps,
    })
}

/// The show as Sonarr knows it: by Sonarr id, TVDB id, then title. Adds
/// it with `quality_profile_id` when Sonarr does not have it.
async fn find_or_add_series(
    sonarr: &dyn EpisodeManager,
    show: &TvShow,
    quality_profile_id: Option<u32>,
) -> Result<u32> {
    if let Some(id) = show.media.ids.manager_id {
        return Ok(id);
    }

    let mut found = match show.media.ids.tvdb_id {
        Some(tvdb_id) => sonarr.find_show_by_external_id(tvdb_id).await?,
        None => None,
    };
    if found.is_none() {
        found = sonarr.find_show_by_title(&show.media.title).await?;
    }

    let series = match (found, quality_profile_id) {
        (Some(series), _) => series,
        (None, Some(profile)) => {
            info!("Adding '{}' to Sonarr", show.media.title);
            sonarr.add_item(show, profile).await?
        }
        (None, None) => return Err(CoreError::NotInManager(show.media.title.clone())),
    };
    series.media.ids.manager_id.ok_or_else(|| CoreError::MissingIdentifier {
        title: series.media.title.clone(),
        needed: "Sonarr id",
    })
}

/// The Sonarr episode to search for a gap. A gap Sonarr does not list
/// falls back to the first episode of the following season.
fn target_episode<'a>(episodes: &'a [ManagerEpisode], gap: EpisodeKey) -> Option<&'a ManagerEpisode> {
    episodes.iter().find(|e| e.key == gap).or_else(|| {
        episodes
            .iter()
            .filter(|e| e.key.season == gap.season + 1)
            .min_by_key(|e| e.key.episode)
    })
}

/// Ask Sonarr to search for every planned episode that has no file yet,
/// monitoring it first if needed
pub async fn request_downloads(
    sonarr: &dyn EpisodeManager,
    show: &TvShow,
    plan: &EpisodePlan,
    quality_profile_id: Option<u32>,
    options: &ActionOptions,
    mut confirm: Option<Confirm<'_>>,
) -> Result<ActionReport> {
    let mut report = ActionReport::default();
    if plan.gaps.is_empty() {
        return Ok(report);
    }
    if options.dry_run {
        report.planned = plan.gaps.iter().map(|g| format!("{} {}", plan.title, g.key)).collect();
        return Ok(report);
    }

    let series_id = find_or_add_series(sonarr, show, quality_profile_id).await?;
    let episodes = sonarr.get_episodes(series_id).await?;

    let mut chosen = HashSet::new();
    let mut search = Vec::new();
    let mut searched = Vec::new();

    for gap in &plan.gaps {
        let Some(episode) = target_episode(&episodes, gap.key) else {
            report.skipped.push(format!("{} {} (not in Sonarr)", plan.title, gap.key));
            continue;
        };
        let label = format!("{} {}", plan.title, episode.key);
        if !chosen.insert(episode.id) {
            continue;
        }
        if episode.has_file {
            debug!("{} already has a file", label);
            report.skipped.push(label);
            continue;
        }
        if !approve(&label, &format!("Search for {}?", label), options, &mut confirm, &mut report) {
            continue;
        }
        if !episode.monitored {
            if let Err(e) = sonarr.set_episode_monitored(episode.id, true).await {
                report.fail(label, e);
                continue;
            }
        }
        search.push(episode.id);
        searched.push(label);
    }

    if !search.is_empty() {
        match sonarr.request_episode_search(&search).await {
            Ok(()) => report.succeeded.extend(searched),
            Err(e) => {
                let error = e.to_string();
                for label in searched {
                    report.fail(label, &error);
                }
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEpisodes, FakeManager};
    use chrono::{TimeZone, Utc};
    use plexarr_models::{Availability, EpisodeRecord, WatchStatus};

    fn plex_episode(season: u32, episode: u32, watched: bool) -> EpisodeRecord {
        EpisodeRecord {
            key: EpisodeKey::new(season, episode),
            title: format!("Episode {}", episode),
            watch_status: if watched {
                WatchStatus::Watched
            } else {
                WatchStatus::NotWatched
            },
            last_viewed_at: watched.then(|| Utc.with_ymd_and_hms(2024, 5, episode, 21, 0, 0).unwrap()),
            rating_key: None,
        }
    }

    fn sonarr_episode(id: u32, season: u32, episode: u32) -> ManagerEpisode {
        ManagerEpisode {
            id,
            key: EpisodeKey::new(season, episode),
            title: Some(format!("S{}E{}", season, episode)),
            has_file: false,
            monitored: true,
        }
    }

    fn dark(manager_id: Option<u32>) -> TvShow {
        let mut show = TvShow::new("Dark", Availability::Both);
        show.media.ids.plex_rating_key = Some("42".to_string());
        show.media.ids.tvdb_id = Some(334824);
        show.media.ids.manager_id = manager_id;
        show
    }

    /// Plex holds S01E01..E10 with E01..E08 watched
    fn plex_library() -> FakeEpisodes {
        let mut plex = FakeEpisodes::default();
        plex.by_show.insert(
            "42".to_string(),
            (1..=10).map(|e| plex_episode(1, e, e <= 8)).collect(),
        );
        plex
    }

    /// Sonarr lists S01E01..E10 (ids 101..) and S02E01..E05 (ids 201..)
    fn sonarr_with_dark() -> FakeManager<TvShow> {
        let mut sonarr = FakeManager::new("Sonarr").with_items(vec![dark(Some(5))]);
        let mut episodes: Vec<ManagerEpisode> = (1..=10).map(|e| sonarr_episode(100 + e, 1, e)).collect();
        episodes.extend((1..=5).map(|e| sonarr_episode(200 + e, 2, e)));
        sonarr.episodes.insert(5, episodes);
        sonarr
    }

    fn keys(plan: &EpisodePlan) -> Vec<EpisodeKey> {
        plan.gaps.iter().map(|g| g.key).collect()
    }

    #[tokio::test]
    async fn test_plan_crosses_into_next_season() {
        let plex = plex_library();
        let sonarr = sonarr_with_dark();

        let plan = plan_next_episodes(&plex, Some(&sonarr), &dark(Some(5)), 3).await.unwrap();

        assert_eq!(plan.reference, Some(EpisodeKey::new(1, 8)));
        assert_eq!(keys(&plan), vec![EpisodeKey::new(2, 1), EpisodeKey::new(2, 2), EpisodeKey::new(2, 3)]);
        assert_eq!(plan.gaps[0].manager_episode_id, Some(201));
        assert_eq!(plan.gaps[0].title.as_deref(), Some("S2E1"));
    }

    #[tokio::test]
    async fn test_plan_without_sonarr_still_guesses() {
        let plex = plex_library();

        let plan = plan_next_episodes(&plex, None, &dark(None), 2).await.unwrap();

        assert_eq!(keys(&plan), vec![EpisodeKey::new(1, 11), EpisodeKey::new(1, 12)]);
        assert!(plan.gaps.iter().all(|g| g.manager_episode_id.is_none()));
    }

    #[tokio::test]
    async fn test_plan_needs_a_rating_key() {
        let plex = plex_library();
        let mut show = dark(None);
        show.media.ids.plex_rating_key = None;

        let err = plan_next_episodes(&plex, None, &show, 2).await.unwrap_err();
        assert!(matches!(err, CoreError::MissingIdentifier { .. }));
    }

    #[tokio::test]
    async fn test_request_monitors_and_skips_downloaded() {
        let mut sonarr = sonarr_with_dark();
        if let Some(episodes) = sonarr.episodes.get_mut(&5) {
            episodes[10].has_file = true; // S02E01
            episodes[11].monitored = false; // S02E02
        }
        let plex = plex_library();
        let show = dark(Some(5));
        let plan = plan_next_episodes(&plex, Some(&sonarr), &show, 3).await.unwrap();

        let report = request_downloads(&sonarr, &show, &plan, None, &ActionOptions::default(), None)
            .await
            .unwrap();

        assert_eq!(report.skipped, vec!["Dark S02E01".to_string()]);
        assert_eq!(report.succeeded, vec!["Dark S02E02".to_string(), "Dark S02E03".to_string()]);
        assert_eq!(
            sonarr.calls(),
            vec!["monitor:202:true".to_string(), "search:202,203".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unlisted_gap_falls_back_to_next_season() {
        let sonarr = sonarr_with_dark();
        let show = dark(Some(5));
        let plan = EpisodePlan {
            title: "Dark".to_string(),
            reference: Some(EpisodeKey::new(1, 10)),
            gaps: vec![EpisodeRef {
                key: EpisodeKey::new(1, 11),
                title: None,
                manager_episode_id: None,
                has_file: false,
            }],
        };

        let report = request_downloads(&sonarr, &show, &plan, None, &ActionOptions::default(), None)
            .await
            .unwrap();

        assert_eq!(report.succeeded, vec!["Dark S02E01".to_string()]);
        assert_eq!(sonarr.calls(), vec!["search:201".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_show_is_added_or_rejected() {
        let sonarr = FakeManager::<TvShow>::new("Sonarr");
        let show = dark(None);
        let plan = plan_next_episodes(&plex_library(), None, &show, 1).await.unwrap();

        let err = request_downloads(&sonarr, &show, &plan, None, &ActionOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotInManager(_)));

        let report = request_downloads(&sonarr, &show, &plan, Some(3), &ActionOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(sonarr.calls(), vec!["add:Dark:3".to_string()]);
        // Sonarr lists no episodes right after the add
        assert_eq!(report.skipped.len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_only_plans() {
        let sonarr = sonarr_with_dark();
        let show = dark(Some(5));
        let plan = plan_next_episodes(&plex_library(), Some(&sonarr), &show, 2).await.unwrap();
        let options = ActionOptions {
            dry_run: true,
            ..ActionOptions::default()
        };

        let report = request_downloads(&sonarr, &show, &plan, None, &options, None).await.unwrap();
        assert_eq!(report.planned, vec!["Dark S02E01".to_string(), "Dark S02E02".to_string()]);
        assert!(sonarr.calls().is_empty());
    }
}
