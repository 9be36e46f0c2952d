//! Finding the next episodes to fetch for a show the user is watching.

use plexarr_models::{EpisodeKey, EpisodeRecord, WatchStatus};
use std::collections::{BTreeMap, BTreeSet};

/// Scan bound for a season whose length nobody knows
const UNKNOWN_SEASON_CAP: u32 = 30;

/// Seasons past the reference scanned when no season lengths are known
const UNKNOWN_SEASONS_AHEAD: u32 = 2;

/// Most gaps returned for one show, whatever count is asked for
pub const MAX_GAPS: usize = 100;

/// What the library holds for one show, and where the viewer is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowProgress {
    pub known: BTreeSet<EpisodeKey>,
    pub reference: Option<EpisodeKey>,
}

impl ShowProgress {
    pub fn from_episodes(episodes: &[EpisodeRecord]) -> Self {
        Self {
            known: episodes.iter().map(|e| e.key).collect(),
            reference: reference_position(episodes),
        }
    }
}

/// Where the viewer is: the earliest in-progress episode if any, else the
/// most recently watched one. Specials (season 0) never count.
pub fn reference_position(episodes: &[EpisodeRecord]) -> Option<EpisodeKey> {
    let regular = || episodes.iter().filter(|e| e.key.season > 0);

    regular()
        .filter(|e| e.watch_status == WatchStatus::InProgress)
        .map(|e| e.key)
        .min()
        .or_else(|| {
            regular()
                .filter(|e| e.watch_status == WatchStatus::Watched)
                .max_by_key(|e| (e.last_viewed_at, e.key))
                .map(|e| e.key)
        })
}

/// Season lengths derived from a full episode listing: highest episode
/// number per season, specials skipped
pub fn season_lengths<I>(keys: I) -> BTreeMap<u32, u32>
where
    I: IntoIterator<Item = EpisodeKey>,
{
    let mut lengths = BTreeMap::new();
    for key in keys.into_iter().filter(|k| k.season > 0) {
        let length = lengths.entry(key.season).or_insert(0);
        *length = (*length).max(key.episode);
    }
    lengths
}

/// Up to `count` episodes after the reference position that the library
/// does not hold, in (season, episode) order.
///
/// Each season is scanned up to its known length, or a fixed cap when the
/// length is unknown. When the scanned seasons run dry the remaining
/// entries are numbered on from the last gap found (or the reference), so
/// a show with no further catalog data still gets a guess. Those numbered
/// entries stay in that season even past its known length. A show with no
/// reference position yields nothing. `count` is capped at [`MAX_GAPS`].
pub fn find_gaps(
    progress: &ShowProgress,
    season_lengths: Option<&BTreeMap<u32, u32>>,
    count: usize,
) -> Vec<EpisodeKey> {
    let Some(reference) = progress.reference else {
        return Vec::new();
    };
    let count = count.min(MAX_GAPS);
    let mut gaps = Vec::new();
    if count == 0 {
        return gaps;
    }

    let known_lengths = season_lengths.filter(|l| !l.is_empty());
    let last_season = match known_lengths.and_then(|l| l.keys().next_back()) {
        Some(&max_known) => max_known.max(reference.season.saturating_add(1)),
        None => reference.season.saturating_add(UNKNOWN_SEASONS_AHEAD),
    };
    let bound = |season: u32| -> u32 {
        match known_lengths.and_then(|l| l.get(&season)) {
            Some(&length) => length,
            None if season == reference.season => reference.episode.saturating_add(UNKNOWN_SEASON_CAP),
            None => UNKNOWN_SEASON_CAP,
        }
    };

    for season in reference.season..=last_season {
        let first = if season == reference.season {
            reference.episode.saturating_add(1)
        } else {
            1
        };
        for episode in first..=bound(season) {
            let key = EpisodeKey::new(season, episode);
            if progress.known.contains(&key) {
                continue;
            }
            gaps.push(key);
            if gaps.len() == count {
                return gaps;
            }
        }
    }

    let from = gaps.last().copied().unwrap_or(reference);
    let mut episode = from.episode;
    while gaps.len() < count {
        let Some(next) = episode.checked_add(1) else {
            break;
        };
        episode = next;
        let key = EpisodeKey::new(from.season, episode);
        if !progress.known.contains(&key) {
            gaps.push(key);
        }
    }
    gaps
}
