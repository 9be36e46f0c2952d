//! Folding the Plex, manager and watchlist batches into one record per
//! title.
//!
//! Both engines run the same three passes over an arena of owned
//! builders:
//!
//! 1. primary (Plex) items claim slots; the first writer of a slot wins,
//! 2. acquisition (Radarr/Sonarr) items fold into a matching slot or open
//!    a new one tagged with the manager,
//! 3. watchlist items only flip `in_watchlist` on a match, or open a new
//!    Plex-tagged slot.
//!
//! What differs per media type is how an incoming record finds its slot
//! (an [`EntityIndex`]) and how sizes combine (a [`FoldPolicy`]).

mod movies;
mod shows;

pub use movies::merge_movies;
pub use shows::merge_shows;

use plexarr_models::{AsMedia, Availability, Movie, TvShow};
use tracing::{debug, trace};

/// How a size reported by the acquisition manager combines with the one
/// already on the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// Keep the existing size; take the incoming one (and its path) only
    /// when the record has none
    FirstWins,
    /// Keep the larger of the two; the source that saw more files on disk
    /// is the more accurate one
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldPolicy {
    pub size: SizePolicy,
    /// Availability given to records only the acquisition batch knows
    pub acquisition_source: Availability,
}

impl FoldPolicy {
    pub const MOVIES: FoldPolicy = FoldPolicy {
        size: SizePolicy::FirstWins,
        acquisition_source: Availability::Radarr,
    };

    pub const SHOWS: FoldPolicy = FoldPolicy {
        size: SizePolicy::Max,
        acquisition_source: Availability::Sonarr,
    };
}

/// A record the merge engines can fold
pub trait MergeRecord: AsMedia {
    /// Type-specific backfill from an incoming acquisition record
    fn backfill(&mut self, _incoming: &Self) {}
}

impl MergeRecord for Movie {}

impl MergeRecord for TvShow {
    /// Episode and season counts: first known value wins
    fn backfill(&mut self, incoming: &Self) {
        if self.episode_count.is_none() {
            self.episode_count = incoming.episode_count;
        }
        if self.season_count.is_none() {
            self.season_count = incoming.season_count;
        }
    }
}

/// Owned accumulator for one merged title
#[derive(Debug)]
pub(crate) struct Builder<T> {
    item: T,
}

impl<T: MergeRecord> Builder<T> {
    pub(crate) fn new(item: T) -> Self {
        Self { item }
    }

    pub(crate) fn item(&self) -> &T {
        &self.item
    }

    /// Fold a record from the acquisition batch into this one
    pub(crate) fn fold_acquisition(&mut self, incoming: T, policy: &FoldPolicy) {
        let source = incoming.media();
        let target = self.item.media_mut();

        target.availability = target.availability.combine(source.availability);
        target.ids.merge(&source.ids);

        match policy.size {
            SizePolicy::FirstWins => {
                if target.file_size.is_none() && source.file_size.is_some() {
                    target.file_size = source.file_size;
                    target.file_path = source.file_path.clone();
                }
            }
            SizePolicy::Max => {
                if let Some(incoming_size) = source.file_size {
                    target.file_size = Some(target.file_size.map_or(incoming_size, |s| s.max(incoming_size)));
                }
                if target.file_path.is_none() {
                    target.file_path = source.file_path.clone();
                }
            }
        }

        if target.added_date.is_none() {
            target.added_date = source.added_date;
        }
        if source.in_watchlist {
            target.in_watchlist = true;
        }

        self.item.backfill(&incoming);
    }

    pub(crate) fn mark_watchlisted(&mut self) {
        self.item.media_mut().in_watchlist = true;
    }

    pub(crate) fn finish(self) -> T {
        self.item
    }
}

/// Finds the slot an incoming record belongs to
pub(crate) trait EntityIndex<T> {
    fn find(&self, item: &T, slots: &[Builder<T>]) -> Option<usize>;

    /// Make `slot` findable through the identifiers `item` carries
    fn register(&mut self, item: &T, slot: usize);
}

/// The three passes shared by both engines
pub(crate) fn fold_batches<T, I>(
    mut index: I,
    primary: Vec<T>,
    acquisition: Vec<T>,
    watchlist: Vec<T>,
    policy: &FoldPolicy,
) -> Vec<T>
where
    T: MergeRecord,
    I: EntityIndex<T>,
{
    let mut slots: Vec<Builder<T>> = Vec::with_capacity(primary.len() + acquisition.len());

    for item in primary {
        match index.find(&item, &slots) {
            Some(slot) => {
                trace!(
                    "'{}' duplicates '{}' in the primary batch, keeping the first",
                    item.media().title,
                    slots[slot].item().media().title
                );
            }
            None => {
                index.register(&item, slots.len());
                slots.push(Builder::new(item));
            }
        }
    }

    for mut item in acquisition {
        match index.find(&item, &slots) {
            Some(slot) => {
                debug!("Matched '{}' to existing '{}'", item.media().title, slots[slot].item().media().title);
                slots[slot].fold_acquisition(item, policy);
                index.register(slots[slot].item(), slot);
            }
            None => {
                item.media_mut().availability = policy.acquisition_source;
                index.register(&item, slots.len());
                slots.push(Builder::new(item));
            }
        }
    }

    for mut item in watchlist {
        match index.find(&item, &slots) {
            Some(slot) => slots[slot].mark_watchlisted(),
            None => {
                let media = item.media_mut();
                media.in_watchlist = true;
                media.availability = Availability::Plex;
                index.register(&item, slots.len());
                slots.push(Builder::new(item));
            }
        }
    }

    slots.into_iter().map(Builder::finish).collect()
}
