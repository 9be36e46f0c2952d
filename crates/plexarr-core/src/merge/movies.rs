use plexarr_models::Movie;
use std::collections::HashMap;
use crate::identity::{derive_movie_key, MergeKey};
use crate::merge::{fold_batches, Builder, EntityIndex, FoldPolicy};

/// One combined key per movie
#[derive(Default)]
struct KeyIndex {
    slots: HashMap<MergeKey, usize>,
}

impl EntityIndex<Movie> for KeyIndex {
    fn find(&self, item: &Movie, _slots: &[Builder<Movie>]) -> Option<usize> {
        self.slots.get(&derive_movie_key(item)).copied()
    }

    fn register(&mut self, item: &Movie, slot: usize) {
        self.slots.entry(derive_movie_key(item)).or_insert(slot);
    }
}

/// Merge Plex movies, Radarr movies and the Plex watchlist into one
/// record per title
pub fn merge_movies(primary: Vec<Movie>, acquisition: Vec<Movie>, watchlist: Vec<Movie>) -> Vec<Movie> {
    fold_batches(KeyIndex::default(), primary, acquisition, watchlist, &FoldPolicy::MOVIES)
}
