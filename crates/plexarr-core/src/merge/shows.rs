use plexarr_models::{AsMedia, TvShow};
use std::collections::HashMap;
use crate::identity::{derive_show_key, normalize_title, strong_ids_conflict, MergeKey};
use crate::merge::{fold_batches, Builder, EntityIndex, FoldPolicy};

/// Shows are looked up by TVDB id, then IMDb id, then normalized title, so
/// a show keyed differently by Plex and Sonarr still meets itself. The
/// derived show key is tried last and catches records that share only a
/// Plex rating key or Sonarr id.
#[derive(Default)]
struct ShowIndex {
    by_tvdb: HashMap<u32, usize>,
    by_imdb: HashMap<String, usize>,
    by_title: HashMap<String, usize>,
    by_key: HashMap<MergeKey, usize>,
}

impl EntityIndex<TvShow> for ShowIndex {
    fn find(&self, item: &TvShow, slots: &[Builder<TvShow>]) -> Option<usize> {
        let media = item.media();
        let ids = &media.ids;
        // A weaker match never overrides conflicting strong ids
        let compatible = |slot: usize| !strong_ids_conflict(ids, &slots[slot].item().media().ids);

        if let Some(slot) = ids.tvdb_id.and_then(|id| self.by_tvdb.get(&id).copied()) {
            return Some(slot);
        }
        if let Some(slot) = ids
            .imdb_id
            .as_ref()
            .and_then(|id| self.by_imdb.get(id).copied())
            .filter(|s| compatible(*s))
        {
            return Some(slot);
        }
        let title = normalize_title(&media.title);
        if !title.is_empty() {
            if let Some(slot) = self.by_title.get(&title).copied().filter(|s| compatible(*s)) {
                return Some(slot);
            }
        }
        self.by_key
            .get(&derive_show_key(item))
            .copied()
            .filter(|s| compatible(*s))
    }

    fn register(&mut self, item: &TvShow, slot: usize) {
        let media = item.media();
        if let Some(id) = media.ids.tvdb_id {
            self.by_tvdb.entry(id).or_insert(slot);
        }
        if let Some(ref id) = media.ids.imdb_id {
            self.by_imdb.entry(id.clone()).or_insert(slot);
        }
        let title = normalize_title(&media.title);
        if !title.is_empty() {
            self.by_title.entry(title).or_insert(slot);
        }
        self.by_key.entry(derive_show_key(item)).or_insert(slot);
    }
}

/// Merge Plex shows, Sonarr series and the Plex watchlist into one record
/// per show
pub fn merge_shows(primary: Vec<TvShow>, acquisition: Vec<TvShow>, watchlist: Vec<TvShow>) -> Vec<TvShow> {
    fold_batches(ShowIndex::default(), primary, acquisition, watchlist, &FoldPolicy::SHOWS)
}
