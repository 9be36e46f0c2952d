pub mod actions;
pub mod collect;
pub mod duplicates;
pub mod error;
pub mod filter;
pub mod gaps;
pub mod identity;
pub mod merge;
pub mod next_episodes;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{
    clean_duplicates, delete_items, filter_by_tag, sync_candidates, sync_missing, ActionFailure,
    ActionOptions, ActionReport, CleanReport, Confirm, DuplicatePlan,
};
pub use collect::{collect_movies, collect_shows, BatchCounts, Collected};
pub use duplicates::{resolve, QualityWeights, Resolution};
pub use error::CoreError;
pub use filter::{sort_items, MediaFilter, SortOrder};
pub use gaps::{find_gaps, reference_position, ShowProgress, MAX_GAPS};
pub use identity::normalize_title;
pub use merge::{merge_movies, merge_shows, FoldPolicy, SizePolicy};
pub use next_episodes::{plan_next_episodes, request_downloads, EpisodePlan};
