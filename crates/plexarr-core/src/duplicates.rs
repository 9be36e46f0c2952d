use plexarr_models::FileVariant;
use plexarr_sources::AcquisitionManager;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Outcome of resolving the files behind one title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub keep: FileVariant,
    pub remove: Vec<FileVariant>,
}

/// Pick the file to keep: highest quality weight first, then largest size.
///
/// `weight_of` maps a quality id to its weight; a missing quality id or a
/// weight the lookup could not produce counts as 0, so such a file can
/// still be kept when nothing better exists. Ties keep input order.
/// Returns `None` for an empty list.
pub fn resolve<F>(variants: Vec<FileVariant>, weight_of: F) -> Option<Resolution>
where
    F: Fn(u32) -> Option<i64>,
{
    let mut ranked: Vec<(i64, FileVariant)> = variants
        .into_iter()
        .map(|v| (v.quality_id.and_then(&weight_of).unwrap_or(0), v))
        .collect();
    ranked.sort_by_key(|(weight, v)| Reverse((*weight, v.size)));

    let mut ranked = ranked.into_iter().map(|(_, v)| v);
    let keep = ranked.next()?;
    Some(Resolution {
        keep,
        remove: ranked.collect(),
    })
}

/// Quality weights fetched from a manager, memoized for one run.
///
/// The same handful of quality ids recur across every title, so each is
/// looked up at most once. Failed lookups are remembered as 0.
#[derive(Debug, Default, Clone)]
pub struct QualityWeights {
    weights: HashMap<u32, i64>,
}

impl QualityWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the weights of any quality ids in `variants` not seen yet
    pub async fn ensure<T, M>(&mut self, manager: &M, variants: &[FileVariant])
    where
        M: AcquisitionManager<T> + ?Sized,
    {
        for quality_id in variants.iter().filter_map(|v| v.quality_id) {
            if self.weights.contains_key(&quality_id) {
                continue;
            }
            let weight = match manager.get_quality_weight(quality_id).await {
                Ok(weight) => {
                    debug!("{} quality {} has weight {}", manager.source_name(), quality_id, weight);
                    weight
                }
                Err(e) => {
                    warn!(
                        "Could not get weight of {} quality {}, ranking it lowest: {}",
                        manager.source_name(),
                        quality_id,
                        e
                    );
                    0
                }
            };
            self.weights.insert(quality_id, weight);
        }
    }

    pub fn get(&self, quality_id: u32) -> Option<i64> {
        self.weights.get(&quality_id).copied()
    }

    pub fn resolve(&self, variants: Vec<FileVariant>) -> Option<Resolution> {
        resolve(variants, |id| self.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeManager;
    use plexarr_models::Movie;

    const GB: u64 = 1024 * 1024 * 1024;

    fn variant(id: u32, quality_id: Option<u32>, size: u64) -> FileVariant {
        FileVariant {
            id,
            quality_id,
            quality_name: None,
            size,
            relative_path: Some(format!("file-{}.mkv", id)),
        }
    }

    fn ids(variants: &[FileVariant]) -> Vec<u32> {
        variants.iter().map(|v| v.id).collect()
    }

    #[test]
    fn test_quality_first_then_size() {
        let weights: HashMap<u32, i64> = [(7, 10), (3, 5)].into_iter().collect();
        let variants = vec![
            variant(1, Some(7), 2 * GB),
            variant(2, Some(7), 3 * GB),
            variant(3, Some(3), GB),
        ];

        let resolution = resolve(variants, |id| weights.get(&id).copied()).unwrap();

        assert_eq!(resolution.keep.id, 2);
        assert_eq!(ids(&resolution.remove), vec![1, 3]);
    }

    #[test]
    fn test_better_quality_beats_bigger_file() {
        let weights: HashMap<u32, i64> = [(19, 30), (4, 3)].into_iter().collect();
        let variants = vec![variant(1, Some(4), 40 * GB), variant(2, Some(19), 8 * GB)];

        let resolution = resolve(variants, |id| weights.get(&id).copied()).unwrap();
        assert_eq!(resolution.keep.id, 2);
        assert_eq!(ids(&resolution.remove), vec![1]);
    }

    #[test]
    fn test_unknown_quality_ranks_lowest_but_is_kept_when_alone() {
        let weights: HashMap<u32, i64> = [(7, 10)].into_iter().collect();
        let variants = vec![variant(1, None, 9 * GB), variant(2, Some(99), 8 * GB), variant(3, Some(7), GB)];

        let resolution = resolve(variants, |id| weights.get(&id).copied()).unwrap();
        assert_eq!(resolution.keep.id, 3);
        // Both unweighted files stay in play, ordered by size
        assert_eq!(ids(&resolution.remove), vec![1, 2]);

        let single = resolve(vec![variant(4, None, GB)], |_| None).unwrap();
        assert_eq!(single.keep.id, 4);
        assert!(single.remove.is_empty());
    }

    #[test]
    fn test_empty_list_resolves_to_nothing() {
        assert!(resolve(Vec::new(), |_| Some(1)).is_none());
    }

    #[test]
    fn test_remove_excludes_keep() {
        let variants: Vec<FileVariant> = (1..=6).map(|i| variant(i, Some(i % 3), u64::from(i) * GB)).collect();
        let resolution = resolve(variants, |id| Some(i64::from(id) * 10)).unwrap();

        assert_eq!(resolution.remove.len(), 5);
        assert!(!ids(&resolution.remove).contains(&resolution.keep.id));
        // weight 20 (quality 2) wins, and among those the largest (id 5)
        assert_eq!(resolution.keep.id, 5);
    }

    #[tokio::test]
    async fn test_weights_cache_and_failed_lookups() {
        let mut manager = FakeManager::<Movie>::new("Radarr");
        manager.weights.insert(7, 10);
        manager.weights.insert(3, 5);

        let variants = vec![
            variant(1, Some(7), 2 * GB),
            variant(2, Some(7), 3 * GB),
            variant(3, Some(3), GB),
            variant(4, Some(42), 5 * GB),
        ];

        let mut weights = QualityWeights::new();
        weights.ensure(&manager, &variants).await;
        weights.ensure(&manager, &variants).await;

        assert_eq!(weights.get(7), Some(10));
        assert_eq!(weights.get(42), Some(0));
        // one lookup per distinct quality id across both calls
        assert_eq!(manager.calls_matching("quality:"), 3);

        let resolution = weights.resolve(variants).unwrap();
        assert_eq!(resolution.keep.id, 2);
        assert_eq!(ids(&resolution.remove), vec![1, 3, 4]);
    }
}
