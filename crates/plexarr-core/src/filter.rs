use chrono::{DateTime, Duration, Utc};
use plexarr_models::{AsMedia, Availability, WatchStatus};
use std::cmp::Ordering;

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A conjunction of predicates over the media fields of `T`.
///
/// Built up with the combinator methods; an empty filter matches
/// everything.
pub struct MediaFilter<T> {
    predicates: Vec<Predicate<T>>,
}

impl<T: AsMedia + 'static> Default for MediaFilter<T> {
    fn default() -> Self {
        Self { predicates: Vec::new() }
    }
}

impl<T: AsMedia + 'static> MediaFilter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary predicate
    pub fn with<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Items with (or without) a known size on disk
    pub fn has_size(self, wanted: bool) -> Self {
        self.with(move |item| item.media().file_size.is_some() == wanted)
    }

    /// Items whose relevant date is at least `days` old at `now`. Items
    /// without any date never match, and neither does anything when the
    /// cutoff falls outside the calendar.
    pub fn older_than(self, days: u32, now: DateTime<Utc>) -> Self {
        let cutoff = Duration::try_days(i64::from(days)).and_then(|age| now.checked_sub_signed(age));
        self.with(move |item| {
            cutoff.is_some_and(|cutoff| item.media().relevant_date().is_some_and(|d| d <= cutoff))
        })
    }

    pub fn in_watchlist(self, wanted: bool) -> Self {
        self.with(move |item| item.media().in_watchlist == wanted)
    }

    pub fn availability(self, availability: Availability) -> Self {
        self.with(move |item| item.media().availability == availability)
    }

    pub fn watch_status(self, status: WatchStatus) -> Self {
        self.with(move |item| item.media().watch_status == status)
    }

    /// Case-insensitive substring match on the title
    pub fn title_contains(self, needle: &str) -> Self {
        let needle = needle.to_lowercase();
        self.with(move |item| item.media().title.to_lowercase().contains(&needle))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|p| p(item))
    }

    pub fn apply(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending, case-insensitive
    #[default]
    Title,
    /// Most relevant date first, undated items last
    Date,
}

pub fn compare_titles<T: AsMedia>(a: &T, b: &T) -> Ordering {
    a.media().title.to_lowercase().cmp(&b.media().title.to_lowercase())
}

pub fn compare_dates<T: AsMedia>(a: &T, b: &T) -> Ordering {
    match (a.media().relevant_date(), b.media().relevant_date()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn sort_items<T: AsMedia>(items: &mut [T], order: SortOrder) {
    match order {
        SortOrder::Title => items.sort_by(compare_titles),
        SortOrder::Date => items.sort_by(compare_dates),
    }
}
