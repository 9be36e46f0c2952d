use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use plexarr_core::{filter_by_tag, sort_items, MediaFilter, SortOrder};
use plexarr_models::{AsMedia, Availability, WatchStatus};
use plexarr_sources::AcquisitionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AvailabilityArg {
    Plex,
    Radarr,
    Sonarr,
    Both,
}

impl From<AvailabilityArg> for Availability {
    fn from(arg: AvailabilityArg) -> Self {
        match arg {
            AvailabilityArg::Plex => Availability::Plex,
            AvailabilityArg::Radarr => Availability::Radarr,
            AvailabilityArg::Sonarr => Availability::Sonarr,
            AvailabilityArg::Both => Availability::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Watched,
    InProgress,
    NotWatched,
}

impl From<StatusArg> for WatchStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Watched => WatchStatus::Watched,
            StatusArg::InProgress => WatchStatus::InProgress,
            StatusArg::NotWatched => WatchStatus::NotWatched,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Title,
    Date,
}

/// Filters shared by `list`, `shows` and `delete`
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Only items with a known size on disk
    #[arg(long, conflicts_with = "no_size")]
    pub has_size: bool,

    /// Only items without a known size on disk
    #[arg(long)]
    pub no_size: bool,

    /// Only items whose watched, in-progress or added date is at least N days old
    #[arg(long, value_name = "N")]
    pub days: Option<u32>,

    /// Only items on the Plex watchlist
    #[arg(long, conflicts_with = "no_watchlist")]
    pub watchlist: bool,

    /// Only items not on the Plex watchlist
    #[arg(long)]
    pub no_watchlist: bool,

    /// Only items present in exactly this place
    #[arg(long, value_enum)]
    pub availability: Option<AvailabilityArg>,

    /// Only items with this watch status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Only items carrying this Radarr/Sonarr tag (case-insensitive)
    #[arg(long)]
    pub tag: Option<String>,

    /// Sort order
    #[arg(long, value_enum, default_value = "title")]
    pub sort_by: SortArg,
}

impl FilterArgs {
    pub fn build<T: AsMedia + 'static>(&self, now: DateTime<Utc>) -> MediaFilter<T> {
        let mut filter = MediaFilter::new();
        if self.has_size {
            filter = filter.has_size(true);
        }
        if self.no_size {
            filter = filter.has_size(false);
        }
        if let Some(days) = self.days {
            filter = filter.older_than(days, now);
        }
        if self.watchlist {
            filter = filter.in_watchlist(true);
        }
        if self.no_watchlist {
            filter = filter.in_watchlist(false);
        }
        if let Some(availability) = self.availability {
            filter = filter.availability(availability.into());
        }
        if let Some(status) = self.status {
            filter = filter.watch_status(status.into());
        }
        filter
    }

    pub fn sort_order(&self) -> SortOrder {
        match self.sort_by {
            SortArg::Title => SortOrder::Title,
            SortArg::Date => SortOrder::Date,
        }
    }

    /// Apply the field filters, the tag filter (when the manager is
    /// configured) and the sort
    pub async fn apply<T: AsMedia + 'static>(
        &self,
        items: Vec<T>,
        manager: Option<&dyn AcquisitionManager<T>>,
        now: DateTime<Utc>,
    ) -> color_eyre::Result<Vec<T>> {
        let mut items = self.build(now).apply(items);
        if let Some(ref tag) = self.tag {
            let manager = manager.ok_or_else(|| color_eyre::eyre::eyre!("--tag needs the manager to be configured"))?;
            items = filter_by_tag(manager, items, tag).await;
        }
        sort_items(&mut items, self.sort_order());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use plexarr_models::Movie;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        filters: FilterArgs,
    }

    #[test]
    fn test_parse_filters() {
        let cli = TestCli::parse_from(["test", "--days", "30", "--availability", "both", "--status", "in-progress", "--sort-by", "date"]);
        assert_eq!(cli.filters.days, Some(30));
        assert_eq!(cli.filters.availability, Some(AvailabilityArg::Both));
        assert_eq!(cli.filters.status, Some(StatusArg::InProgress));
        assert_eq!(cli.filters.sort_order(), SortOrder::Date);
    }

    #[test]
    fn test_negative_days_rejected() {
        assert!(TestCli::try_parse_from(["test", "--days", "-5"]).is_err());
        assert!(TestCli::try_parse_from(["test", "--days", "99999999999"]).is_err());
        let cli = TestCli::parse_from(["test", "--days", "0"]);
        assert_eq!(cli.filters.days, Some(0));
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(TestCli::try_parse_from(["test", "--has-size", "--no-size"]).is_err());
        assert!(TestCli::try_parse_from(["test", "--watchlist", "--no-watchlist"]).is_err());
    }

    #[test]
    fn test_build_filter() {
        let cli = TestCli::parse_from(["test", "--no-size", "--watchlist"]);
        let filter = cli.filters.build::<Movie>(Utc::now());

        let mut wanted = Movie::new("Dune", Availability::Plex);
        wanted.media.in_watchlist = true;
        let mut sized = wanted.clone();
        sized.media.file_size = Some(1);

        assert!(filter.matches(&wanted));
        assert!(!filter.matches(&sized));
        assert!(!filter.matches(&Movie::new("Heat", Availability::Plex)));
    }
}
