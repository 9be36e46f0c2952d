use chrono::{DateTime, Utc};
use comfy_table::{Attribute, Cell, Color, Table};
use plexarr_core::{DuplicatePlan, EpisodePlan};
use plexarr_models::{MediaItem, Movie, QualityProfile, RootFolder, TvShow};
use crate::output::{format_date, format_optional_size, format_size};

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn media_cells(media: &MediaItem, now: DateTime<Utc>) -> Vec<String> {
    vec![
        media.title.clone(),
        media.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string()),
        media.availability.label().to_string(),
        media.watch_status.label().to_string(),
        format_date(media.relevant_date(), now),
        format_optional_size(media.file_size),
        if media.in_watchlist { "✓" } else { "" }.to_string(),
    ]
}

const MEDIA_HEADERS: [&str; 7] = ["Title", "Year", "Availability", "Status", "Date", "Size", "Watchlist"];

pub fn movie_table(movies: &[Movie], now: DateTime<Utc>) -> Table {
    let mut table = styled_table(&MEDIA_HEADERS);
    for movie in movies {
        table.add_row(media_cells(&movie.media, now));
    }
    table
}

pub fn show_table(shows: &[TvShow], now: DateTime<Utc>) -> Table {
    let mut headers = MEDIA_HEADERS.to_vec();
    headers.extend(["Episodes", "Seasons"]);
    let mut table = styled_table(&headers);
    for show in shows {
        let mut row = media_cells(&show.media, now);
        row.push(show.episode_count.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()));
        row.push(show.season_count.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()));
        table.add_row(row);
    }
    table
}

pub fn duplicate_table(plans: &[DuplicatePlan]) -> Table {
    let mut table = styled_table(&["Title", "Action", "Quality", "Size", "File"]);
    for plan in plans {
        let keep = &plan.resolution.keep;
        table.add_row(vec![
            Cell::new(&plan.title),
            Cell::new("keep").fg(Color::Green),
            Cell::new(keep.display_name()),
            Cell::new(format_size(keep.size)),
            Cell::new(keep.relative_path.as_deref().unwrap_or("-")),
        ]);
        for file in &plan.resolution.remove {
            table.add_row(vec![
                Cell::new(""),
                Cell::new("remove").fg(Color::Red),
                Cell::new(file.display_name()),
                Cell::new(format_size(file.size)),
                Cell::new(file.relative_path.as_deref().unwrap_or("-")),
            ]);
        }
    }
    table
}

pub fn episode_plan_table<'a>(plans: impl IntoIterator<Item = &'a EpisodePlan>) -> Table {
    let mut table = styled_table(&["Show", "Watched Up To", "Next", "Title", "In Sonarr", "Downloaded"]);
    for plan in plans {
        let reference = plan
            .reference
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        for (i, gap) in plan.gaps.iter().enumerate() {
            let (show, watched) = if i == 0 {
                (plan.title.as_str(), reference.as_str())
            } else {
                ("", "")
            };
            table.add_row(vec![
                show.to_string(),
                watched.to_string(),
                gap.key.to_string(),
                gap.title.clone().unwrap_or_else(|| "-".to_string()),
                if gap.manager_episode_id.is_some() { "✓" } else { "✗" }.to_string(),
                if gap.has_file { "✓" } else { "" }.to_string(),
            ]);
        }
    }
    table
}

pub fn quality_profile_table(profiles: &[QualityProfile]) -> Table {
    let mut table = styled_table(&["ID", "Name"]);
    for profile in profiles {
        table.add_row(vec![profile.id.to_string(), profile.name.clone()]);
    }
    table
}

pub fn root_folder_table(folders: &[RootFolder]) -> Table {
    let mut table = styled_table(&["ID", "Path", "Free Space"]);
    for folder in folders {
        table.add_row(vec![
            folder.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
            folder.path.clone(),
            format_optional_size(folder.free_space),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexarr_core::Resolution;
    use plexarr_models::{Availability, FileVariant};

    #[test]
    fn test_movie_table_rows() {
        let mut movie = Movie::new("Heat", Availability::Both);
        movie.media.year = Some(1995);
        movie.media.file_size = Some(2 * 1024 * 1024 * 1024);
        let rendered = movie_table(&[movie], Utc::now()).to_string();
        assert!(rendered.contains("Heat"));
        assert!(rendered.contains("1995"));
        assert!(rendered.contains("2.0 GB"));
    }

    #[test]
    fn test_duplicate_table_marks_keep_and_remove() {
        let file = |id, size| FileVariant {
            id,
            quality_id: Some(7),
            quality_name: Some("Bluray-1080p".to_string()),
            size,
            relative_path: Some(format!("heat-{}.mkv", id)),
        };
        let plan = DuplicatePlan {
            title: "Heat (1995)".to_string(),
            movie_id: 3,
            resolution: Resolution {
                keep: file(1, 10),
                remove: vec![file(2, 5)],
            },
        };
        let rendered = duplicate_table(&[plan]).to_string();
        assert!(rendered.contains("keep"));
        assert!(rendered.contains("remove"));
        assert!(rendered.contains("heat-2.mkv"));
    }
}
