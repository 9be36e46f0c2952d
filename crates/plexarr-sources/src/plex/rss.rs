//! The personal watchlist RSS feed Plex publishes under `rss.plex.tv`.
//!
//! Each `<item>` is one title. Ids come from the `<guid>` (`imdb://…`,
//! `tmdb://…`, `tvdb://…`) and from the `tmdbid` attribute of the Media
//! RSS `<media:content>` element; `<category>` tells movies from shows.

use plexarr_models::{Availability, MediaIds, MediaItem};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use crate::error::SourceError;
use crate::plex::api::apply_guid;

const SERVICE: &str = "Plex watchlist RSS";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub category: Option<String>,
    pub ids: MediaIds,
}

impl FeedEntry {
    pub fn is_show(&self) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("show") || c.eq_ignore_ascii_case("tv"))
    }

    /// Entries without a category are taken as movies
    pub fn is_movie(&self) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| c.eq_ignore_ascii_case("movie"))
    }

    pub fn to_item(&self) -> MediaItem {
        let mut item = MediaItem::new(self.title.clone(), Availability::Plex).with_ids(self.ids.clone());
        item.in_watchlist = true;
        item
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Guid,
    Category,
}

impl Field {
    fn of(element: &[u8]) -> Option<Self> {
        match element {
            b"title" => Some(Field::Title),
            b"guid" => Some(Field::Guid),
            b"category" => Some(Field::Category),
            _ => None,
        }
    }
}

/// Decode every `<item>` of the feed. Items without a title are dropped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut field: Option<Field> = None;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(|e| SourceError::decode(SERVICE, e))? {
            Event::Start(e) => {
                let name = e.local_name();
                if name.as_ref() == b"item" {
                    current = Some(FeedEntry::default());
                } else if let Some(entry) = current.as_mut() {
                    if name.as_ref() == b"content" {
                        read_media_content(&e, entry)?;
                    }
                    field = Field::of(name.as_ref());
                    text.clear();
                }
            }
            Event::Empty(e) => {
                if let Some(entry) = current.as_mut() {
                    if e.local_name().as_ref() == b"content" {
                        read_media_content(&e, entry)?;
                    }
                }
            }
            Event::Text(t) if field.is_some() => {
                text.push_str(&t.unescape().map_err(|e| SourceError::decode(SERVICE, e))?);
            }
            Event::CData(c) if field.is_some() => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(entry) = current.take().filter(|entry| !entry.title.is_empty()) {
                        entries.push(entry);
                    }
                } else if let (Some(entry), Some(f)) = (current.as_mut(), field.take()) {
                    store(entry, f, text.trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(entries)
}

fn store(entry: &mut FeedEntry, field: Field, value: &str) {
    if value.is_empty() {
        return;
    }
    match field {
        Field::Title => entry.title = value.to_string(),
        Field::Guid => {
            let tmdb_id = entry.ids.tmdb_id;
            apply_guid(&mut entry.ids, value);
            entry.ids.tmdb_id = entry.ids.tmdb_id.or(tmdb_id);
        }
        Field::Category => entry.category = Some(value.to_string()),
    }
}

/// `<media:content tmdbid="…">`; a non-numeric id is ignored
fn read_media_content(element: &BytesStart<'_>, entry: &mut FeedEntry) -> Result<(), SourceError> {
    let Some(attr) = element
        .try_get_attribute("tmdbid")
        .map_err(|e| SourceError::decode(SERVICE, e))?
    else {
        return Ok(());
    };
    let value = attr.unescape_value().map_err(|e| SourceError::decode(SERVICE, e))?;
    if let Some(id) = value.trim().parse::<u32>().ok().filter(|id| *id != 0) {
        entry.ids.tmdb_id = Some(id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Watchlist</title>
    <link>https://watch.plex.tv/watchlist</link>
    <item>
      <title>Dune: Part Two</title>
      <category>movie</category>
      <guid isPermaLink="false">imdb://tt15239678</guid>
      <media:content url="https://image.tmdb.org/p.jpg" tmdbid="693134"/>
    </item>
    <item>
      <title><![CDATA[Tom & Jerry's "Show"]]></title>
      <category>show</category>
      <guid>tvdb://72860</guid>
    </item>
    <item>
      <title>Heat &amp; Dust</title>
      <media:content tmdbid="unknown"></media:content>
    </item>
    <item>
      <category>movie</category>
      <guid>tmdb://1</guid>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed() {
        let entries = parse_feed(FEED_FIXTURE).unwrap();
        assert_eq!(entries.len(), 3);

        let dune = &entries[0];
        assert_eq!(dune.title, "Dune: Part Two");
        assert_eq!(dune.ids.tmdb_id, Some(693134));
        assert_eq!(dune.ids.imdb_id.as_deref(), Some("tt15239678"));
        assert!(dune.is_movie() && !dune.is_show());

        let show = &entries[1];
        assert_eq!(show.title, r#"Tom & Jerry's "Show""#);
        assert_eq!(show.ids.tvdb_id, Some(72860));
        assert!(show.is_show() && !show.is_movie());

        let heat = &entries[2];
        assert_eq!(heat.title, "Heat & Dust");
        assert_eq!(heat.ids, MediaIds::default());
        assert!(heat.is_movie());
    }

    #[test]
    fn test_feed_entries_become_watchlist_items() {
        let entries = parse_feed(FEED_FIXTURE).unwrap();
        let item = entries[0].to_item();
        assert!(item.in_watchlist);
        assert_eq!(item.availability, Availability::Plex);
        assert_eq!(item.ids.plex_rating_key, None);
    }

    #[test]
    fn test_malformed_feed_is_a_decode_error() {
        assert!(parse_feed("").unwrap().is_empty());
        let err = parse_feed("<rss><channel><item><title>Heat</channel></rss>").unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }), "{:?}", err);
    }
}
