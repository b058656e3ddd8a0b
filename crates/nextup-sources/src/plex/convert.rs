//! Mapping from Plex metadata responses onto the flat library rows and their
//! child relations.

use super::models::{PlexDirectory, PlexMetadata};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use nextup_models::{
    ChildRelations, Episode, ImageRef, LibrarySection, MediaStream, Movie, ParentRef, RatingEntry, RoleEntry,
    Season, SectionKind, Show, UltraBlurColors,
};

fn parse_timestamp(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
}

/// Plex dates are `YYYY-MM-DD`; anything else is treated as undated.
pub fn parse_plex_date(value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|v| NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").ok())
}

/// `None` for section types that are not synced (music, photos).
pub fn to_section(dir: &PlexDirectory) -> Option<LibrarySection> {
    let kind = SectionKind::from_plex_type(&dir.section_type)?;
    Some(LibrarySection {
        section_key: dir.key.clone(),
        title: dir.title.clone(),
        kind,
        agent: dir.agent.clone(),
        scanner: dir.scanner.clone(),
        language: dir.language.clone(),
        uuid: dir.uuid.clone(),
        refreshing: dir.refreshing,
        updated_at: parse_timestamp(dir.updated_at),
        scanned_at: parse_timestamp(dir.scanned_at),
    })
}

/// Collection names in response order, blanks dropped.
pub fn collection_names(item: &PlexMetadata) -> Vec<String> {
    item.collections
        .iter()
        .filter_map(|c| c.name())
        .map(str::to_string)
        .collect()
}

pub fn to_show(item: &PlexMetadata, section_key: &str) -> Show {
    Show {
        rating_key: item.rating_key.clone(),
        section_key: Some(section_key.to_string()),
        guid: item.guid.clone(),
        title: item.title.clone(),
        year: item.year,
        summary: item.summary.clone(),
        studio: item.studio.clone(),
        content_rating: item.content_rating.clone(),
        rating: item.rating,
        audience_rating: item.audience_rating,
        originally_available_at: parse_plex_date(item.originally_available_at.as_deref()),
        child_count: item.child_count,
        leaf_count: item.leaf_count,
        viewed_leaf_count: item.viewed_leaf_count,
        added_at: parse_timestamp(item.added_at),
        updated_at: parse_timestamp(item.updated_at),
        thumb: item.thumb.clone(),
        art: item.art.clone(),
        collections: collection_names(item),
    }
}

pub fn to_season(item: &PlexMetadata, show_rating_key: &str) -> Season {
    Season {
        rating_key: item.rating_key.clone(),
        show_rating_key: item
            .parent_rating_key
            .clone()
            .unwrap_or_else(|| show_rating_key.to_string()),
        title: item.title.clone(),
        index: item.index,
        summary: item.summary.clone(),
        leaf_count: item.leaf_count,
        viewed_leaf_count: item.viewed_leaf_count,
        added_at: parse_timestamp(item.added_at),
        updated_at: parse_timestamp(item.updated_at),
        thumb: item.thumb.clone(),
        art: item.art.clone(),
    }
}

/// Parent keys and numbering fall back to the season being walked when the
/// episode payload omits them.
pub fn to_episode(item: &PlexMetadata, season: &Season, show_title: &str) -> Episode {
    Episode {
        rating_key: item.rating_key.clone(),
        season_rating_key: item
            .parent_rating_key
            .clone()
            .unwrap_or_else(|| season.rating_key.clone()),
        show_rating_key: item
            .grandparent_rating_key
            .clone()
            .unwrap_or_else(|| season.show_rating_key.clone()),
        show_title: item
            .grandparent_title
            .clone()
            .unwrap_or_else(|| show_title.to_string()),
        season_index: item.parent_index.or(season.index).unwrap_or(0),
        episode_index: item.index.unwrap_or(0),
        title: item.title.clone(),
        summary: item.summary.clone(),
        content_rating: item.content_rating.clone(),
        duration: item.duration,
        originally_available_at: parse_plex_date(item.originally_available_at.as_deref()),
        view_count: item.view_count.unwrap_or(0),
        last_viewed_at: parse_timestamp(item.last_viewed_at),
        added_at: parse_timestamp(item.added_at),
        updated_at: parse_timestamp(item.updated_at),
        thumb: item.thumb.clone(),
        art: item.art.clone(),
    }
}

pub fn to_movie(item: &PlexMetadata, section_key: &str) -> Movie {
    Movie {
        rating_key: item.rating_key.clone(),
        section_key: Some(section_key.to_string()),
        guid: item.guid.clone(),
        title: item.title.clone(),
        year: item.year,
        tagline: item.tagline.clone(),
        summary: item.summary.clone(),
        studio: item.studio.clone(),
        content_rating: item.content_rating.clone(),
        rating: item.rating,
        audience_rating: item.audience_rating,
        duration: item.duration,
        originally_available_at: parse_plex_date(item.originally_available_at.as_deref()),
        view_count: item.view_count.unwrap_or(0),
        last_viewed_at: parse_timestamp(item.last_viewed_at),
        added_at: parse_timestamp(item.added_at),
        updated_at: parse_timestamp(item.updated_at),
        thumb: item.thumb.clone(),
        art: item.art.clone(),
        collections: collection_names(item),
    }
}

fn tags(list: &[super::models::PlexTag]) -> Vec<String> {
    list.iter().filter_map(|t| t.name()).map(str::to_string).collect()
}

/// Child rows for `parent`. Producers and countries are only kept for movies.
pub fn child_relations(item: &PlexMetadata, parent: &ParentRef) -> ChildRelations {
    let is_movie = matches!(parent, ParentRef::Movie(_));
    ChildRelations {
        directors: tags(&item.directors),
        genres: tags(&item.genres),
        producers: if is_movie { tags(&item.producers) } else { Vec::new() },
        writers: tags(&item.writers),
        countries: if is_movie { tags(&item.countries) } else { Vec::new() },
        roles: item
            .roles
            .iter()
            .filter(|r| !r.tag.trim().is_empty())
            .map(|r| RoleEntry {
                tag: r.tag.clone(),
                role: r.role.clone(),
                thumb: r.thumb.clone(),
            })
            .collect(),
        ratings: item
            .ratings
            .iter()
            .map(|r| RatingEntry {
                image: r.image.clone(),
                value: r.value,
                rating_type: r.rating_type.clone(),
            })
            .collect(),
        guids: item
            .guids
            .iter()
            .filter(|g| !g.id.is_empty())
            .map(|g| g.id.clone())
            .collect(),
        media: item
            .media
            .iter()
            .map(|m| MediaStream {
                media_id: m.id,
                duration: m.duration,
                bitrate: m.bitrate,
                width: m.width,
                height: m.height,
                aspect_ratio: m.aspect_ratio,
                audio_channels: m.audio_channels,
                audio_codec: m.audio_codec.clone(),
                video_codec: m.video_codec.clone(),
                video_resolution: m.video_resolution.clone(),
                video_frame_rate: m.video_frame_rate.clone(),
                container: m.container.clone(),
            })
            .collect(),
        images: item
            .images
            .iter()
            .map(|i| ImageRef {
                alt: i.alt.clone(),
                image_type: i.image_type.clone(),
                url: i.url.clone(),
            })
            .collect(),
        ultra_blur: item.ultra_blur_colors.as_ref().map(|c| UltraBlurColors {
            top_left: c.top_left.clone(),
            top_right: c.top_right.clone(),
            bottom_left: c.bottom_left.clone(),
            bottom_right: c.bottom_right.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plex::models::PlexResponse;

    const MOVIE_JSON: &str = r#"{
        "MediaContainer": {
            "size": 1,
            "Metadata": [{
                "ratingKey": "500",
                "type": "movie",
                "guid": "plex://movie/5d776b59ad5437001f79c6f8",
                "title": "Stargate",
                "year": 1994,
                "studio": "Carolco Pictures",
                "audienceRating": 7.1,
                "duration": 7260000,
                "originallyAvailableAt": "1994-10-28",
                "addedAt": 1577836800,
                "Collection": [{"tag": "Stargate Collection"}, {"tag": "", "title": "Sci-Fi"}],
                "Director": [{"tag": "Roland Emmerich"}],
                "Producer": [{"tag": "Dean Devlin"}],
                "Country": [{"tag": "United States of America"}],
                "Genre": [{"tag": "Science Fiction"}, {"tag": "Adventure"}],
                "Role": [{"tag": "Kurt Russell", "role": "Col. Jonathan 'Jack' O'Neil"}],
                "Rating": [{"image": "imdb://image.rating", "value": 7.1, "type": "audience"}],
                "Guid": [{"id": "imdb://tt0111282"}, {"id": "tmdb://2164"}],
                "Media": [{"id": 1, "videoResolution": "1080", "aspectRatio": 2.35, "audioChannels": 6}],
                "Image": [{"alt": "Stargate", "type": "coverPoster", "url": "/library/metadata/500/thumb/1"}],
                "UltraBlurColors": {"topLeft": "2a1f1a", "topRight": "1c1a1f", "bottomLeft": "3b2a1d", "bottomRight": "101010"}
            }]
        }
    }"#;

    fn movie_item() -> PlexMetadata {
        let response: PlexResponse = serde_json::from_str(MOVIE_JSON).unwrap();
        response.media_container.metadata.into_iter().next().unwrap()
    }

    #[test]
    fn test_movie_conversion() {
        let item = movie_item();
        let movie = to_movie(&item, "1");
        assert_eq!(movie.rating_key, "500");
        assert_eq!(movie.view_count, 0);
        assert_eq!(movie.originally_available_at, NaiveDate::from_ymd_opt(1994, 10, 28));
        assert_eq!(movie.collections, vec!["Stargate Collection", "Sci-Fi"]);
        assert_eq!(movie.added_at.unwrap().timestamp(), 1577836800);
    }

    #[test]
    fn test_child_relations_by_parent_kind() {
        let item = movie_item();
        let movie_rel = child_relations(&item, &ParentRef::Movie("500".to_string()));
        assert_eq!(movie_rel.producers, vec!["Dean Devlin"]);
        assert_eq!(movie_rel.countries.len(), 1);
        assert_eq!(movie_rel.guids, vec!["imdb://tt0111282", "tmdb://2164"]);
        assert_eq!(movie_rel.media[0].video_resolution.as_deref(), Some("1080"));
        assert_eq!(movie_rel.ultra_blur.as_ref().unwrap().bottom_right.as_deref(), Some("101010"));
        assert_eq!(movie_rel.row_count(), 12);

        let show_rel = child_relations(&item, &ParentRef::Show("500".to_string()));
        assert!(show_rel.producers.is_empty());
        assert!(show_rel.countries.is_empty());
    }

    #[test]
    fn test_episode_falls_back_to_walked_season() {
        let item = PlexMetadata {
            rating_key: "103".to_string(),
            title: "The Enemy Within".to_string(),
            index: Some(3),
            originally_available_at: Some("not a date".to_string()),
            ..PlexMetadata::default()
        };
        let season = to_season(
            &PlexMetadata {
                rating_key: "100-s1".to_string(),
                title: "Season 1".to_string(),
                index: Some(1),
                ..PlexMetadata::default()
            },
            "100",
        );
        let episode = to_episode(&item, &season, "Stargate SG-1");
        assert_eq!(episode.season_rating_key, "100-s1");
        assert_eq!(episode.show_rating_key, "100");
        assert_eq!(episode.show_title, "Stargate SG-1");
        assert_eq!((episode.season_index, episode.episode_index), (1, 3));
        assert!(episode.originally_available_at.is_none());
    }

    #[test]
    fn test_sections_filter_types() {
        let json = r#"{"MediaContainer": {"Directory": [
            {"key": "1", "title": "Movies", "type": "movie", "refreshing": false, "scannedAt": 1700000000},
            {"key": "2", "title": "TV Shows", "type": "show"},
            {"key": "3", "title": "Music", "type": "artist"}
        ]}}"#;
        let response: PlexResponse = serde_json::from_str(json).unwrap();
        let sections: Vec<_> = response
            .media_container
            .directory
            .iter()
            .filter_map(to_section)
            .collect();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].kind, SectionKind::Show);
        assert!(sections[0].scanned_at.is_some());
    }
}
