//! Versioned schema for the library database.

pub struct VersionedSchema {
    pub version: usize,
    pub up: &'static str,
}

/// Tables holding child relation rows. Every one of them has the four nullable
/// parent columns `movie_key`, `show_key`, `season_key` and `episode_key`.
pub const CHILD_TABLES: &[&str] = &[
    "directors",
    "genres",
    "producers",
    "writers",
    "countries",
    "roles",
    "ratings",
    "guids",
    "media",
    "images",
    "ultra_blur_colors",
];

pub const ENTITY_TABLES: &[&str] = &[
    "library_sections",
    "shows",
    "seasons",
    "episodes",
    "movies",
    "collection_memberships",
];

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        up: r#"
            CREATE TABLE IF NOT EXISTS library_sections (
                section_key TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                kind TEXT NOT NULL,
                agent TEXT,
                scanner TEXT,
                language TEXT,
                uuid TEXT,
                refreshing INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT,
                scanned_at TEXT
            );

            CREATE TABLE IF NOT EXISTS shows (
                rating_key TEXT PRIMARY KEY,
                section_key TEXT,
                guid TEXT,
                title TEXT NOT NULL,
                year INTEGER,
                summary TEXT,
                studio TEXT,
                content_rating TEXT,
                rating REAL,
                audience_rating REAL,
                originally_available_at TEXT,
                child_count INTEGER,
                leaf_count INTEGER,
                viewed_leaf_count INTEGER,
                added_at TEXT,
                updated_at TEXT,
                thumb TEXT,
                art TEXT
            );

            CREATE TABLE IF NOT EXISTS seasons (
                rating_key TEXT PRIMARY KEY,
                show_rating_key TEXT NOT NULL,
                title TEXT NOT NULL,
                season_index INTEGER,
                summary TEXT,
                leaf_count INTEGER,
                viewed_leaf_count INTEGER,
                added_at TEXT,
                updated_at TEXT,
                thumb TEXT,
                art TEXT
            );

            CREATE TABLE IF NOT EXISTS episodes (
                rating_key TEXT PRIMARY KEY,
                season_rating_key TEXT NOT NULL,
                show_rating_key TEXT NOT NULL,
                show_title TEXT NOT NULL,
                season_index INTEGER NOT NULL,
                episode_index INTEGER NOT NULL,
                title TEXT NOT NULL,
                summary TEXT,
                content_rating TEXT,
                duration INTEGER,
                originally_available_at TEXT,
                view_count INTEGER NOT NULL DEFAULT 0,
                last_viewed_at TEXT,
                added_at TEXT,
                updated_at TEXT,
                thumb TEXT,
                art TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_episodes_show_order
                ON episodes(show_rating_key, season_index, episode_index);
            CREATE INDEX IF NOT EXISTS idx_episodes_unplayed_date
                ON episodes(view_count, originally_available_at);

            CREATE TABLE IF NOT EXISTS movies (
                rating_key TEXT PRIMARY KEY,
                section_key TEXT,
                guid TEXT,
                title TEXT NOT NULL,
                year INTEGER,
                tagline TEXT,
                summary TEXT,
                studio TEXT,
                content_rating TEXT,
                rating REAL,
                audience_rating REAL,
                duration INTEGER,
                originally_available_at TEXT,
                view_count INTEGER NOT NULL DEFAULT 0,
                last_viewed_at TEXT,
                added_at TEXT,
                updated_at TEXT,
                thumb TEXT,
                art TEXT
            );

            CREATE TABLE IF NOT EXISTS collection_memberships (
                media_kind TEXT NOT NULL,
                rating_key TEXT NOT NULL,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                normalized_name TEXT NOT NULL,
                PRIMARY KEY (media_kind, rating_key, position)
            );

            CREATE INDEX IF NOT EXISTS idx_collection_memberships_name
                ON collection_memberships(media_kind, normalized_name);

            CREATE TABLE IF NOT EXISTS directors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                tag TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS genres (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                tag TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS producers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                tag TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS writers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                tag TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS countries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                tag TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS roles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                tag TEXT NOT NULL,
                role TEXT,
                thumb TEXT
            );
            CREATE TABLE IF NOT EXISTS ratings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                image TEXT,
                value REAL,
                rating_type TEXT
            );
            CREATE TABLE IF NOT EXISTS guids (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                guid TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS media (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                media_id INTEGER,
                duration INTEGER,
                bitrate INTEGER,
                width INTEGER,
                height INTEGER,
                aspect_ratio REAL,
                audio_channels INTEGER,
                audio_codec TEXT,
                video_codec TEXT,
                video_resolution TEXT,
                video_frame_rate TEXT,
                container TEXT
            );
            CREATE TABLE IF NOT EXISTS images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                alt TEXT,
                image_type TEXT,
                url TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS ultra_blur_colors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                movie_key TEXT, show_key TEXT, season_key TEXT, episode_key TEXT,
                top_left TEXT,
                top_right TEXT,
                bottom_left TEXT,
                bottom_right TEXT
            );

            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                tv_weight REAL NOT NULL DEFAULT 1.0,
                movie_weight REAL NOT NULL DEFAULT 1.0,
                selected_collection TEXT,
                ignored_tv_collections TEXT NOT NULL DEFAULT '[]',
                ignored_movie_collections TEXT NOT NULL DEFAULT '[]',
                sync_interval_hours INTEGER NOT NULL DEFAULT 12
            );

            INSERT OR IGNORE INTO settings (id) VALUES (1);

            CREATE TABLE IF NOT EXISTS custom_order_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                custom_order TEXT NOT NULL,
                media_kind TEXT NOT NULL,
                rating_key TEXT NOT NULL,
                title TEXT NOT NULL,
                added_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_custom_order_items_key
                ON custom_order_items(media_kind, rating_key);
        "#,
    },
    VersionedSchema {
        version: 2,
        up: r#"
            CREATE INDEX IF NOT EXISTS idx_roles_movie_key ON roles(movie_key);
            CREATE INDEX IF NOT EXISTS idx_roles_show_key ON roles(show_key);
            CREATE INDEX IF NOT EXISTS idx_roles_season_key ON roles(season_key);
            CREATE INDEX IF NOT EXISTS idx_roles_episode_key ON roles(episode_key);
            CREATE INDEX IF NOT EXISTS idx_guids_movie_key ON guids(movie_key);
            CREATE INDEX IF NOT EXISTS idx_guids_show_key ON guids(show_key);
            CREATE INDEX IF NOT EXISTS idx_guids_season_key ON guids(season_key);
            CREATE INDEX IF NOT EXISTS idx_guids_episode_key ON guids(episode_key);
            CREATE INDEX IF NOT EXISTS idx_genres_movie_key ON genres(movie_key);
            CREATE INDEX IF NOT EXISTS idx_genres_show_key ON genres(show_key);
            CREATE INDEX IF NOT EXISTS idx_genres_season_key ON genres(season_key);
            CREATE INDEX IF NOT EXISTS idx_genres_episode_key ON genres(episode_key);
            CREATE INDEX IF NOT EXISTS idx_media_movie_key ON media(movie_key);
            CREATE INDEX IF NOT EXISTS idx_media_show_key ON media(show_key);
            CREATE INDEX IF NOT EXISTS idx_media_season_key ON media(season_key);
            CREATE INDEX IF NOT EXISTS idx_media_episode_key ON media(episode_key);
            CREATE INDEX IF NOT EXISTS idx_images_movie_key ON images(movie_key);
            CREATE INDEX IF NOT EXISTS idx_images_show_key ON images(show_key);
            CREATE INDEX IF NOT EXISTS idx_images_season_key ON images(season_key);
            CREATE INDEX IF NOT EXISTS idx_images_episode_key ON images(episode_key);
        "#,
    },
];
