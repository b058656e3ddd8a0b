//! Full metadata sync from the media server into the local store.

use crate::progress::{NoopProgress, SyncProgress};
use anyhow::{Context, Result};
use nextup_models::{LibrarySection, ParentRef, Season, SectionKind, Show, SyncSummary};
use nextup_sources::plex::convert;
use nextup_sources::{MediaServer, PlexMetadata};
use nextup_store::Store;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Result of fetching one item's detailed metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Detailed(PlexMetadata),
    /// The detail fetch failed or found nothing; the bulk listing entry is
    /// used instead.
    Fallback(PlexMetadata),
}

impl DetailOutcome {
    pub fn metadata(&self) -> &PlexMetadata {
        match self {
            DetailOutcome::Detailed(m) | DetailOutcome::Fallback(m) => m,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DetailOutcome::Fallback(_))
    }
}

/// Walks sections, shows, seasons, episodes and movies, upserting every row
/// and replacing its child relations. Safe to re-run.
pub struct PlexSync {
    server: Arc<dyn MediaServer>,
    store: Store,
    progress: Arc<dyn SyncProgress>,
}

impl PlexSync {
    pub fn new(server: Arc<dyn MediaServer>, store: Store) -> Self {
        Self {
            server,
            store,
            progress: Arc::new(NoopProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn SyncProgress>) -> Self {
        self.progress = progress;
        self
    }

    #[instrument(skip(self))]
    pub async fn full_sync(&self) -> Result<SyncSummary> {
        let start = Instant::now();
        let mut summary = SyncSummary::default();
        info!(operation = "sync_start", "Starting full library sync");

        let sections = self.sync_sections().await?;
        summary.sections = sections.len();

        for section in &sections {
            let items = self
                .server
                .get_section_items(&section.section_key, section.kind)
                .await
                .with_context(|| format!("Failed to list items of section '{}'", section.title))?;
            info!(
                operation = "sync_section",
                section = %section.title,
                kind = section.kind.as_str(),
                count = items.len(),
                "Syncing section {}",
                section.title
            );
            self.progress.section_started(&section.title, items.len());

            for item in &items {
                match section.kind {
                    SectionKind::Show => self.sync_show(section, item, &mut summary).await?,
                    SectionKind::Movie => self.sync_movie(section, item, &mut summary).await?,
                }
                self.progress.item_synced(&item.title);
            }
            self.progress.section_finished(&section.title);
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            operation = "sync_complete",
            duration_ms = summary.duration_ms,
            sections = summary.sections,
            shows = summary.total_shows,
            seasons = summary.total_seasons,
            episodes = summary.total_episodes,
            movies = summary.total_movies,
            degraded = summary.degraded_items,
            child_failures = summary.child_failures,
            "Full sync completed"
        );
        Ok(summary)
    }

    /// Upserts every movie and show section; other section types are skipped.
    async fn sync_sections(&self) -> Result<Vec<LibrarySection>> {
        let directories = self
            .server
            .get_sections()
            .await
            .context("Failed to fetch library sections")?;

        let mut sections = Vec::new();
        for dir in &directories {
            let Some(section) = convert::to_section(dir) else {
                debug!("Skipping section '{}' of type '{}'", dir.title, dir.section_type);
                continue;
            };
            self.store.upsert_section(&section)?;
            sections.push(section);
        }
        info!(operation = "sync_sections", count = sections.len(), "Synced library sections");
        Ok(sections)
    }

    /// Detailed metadata for `bulk`, or `bulk` itself when the detail fetch
    /// fails. The bulk listing lacks collections and cast, so a fallback item
    /// is synced with degraded data.
    pub async fn fetch_detail(&self, bulk: &PlexMetadata) -> DetailOutcome {
        match self.server.get_metadata(&bulk.rating_key).await {
            Ok(Some(detailed)) => DetailOutcome::Detailed(detailed),
            Ok(None) => {
                warn!(
                    rating_key = %bulk.rating_key,
                    title = %bulk.title,
                    "No detailed metadata found, using bulk listing data"
                );
                DetailOutcome::Fallback(bulk.clone())
            }
            Err(e) => {
                warn!(
                    rating_key = %bulk.rating_key,
                    title = %bulk.title,
                    error = %e,
                    "Failed to fetch detailed metadata, using bulk listing data"
                );
                DetailOutcome::Fallback(bulk.clone())
            }
        }
    }

    async fn detail_counted(&self, bulk: &PlexMetadata, summary: &mut SyncSummary) -> PlexMetadata {
        let outcome = self.fetch_detail(bulk).await;
        if outcome.is_fallback() {
            summary.degraded_items += 1;
        }
        match outcome {
            DetailOutcome::Detailed(m) | DetailOutcome::Fallback(m) => m,
        }
    }

    /// Child relation failures are logged and counted, never propagated.
    fn replace_children_logged(&self, parent: ParentRef, item: &PlexMetadata, summary: &mut SyncSummary) {
        let relations = convert::child_relations(item, &parent);
        if let Err(e) = self.store.replace_children(&parent, &relations) {
            summary.child_failures += 1;
            warn!(
                parent = ?parent,
                error = %e,
                "Failed to sync child relations for {}",
                item.title
            );
        }
    }

    async fn sync_show(&self, section: &LibrarySection, bulk: &PlexMetadata, summary: &mut SyncSummary) -> Result<()> {
        let detailed = self.detail_counted(bulk, summary).await;
        let show = convert::to_show(&detailed, &section.section_key);
        self.store.upsert_show(&show)?;
        self.replace_children_logged(ParentRef::Show(show.rating_key.clone()), &detailed, summary);
        summary.total_shows += 1;

        let seasons = self
            .server
            .get_children(&show.rating_key)
            .await
            .with_context(|| format!("Failed to fetch seasons of '{}'", show.title))?;

        for season_item in &seasons {
            self.sync_season(&show, season_item, summary).await?;
        }
        debug!("Synced show '{}' ({} seasons)", show.title, seasons.len());
        Ok(())
    }

    async fn sync_season(&self, show: &Show, bulk: &PlexMetadata, summary: &mut SyncSummary) -> Result<()> {
        let detailed = self.detail_counted(bulk, summary).await;
        let season = convert::to_season(&detailed, &show.rating_key);
        self.store.upsert_season(&season)?;
        self.replace_children_logged(ParentRef::Season(season.rating_key.clone()), &detailed, summary);
        summary.total_seasons += 1;

        let episodes = self
            .server
            .get_children(&season.rating_key)
            .await
            .with_context(|| format!("Failed to fetch episodes of '{}' {}", show.title, season.title))?;

        for episode_item in &episodes {
            self.sync_episode(show, &season, episode_item, summary).await?;
        }
        Ok(())
    }

    async fn sync_episode(
        &self,
        show: &Show,
        season: &Season,
        bulk: &PlexMetadata,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let detailed = self.detail_counted(bulk, summary).await;
        let episode = convert::to_episode(&detailed, season, &show.title);
        self.store.upsert_episode(&episode)?;
        self.replace_children_logged(ParentRef::Episode(episode.rating_key.clone()), &detailed, summary);
        summary.total_episodes += 1;
        Ok(())
    }

    async fn sync_movie(&self, section: &LibrarySection, bulk: &PlexMetadata, summary: &mut SyncSummary) -> Result<()> {
        let detailed = self.detail_counted(bulk, summary).await;
        let movie = convert::to_movie(&detailed, &section.section_key);
        self.store.upsert_movie(&movie)?;
        self.replace_children_logged(ParentRef::Movie(movie.rating_key.clone()), &detailed, summary);
        summary.total_movies += 1;
        Ok(())
    }
}
