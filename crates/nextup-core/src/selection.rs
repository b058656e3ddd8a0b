//! Collection-aware "start something new" picker.
//!
//! One attempt draws a random unplayed episode, widens to every show and
//! movie sharing a collection with its series, and proposes the earliest
//! unplayed item in that scope. Attempts that hit an excluded collection, an
//! unfinished series or a custom order are dropped and retried.

use crate::collections::{any_same, collections_overlap, normalized_set, same_collection};
use crate::resolver::{ResolvedSeries, SeriesResolver};
use nextup_models::{Episode, MediaKind, Movie, Recommendation, RecommendationKind, Settings};
use nextup_store::Store;
use rand::Rng;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No eligible {kind} found after {attempts} attempts")]
    Exhausted { kind: &'static str, attempts: usize },

    #[error("No unplayed {0} in the library")]
    Empty(&'static str),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

enum Attempt {
    Found(Box<Recommendation>),
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Candidate {
    Episode(Episode),
    Movie(Movie),
}

/// Shows and movies searched for the earliest unplayed item.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Scope {
    pub shows: Vec<String>,
    pub movies: Vec<String>,
}

pub struct SelectionEngine {
    store: Store,
    resolver: Option<SeriesResolver>,
    max_attempts: usize,
}

impl SelectionEngine {
    /// Without a resolver the ended-series check is skipped.
    pub fn new(store: Store, resolver: Option<SeriesResolver>) -> Self {
        Self {
            store,
            resolver,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// TV or movie by the settings weights, falling back to the other kind
    /// when the chosen one has nothing unplayed.
    pub async fn pick(&self) -> Result<Recommendation, SelectionError> {
        let settings = self.store.get_settings()?;
        let kind = choose_kind(settings.tv_weight, settings.movie_weight, random_unit());
        debug!(kind = kind.as_str(), "Weighted pick");

        let first = match kind {
            MediaKind::Episode => self.find_new_series().await,
            MediaKind::Movie => self.find_new_movie().await,
        };
        match first {
            Err(SelectionError::Empty(_)) => match kind {
                MediaKind::Episode => self.find_new_movie().await,
                MediaKind::Movie => self.find_new_series().await,
            },
            other => other,
        }
    }

    pub async fn find_new_series(&self) -> Result<Recommendation, SelectionError> {
        let settings = self.store.get_settings()?;
        let total = self.store.count_unplayed_episodes()?;
        if total == 0 {
            return Err(SelectionError::Empty("episodes"));
        }

        for attempt in 1..=self.max_attempts {
            match self.series_attempt(&settings, total).await? {
                Attempt::Found(rec) => {
                    info!(
                        operation = "select_series",
                        attempt,
                        rating_key = %rec.rating_key,
                        "Selected {}",
                        rec.display_title()
                    );
                    return Ok(*rec);
                }
                Attempt::Rejected(reason) => debug!(attempt, reason = %reason, "Rejected candidate"),
            }
        }
        Err(SelectionError::Exhausted {
            kind: "series",
            attempts: self.max_attempts,
        })
    }

    pub async fn find_new_movie(&self) -> Result<Recommendation, SelectionError> {
        let settings = self.store.get_settings()?;
        let total = self.store.count_unplayed_movies()?;
        if total == 0 {
            return Err(SelectionError::Empty("movies"));
        }

        for attempt in 1..=self.max_attempts {
            let Some(movie) = self.store.unplayed_movie_at(random_offset(total))? else {
                continue;
            };
            if let Some(reason) = self.movie_rejection(&settings, &movie)? {
                debug!(attempt, reason = %reason, "Rejected movie");
                continue;
            }
            info!(
                operation = "select_movie",
                attempt,
                rating_key = %movie.rating_key,
                "Selected {}",
                movie.title
            );
            return Ok(movie_recommendation(movie));
        }
        Err(SelectionError::Exhausted {
            kind: "movie",
            attempts: self.max_attempts,
        })
    }

    fn movie_rejection(&self, settings: &Settings, movie: &Movie) -> anyhow::Result<Option<String>> {
        if let Some(selected) = settings.selected_collection.as_deref() {
            if movie.collections.iter().any(|c| same_collection(c, selected)) {
                return Ok(Some(format!("'{}' is in the selected collection", movie.title)));
            }
        }
        if any_same(&movie.collections, &settings.ignored_movie_collections) {
            return Ok(Some(format!("'{}' is in an ignored collection", movie.title)));
        }
        if self.store.is_in_custom_order(MediaKind::Movie, &movie.rating_key)? {
            return Ok(Some(format!("'{}' is in a custom order", movie.title)));
        }
        Ok(None)
    }

    async fn series_attempt(&self, settings: &Settings, total: i64) -> anyhow::Result<Attempt> {
        let Some(seed) = self.store.unplayed_episode_at(random_offset(total))? else {
            return Ok(Attempt::Rejected("seed episode disappeared".to_string()));
        };

        let collections = self.store.show_collections(&seed.show_rating_key)?;
        if let Some(selected) = settings.selected_collection.as_deref() {
            if collections.iter().any(|c| same_collection(c, selected)) {
                return Ok(Attempt::Rejected(format!(
                    "'{}' is in the selected collection",
                    seed.show_title
                )));
            }
        }
        if any_same(&collections, &settings.ignored_tv_collections) {
            return Ok(Attempt::Rejected(format!("'{}' is in an ignored collection", seed.show_title)));
        }

        let scope = self.search_scope(&seed, &collections, settings)?;
        match self.earliest_in_scope(&seed, &scope)? {
            Candidate::Movie(movie) => {
                if self.store.is_in_custom_order(MediaKind::Movie, &movie.rating_key)? {
                    return Ok(Attempt::Rejected(format!("'{}' is in a custom order", movie.title)));
                }
                Ok(Attempt::Found(Box::new(movie_recommendation(movie))))
            }
            Candidate::Episode(episode) => self.finalize_episode(episode).await,
        }
    }

    async fn finalize_episode(&self, episode: Episode) -> anyhow::Result<Attempt> {
        let series = match &self.resolver {
            Some(resolver) => {
                let series = resolver.find_series(&episode.show_title).await;
                if !series.as_ref().map(ResolvedSeries::is_ended).unwrap_or(false) {
                    return Ok(Attempt::Rejected(format!("'{}' has not ended", episode.show_title)));
                }
                series
            }
            None => None,
        };

        if self.store.is_in_custom_order(MediaKind::Episode, &episode.rating_key)? {
            return Ok(Attempt::Rejected(format!(
                "'{}' {} is in a custom order",
                episode.show_title, episode.title
            )));
        }

        let collections = self.store.show_collections(&episode.show_rating_key)?;
        let mut rec = episode_recommendation(episode, collections);

        if let (Some(resolver), Some(series)) = (&self.resolver, series) {
            if let (Some(season), Some(number)) = (rec.season_number, rec.episode_number) {
                rec.season_artwork = resolver.season_artwork(&series.id, season).await;
                rec.episode_artwork = resolver.episode_artwork(&series.id, season, number).await;
            }
            rec.tvdb_status = series.status;
        }
        Ok(Attempt::Found(Box::new(rec)))
    }

    /// The seed's show alone when it has no collections; otherwise every show
    /// sharing one of its collections plus every unplayed movie whose
    /// collection name prefix-overlaps one of them.
    ///
    /// Selected and ignored TV collections are checked against the seed's
    /// series only. Other shows pulled into scope are not filtered by them.
    pub(crate) fn search_scope(&self, seed: &Episode, collections: &[String], settings: &Settings) -> anyhow::Result<Scope> {
        if collections.is_empty() {
            return Ok(Scope {
                shows: vec![seed.show_rating_key.clone()],
                movies: Vec::new(),
            });
        }

        let names = normalized_set(collections);
        let mut shows = self.store.shows_in_collections(&names)?;
        if !shows.contains(&seed.show_rating_key) {
            shows.push(seed.show_rating_key.clone());
        }

        let mut matched = BTreeSet::new();
        let mut ignored = BTreeSet::new();
        for (rating_key, movie_collection) in self.store.movie_collection_index()? {
            if settings
                .ignored_movie_collections
                .iter()
                .any(|i| same_collection(i, &movie_collection))
            {
                ignored.insert(rating_key);
                continue;
            }
            if names.iter().any(|n| collections_overlap(n, &movie_collection)) {
                matched.insert(rating_key);
            }
        }
        let movies = matched.difference(&ignored).cloned().collect();

        Ok(Scope { shows, movies })
    }

    /// Earliest dated candidate in scope; a movie must be strictly earlier
    /// than the best episode to win. With nothing dated, the seed show's first
    /// unplayed episode in season order.
    pub(crate) fn earliest_in_scope(&self, seed: &Episode, scope: &Scope) -> anyhow::Result<Candidate> {
        let episode = self.store.earliest_unplayed_episode(&scope.shows)?;
        let movie = self.store.earliest_unplayed_movie(&scope.movies)?;

        let candidate = match (episode, movie) {
            (Some(e), Some(m)) => {
                if movie_is_earlier(&m, &e) {
                    Candidate::Movie(m)
                } else {
                    Candidate::Episode(e)
                }
            }
            (Some(e), None) => Candidate::Episode(e),
            (None, Some(m)) => Candidate::Movie(m),
            (None, None) => Candidate::Episode(
                self.store
                    .first_unplayed_episode_of_show(&seed.show_rating_key)?
                    .unwrap_or_else(|| seed.clone()),
            ),
        };
        Ok(candidate)
    }
}

fn movie_is_earlier(movie: &Movie, episode: &Episode) -> bool {
    match (movie.originally_available_at, episode.originally_available_at) {
        (Some(m), Some(e)) => m < e,
        (Some(_), None) => true,
        _ => false,
    }
}

/// `Episode` when `roll * (tv + movie) < tv`. Negative or NaN weights count
/// as zero; all-zero weights pick TV.
pub fn choose_kind(tv_weight: f64, movie_weight: f64, roll: f64) -> MediaKind {
    let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let (tv, movie) = (clean(tv_weight), clean(movie_weight));
    let total = tv + movie;
    if total <= 0.0 || roll * total < tv {
        MediaKind::Episode
    } else {
        MediaKind::Movie
    }
}

fn random_offset(total: i64) -> i64 {
    rand::rng().random_range(0..total)
}

fn random_unit() -> f64 {
    rand::rng().random::<f64>()
}

fn episode_recommendation(episode: Episode, collections: Vec<String>) -> Recommendation {
    Recommendation {
        kind: RecommendationKind::Episode,
        rating_key: episode.rating_key,
        title: episode.title,
        show_title: Some(episode.show_title),
        show_rating_key: Some(episode.show_rating_key),
        season_number: Some(episode.season_index),
        episode_number: Some(episode.episode_index),
        summary: episode.summary,
        originally_available_at: episode.originally_available_at,
        thumb: episode.thumb,
        art: episode.art,
        season_artwork: None,
        episode_artwork: None,
        tvdb_status: None,
        collections,
    }
}

fn movie_recommendation(movie: Movie) -> Recommendation {
    Recommendation {
        kind: RecommendationKind::Movie,
        rating_key: movie.rating_key,
        title: movie.title,
        show_title: None,
        show_rating_key: None,
        season_number: None,
        episode_number: None,
        summary: movie.summary,
        originally_available_at: movie.originally_available_at,
        thumb: movie.thumb,
        art: movie.art,
        season_artwork: None,
        episode_artwork: None,
        tvdb_status: None,
        collections: movie.collections,
    }
}
