use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use thiserror::Error;
use time::Date;
use tracing::{debug, warn};

use crate::application::pagination::OffsetPage;
use crate::application::repos::{MovieParams, MoviesRepo, MoviesWriteRepo, RepoError};
use crate::cache::{ListingCache, listing_cache_key};
use crate::domain::entities::MovieRecord;
use crate::domain::error::DomainError;
use crate::domain::listing::{MAX_RATING, MIN_RATING, MovieListParams, MovieQuery};

const CACHE_TARGET: &str = "marquee::cache";

#[derive(Debug, Error)]
pub enum MovieServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for MovieServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::Domain(DomainError::not_found("movie")),
            other => Self::Repo(other),
        }
    }
}

/// Movie fields supplied on create and full replace.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieCommand {
    pub title: String,
    pub description: String,
    pub release_date: Option<Date>,
    pub genre: String,
    pub director: String,
    pub rating: f64,
    pub duration: i32,
    pub language: String,
    pub poster_url: String,
    pub trailer_url: String,
}

impl MovieCommand {
    fn into_params(self) -> Result<MovieParams, DomainError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title", "must not be empty"));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(DomainError::validation(
                "rating",
                format!("must be between {MIN_RATING} and {MAX_RATING}"),
            ));
        }
        if self.duration < 0 {
            return Err(DomainError::validation("duration", "must not be negative"));
        }

        Ok(MovieParams {
            title: title.to_string(),
            description: self.description,
            release_date: self.release_date,
            genre: self.genre,
            director: self.director,
            rating: self.rating,
            duration: self.duration,
            language: self.language,
            poster_url: self.poster_url,
            trailer_url: self.trailer_url,
        })
    }
}

impl From<MovieRecord> for MovieCommand {
    fn from(record: MovieRecord) -> Self {
        Self {
            title: record.title,
            description: record.description,
            release_date: record.release_date,
            genre: record.genre,
            director: record.director,
            rating: record.rating,
            duration: record.duration,
            language: record.language,
            poster_url: record.poster_url,
            trailer_url: record.trailer_url,
        }
    }
}

/// Serialized listing pages kept in a [`ListingCache`].
///
/// Every failure here degrades to a miss; the store stays authoritative.
#[derive(Clone)]
struct CachedListings {
    backend: Arc<dyn ListingCache>,
    ttl: Duration,
    prefix: String,
}

impl CachedListings {
    async fn lookup(&self, key: &str) -> Option<Vec<MovieRecord>> {
        let backend = self.backend.name();
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                counter!("marquee_cache_miss_total", "backend" => backend).increment(1);
                return None;
            }
            Err(err) => {
                counter!("marquee_cache_error_total", "backend" => backend, "op" => "get")
                    .increment(1);
                warn!(target: CACHE_TARGET, key, error = %err, "listing cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => {
                counter!("marquee_cache_hit_total", "backend" => backend).increment(1);
                debug!(target: CACHE_TARGET, key, "listing cache hit");
                Some(items)
            }
            Err(err) => {
                counter!("marquee_cache_error_total", "backend" => backend, "op" => "decode")
                    .increment(1);
                warn!(target: CACHE_TARGET, key, error = %err, "discarding undecodable cached listing");
                None
            }
        }
    }

    async fn store(&self, key: &str, items: &[MovieRecord]) {
        let encoded = match serde_json::to_string(items) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(target: CACHE_TARGET, key, error = %err, "listing could not be encoded for caching");
                return;
            }
        };

        if let Err(err) = self.backend.set(key, encoded, self.ttl).await {
            counter!("marquee_cache_error_total", "backend" => self.backend.name(), "op" => "set")
                .increment(1);
            warn!(target: CACHE_TARGET, key, error = %err, "listing cache write failed");
        }
    }

    async fn invalidate(&self) {
        match self.backend.invalidate(&self.prefix).await {
            Ok(removed) => {
                debug!(target: CACHE_TARGET, prefix = %self.prefix, removed, "listing cache invalidated");
            }
            Err(err) => {
                counter!(
                    "marquee_cache_error_total",
                    "backend" => self.backend.name(),
                    "op" => "invalidate"
                )
                .increment(1);
                warn!(target: CACHE_TARGET, prefix = %self.prefix, error = %err, "listing cache invalidation failed");
            }
        }
    }
}

#[derive(Clone)]
pub struct MovieService {
    reader: Arc<dyn MoviesRepo>,
    writer: Arc<dyn MoviesWriteRepo>,
    cache: Option<CachedListings>,
}

impl MovieService {
    pub fn new(reader: Arc<dyn MoviesRepo>, writer: Arc<dyn MoviesWriteRepo>) -> Self {
        Self {
            reader,
            writer,
            cache: None,
        }
    }

    /// Serve listings through `cache`, storing pages for `ttl` under `prefix`.
    pub fn with_cache(
        mut self,
        cache: Arc<dyn ListingCache>,
        ttl: Duration,
        prefix: impl Into<String>,
    ) -> Self {
        self.cache = Some(CachedListings {
            backend: cache,
            ttl,
            prefix: prefix.into(),
        });
        self
    }

    /// List movies after normalizing the raw parameters.
    ///
    /// The total always comes from the store; only the page of items may be
    /// served from cache.
    pub async fn list(
        &self,
        params: MovieListParams,
    ) -> Result<OffsetPage<MovieRecord>, MovieServiceError> {
        let query = MovieQuery::normalize(params);
        let total = self.reader.count_movies(&query).await?;
        let items = self.fetch_page(&query).await?;
        Ok(OffsetPage::new(items, total, &query))
    }

    async fn fetch_page(&self, query: &MovieQuery) -> Result<Vec<MovieRecord>, RepoError> {
        let Some(cache) = self.cache.as_ref() else {
            return self.reader.list_movies(query).await;
        };

        let key = match listing_cache_key(&cache.prefix, query) {
            Ok(key) => key,
            Err(err) => {
                warn!(target: CACHE_TARGET, error = %err, "listing cache key could not be derived");
                return self.reader.list_movies(query).await;
            }
        };

        if let Some(items) = cache.lookup(&key).await {
            return Ok(items);
        }

        let items = self.reader.list_movies(query).await?;
        cache.store(&key, &items).await;
        Ok(items)
    }

    pub async fn get(&self, id: i64) -> Result<MovieRecord, MovieServiceError> {
        self.reader
            .find_movie(id)
            .await?
            .ok_or_else(|| DomainError::not_found("movie").into())
    }

    pub async fn create(&self, command: MovieCommand) -> Result<MovieRecord, MovieServiceError> {
        let params = command.into_params()?;
        let movie = self.writer.create_movie(params).await?;
        self.invalidate_listings().await;
        Ok(movie)
    }

    pub async fn update(
        &self,
        id: i64,
        command: MovieCommand,
    ) -> Result<MovieRecord, MovieServiceError> {
        let params = command.into_params()?;
        let movie = self.writer.update_movie(id, params).await?;
        self.invalidate_listings().await;
        Ok(movie)
    }

    pub async fn delete(&self, id: i64) -> Result<(), MovieServiceError> {
        self.writer.delete_movie(id).await?;
        self.invalidate_listings().await;
        Ok(())
    }

    /// Record a trailer URL for the movie in one atomic update.
    pub async fn set_trailer_url(
        &self,
        id: i64,
        url: &str,
    ) -> Result<MovieRecord, MovieServiceError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DomainError::validation("url", "must not be empty").into());
        }
        let movie = self.writer.set_trailer_url(id, url).await?;
        self.invalidate_listings().await;
        Ok(movie)
    }

    async fn invalidate_listings(&self) {
        if let Some(cache) = self.cache.as_ref() {
            cache.invalidate().await;
        }
    }
}
