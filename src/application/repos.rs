//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;

use crate::domain::entities::{MovieRecord, PosterRecord, ReviewRecord};
use crate::domain::listing::MovieQuery;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Column values written on movie insert and full replace.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieParams {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoster {
    pub movie_id: i64,
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[async_trait]
pub trait MoviesRepo: Send + Sync {
    /// Fetch one page of movies matching the query, ordered by the query's sort.
    async fn list_movies(&self, query: &MovieQuery) -> Result<Vec<MovieRecord>, RepoError>;

    /// Count every movie matching the query's filters, ignoring pagination.
    async fn count_movies(&self, query: &MovieQuery) -> Result<u64, RepoError>;

    async fn find_movie(&self, id: i64) -> Result<Option<MovieRecord>, RepoError>;
}

#[async_trait]
pub trait MoviesWriteRepo: Send + Sync {
    async fn create_movie(&self, params: MovieParams) -> Result<MovieRecord, RepoError>;

    /// Replace every column of an existing movie. Missing rows yield `NotFound`.
    async fn update_movie(&self, id: i64, params: MovieParams) -> Result<MovieRecord, RepoError>;

    async fn delete_movie(&self, id: i64) -> Result<(), RepoError>;

    /// Set the trailer URL in a single statement. Missing rows yield `NotFound`.
    async fn set_trailer_url(&self, id: i64, url: &str) -> Result<MovieRecord, RepoError>;
}

#[async_trait]
pub trait ReviewsRepo: Send + Sync {
    async fn list_for_movie(&self, movie_id: i64) -> Result<Vec<ReviewRecord>, RepoError>;

    async fn create_review(&self, movie_id: i64, comment: &str)
    -> Result<ReviewRecord, RepoError>;

    async fn delete_review(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostersRepo: Send + Sync {
    /// Drop any poster stored for the movie and insert the new one atomically.
    async fn replace_poster(&self, poster: NewPoster) -> Result<PosterRecord, RepoError>;

    /// Newest poster stored for the movie.
    async fn find_poster(&self, movie_id: i64) -> Result<Option<PosterRecord>, RepoError>;

    /// Remove every poster of the movie. Nothing stored yields `NotFound`.
    async fn delete_poster(&self, movie_id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn health_check(&self) -> Result<(), RepoError>;
}
