//! One-shot bulk import of a JSON movie catalog.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use time::Date;
use tokio::fs;
use tracing::{debug, info};

use crate::application::movies::{MovieCommand, MovieService, MovieServiceError};
use crate::application::reviews::{ReviewCommand, ReviewService, ReviewServiceError};
use crate::domain::entities::release_date;

const TARGET: &str = "marquee::loader";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read catalog `{path}`")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog is not a JSON array of movies")]
    Parse(#[from] serde_json::Error),
    #[error("failed to import movie #{index} `{title}`")]
    Movie {
        index: usize,
        title: String,
        #[source]
        source: MovieServiceError,
    },
    #[error("failed to import review #{review} of movie #{index}")]
    Review {
        index: usize,
        review: usize,
        #[source]
        source: ReviewServiceError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub movies: usize,
    pub reviews: usize,
}

/// Movie object as it appears in a catalog file. Ids are ignored; the store assigns them.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogMovie {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "release_date")]
    pub release_date: Option<Date>,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub duration: i32,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default)]
    pub trailer_url: String,
    #[serde(default)]
    pub reviews: Vec<CatalogReview>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogReview {
    pub comment: String,
}

impl CatalogMovie {
    fn command(&self) -> MovieCommand {
        MovieCommand {
            title: self.title.clone(),
            description: self.description.clone(),
            release_date: self.release_date,
            genre: self.genre.clone(),
            director: self.director.clone(),
            rating: self.rating,
            duration: self.duration,
            language: self.language.clone(),
            poster_url: self.poster_url.clone(),
            trailer_url: self.trailer_url.clone(),
        }
    }
}

pub fn parse_catalog(raw: &str) -> Result<Vec<CatalogMovie>, LoaderError> {
    Ok(serde_json::from_str(raw)?)
}

/// Read `path` and import every movie, with its reviews, in file order.
///
/// Stops at the first failing record; records imported before it remain.
pub async fn load_catalog(
    movies: &MovieService,
    reviews: &ReviewService,
    path: &Path,
) -> Result<LoadSummary, LoaderError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| LoaderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let catalog = parse_catalog(&raw)?;
    info!(
        target: TARGET,
        path = %path.display(),
        entries = catalog.len(),
        "importing catalog"
    );

    import_catalog(movies, reviews, catalog).await
}

pub async fn import_catalog(
    movies: &MovieService,
    reviews: &ReviewService,
    catalog: Vec<CatalogMovie>,
) -> Result<LoadSummary, LoaderError> {
    let mut summary = LoadSummary::default();

    for (index, entry) in catalog.into_iter().enumerate() {
        let movie = movies
            .create(entry.command())
            .await
            .map_err(|source| LoaderError::Movie {
                index,
                title: entry.title.clone(),
                source,
            })?;
        summary.movies += 1;

        for (review, item) in entry.reviews.into_iter().enumerate() {
            reviews
                .create(ReviewCommand {
                    movie_id: movie.id,
                    comment: item.comment,
                })
                .await
                .map_err(|source| LoaderError::Review {
                    index,
                    review,
                    source,
                })?;
            summary.reviews += 1;
        }

        debug!(target: TARGET, index, movie_id = movie.id, title = %movie.title, "movie imported");
    }

    info!(
        target: TARGET,
        movies = summary.movies,
        reviews = summary.reviews,
        "catalog import finished"
    );
    Ok(summary)
}
