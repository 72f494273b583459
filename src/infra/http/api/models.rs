use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::application::movies::MovieCommand;
use crate::application::pagination::OffsetPage;
use crate::application::reviews::ReviewCommand;
use crate::domain::entities::{MovieRecord, PosterRecord, release_date};

/// Body of `POST /movies` and `PUT /movies/{id}`. Absent fields take empty values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MovieRequest {
    #[serde(default)]
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
}

impl From<MovieRequest> for MovieCommand {
    fn from(request: MovieRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            release_date: request.release_date,
            genre: request.genre,
            director: request.director,
            rating: request.rating,
            duration: request.duration,
            language: request.language,
            poster_url: request.poster_url,
            trailer_url: request.trailer_url,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieRecord>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl From<OffsetPage<MovieRecord>> for MovieListResponse {
    fn from(page: OffsetPage<MovieRecord>) -> Self {
        Self {
            movies: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReviewCreateRequest {
    pub movie_id: i64,
    #[serde(default)]
    pub comment: String,
}

impl From<ReviewCreateRequest> for ReviewCommand {
    fn from(request: ReviewCreateRequest) -> Self {
        Self {
            movie_id: request.movie_id,
            comment: request.comment,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PosterResponse {
    pub id: i64,
    pub movie_id: i64,
    pub mime_type: String,
    pub size_bytes: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&PosterRecord> for PosterResponse {
    fn from(record: &PosterRecord) -> Self {
        Self {
            id: record.id,
            movie_id: record.movie_id,
            mime_type: record.mime_type.clone(),
            size_bytes: record.data.len(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrailerUrlQuery {
    pub url: Option<String>,
}
