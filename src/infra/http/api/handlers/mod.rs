//! API handlers organized by resource type.
//!
//! Extraction helpers and error conversions shared by the resource modules
//! live here.

mod media;
mod movies;
mod posters;
mod reviews;
mod trailers;

pub use media::*;
pub use movies::*;
pub use posters::*;
pub use reviews::*;
pub use trailers::*;

// ----- Shared extraction -----

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use bytes::Bytes;

use crate::domain::listing::MovieListParams;

/// Raw listing query string. Every value is parsed leniently; anything
/// unparsable is treated as absent and later defaulted.
#[derive(Debug, Default)]
pub struct MovieListQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub rating: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    /// `pageSize`
    pub page_size_camel: Option<String>,
    pub page_size: Option<String>,
}

impl MovieListQuery {
    /// Parse a raw query string. Repeated keys keep their first value and
    /// unknown keys are ignored, so this never fails.
    pub fn from_query_string(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match key.as_ref() {
                "search" => &mut query.search,
                "genre" => &mut query.genre,
                "language" => &mut query.language,
                "rating" => &mut query.rating,
                "sort_by" => &mut query.sort_by,
                "order" => &mut query.order,
                "page" => &mut query.page,
                "pageSize" => &mut query.page_size_camel,
                "page_size" => &mut query.page_size,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }

    pub fn into_params(self) -> MovieListParams {
        let page_size = self.page_size_camel.or(self.page_size);
        MovieListParams {
            search: self.search,
            genre: self.genre,
            language: self.language,
            rating: parse_lenient(self.rating.as_deref()),
            sort_by: self.sort_by,
            order: self.order,
            page: parse_lenient(self.page.as_deref()),
            page_size: parse_lenient(page_size.as_deref()),
        }
    }
}

fn parse_lenient<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|raw| raw.trim().parse().ok())
}

pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|err| ApiError::bad_request("invalid id", Some(err.body_text())))
}

pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|err| ApiError::bad_request("invalid request body", Some(err.body_text())))
}

/// File part pulled out of a multipart request.
pub(crate) struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Read the first part named `field`; other parts are skipped.
pub(crate) async fn read_file_field(
    multipart: &mut Multipart,
    field: &'static str,
) -> Result<UploadedFile, ApiError> {
    while let Some(part) = multipart.next_field().await.map_err(multipart_to_api)? {
        if part.name() == Some(field) {
            let filename = part.file_name().map(str::to_string);
            let content_type = part.content_type().map(str::to_string);
            let data = part.bytes().await.map_err(multipart_to_api)?;
            return Ok(UploadedFile {
                filename,
                content_type,
                data,
            });
        }
    }

    Err(ApiError::bad_request(
        "missing file",
        Some(format!("multipart field `{field}` is required")),
    ))
}

fn multipart_to_api(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            codes::PAYLOAD_TOO_LARGE,
            "Upload exceeds the size limit",
            Some(err.body_text()),
        );
    }
    ApiError::bad_request("invalid multipart payload", Some(err.body_text()))
}

// ----- Shared error conversions -----

use axum::http::StatusCode;

use crate::application::movies::MovieServiceError;
use crate::application::posters::PosterServiceError;
use crate::application::repos::RepoError;
use crate::application::reviews::ReviewServiceError;
use crate::application::trailers::TrailerServiceError;
use crate::domain::error::DomainError;
use crate::infra::storage::StorageError;

use super::error::{ApiError, codes};

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found", None),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(msg) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(msg),
        ),
    }
}

pub(crate) fn domain_to_api(err: DomainError) -> ApiError {
    match err {
        DomainError::NotFound { entity } => {
            ApiError::not_found("resource not found", Some(format!("{entity} not found")))
        }
        invalid @ DomainError::Validation { .. } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(invalid.to_string()),
        ),
    }
}

pub(crate) fn movie_to_api(err: MovieServiceError) -> ApiError {
    match err {
        MovieServiceError::Domain(domain) => domain_to_api(domain),
        MovieServiceError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn review_to_api(err: ReviewServiceError) -> ApiError {
    match err {
        ReviewServiceError::Domain(domain) => domain_to_api(domain),
        ReviewServiceError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn poster_to_api(err: PosterServiceError) -> ApiError {
    match err {
        PosterServiceError::Domain(domain) => domain_to_api(domain),
        PosterServiceError::Repo(repo) => repo_to_api(repo),
    }
}

pub(crate) fn trailer_to_api(err: TrailerServiceError) -> ApiError {
    match err {
        TrailerServiceError::Movie(movie) => movie_to_api(movie),
        TrailerServiceError::Storage(storage) => storage_to_api(storage),
    }
}

pub(crate) fn storage_to_api(err: StorageError) -> ApiError {
    match err {
        StorageError::InvalidKey | StorageError::EmptyPayload => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid object",
            Some(err.to_string()),
        ),
        other => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::STORAGE,
            "Failed to store object",
            Some(other.to_string()),
        ),
    }
}
