//! Trailer handlers

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::response::IntoResponse;

use super::{path_id, read_file_field, trailer_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::TrailerUrlQuery;
use crate::infra::http::api::state::ApiState;

pub const TRAILER_FIELD: &str = "trailer";

pub async fn upload_trailer(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let movie_id = path_id(path)?;
    let file = read_file_field(&mut multipart, TRAILER_FIELD).await?;
    let filename = file.filename.as_deref().unwrap_or_default();

    let movie = state
        .trailers
        .upload(movie_id, filename, file.data)
        .await
        .map_err(trailer_to_api)?;

    Ok(Json(movie))
}

pub async fn set_trailer_url(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<TrailerUrlQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let movie_id = path_id(path)?;
    let Query(query) = query
        .map_err(|err| ApiError::bad_request("invalid query string", Some(err.body_text())))?;
    let url = query.url.unwrap_or_default();

    let movie = state
        .trailers
        .set_url(movie_id, &url)
        .await
        .map_err(trailer_to_api)?;

    Ok(Json(movie))
}
