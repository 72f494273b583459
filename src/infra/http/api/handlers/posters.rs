//! Poster handlers

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use super::{path_id, poster_to_api, read_file_field};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::PosterResponse;
use crate::infra::http::api::state::ApiState;

pub const POSTER_FIELD: &str = "poster";

pub async fn upload_poster(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let movie_id = path_id(path)?;
    let file = read_file_field(&mut multipart, POSTER_FIELD).await?;

    let poster = state
        .posters
        .save(movie_id, file.data.to_vec(), file.content_type.as_deref())
        .await
        .map_err(poster_to_api)?;

    Ok((StatusCode::CREATED, Json(PosterResponse::from(&poster))))
}

pub async fn get_poster(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let movie_id = path_id(path)?;
    let poster = state.posters.get(movie_id).await.map_err(poster_to_api)?;

    let length = poster.data.len();
    let mut response = Response::new(Body::from(poster.data));
    let headers = response.headers_mut();
    let content_type = HeaderValue::from_str(&poster.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));

    Ok(response)
}

pub async fn delete_poster(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let movie_id = path_id(path)?;
    state.posters.delete(movie_id).await.map_err(poster_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
