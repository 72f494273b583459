//! Movie handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::{MovieListQuery, json_body, movie_to_api, path_id};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{MovieListResponse, MovieRequest};
use crate::infra::http::api::state::ApiState;

pub async fn list_movies(
    State(state): State<ApiState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, ApiError> {
    let query = MovieListQuery::from_query_string(raw.as_deref());
    let page = state
        .movies
        .list(query.into_params())
        .await
        .map_err(movie_to_api)?;

    Ok(Json(MovieListResponse::from(page)))
}

pub async fn get_movie(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(path)?;
    let movie = state.movies.get(id).await.map_err(movie_to_api)?;
    Ok(Json(movie))
}

pub async fn create_movie(
    State(state): State<ApiState>,
    payload: Result<Json<MovieRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let movie = state
        .movies
        .create(request.into())
        .await
        .map_err(movie_to_api)?;

    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MovieRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(path)?;
    let request = json_body(payload)?;
    let movie = state
        .movies
        .update(id, request.into())
        .await
        .map_err(movie_to_api)?;

    Ok(Json(movie))
}

pub async fn delete_movie(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(path)?;
    state.movies.delete(id).await.map_err(movie_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
