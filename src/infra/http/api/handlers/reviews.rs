//! Review handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::{json_body, path_id, review_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::ReviewCreateRequest;
use crate::infra::http::api::state::ApiState;

pub async fn list_movie_reviews(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let movie_id = path_id(path)?;
    let reviews = state
        .reviews
        .list_for_movie(movie_id)
        .await
        .map_err(review_to_api)?;

    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<ApiState>,
    payload: Result<Json<ReviewCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;
    let review = state
        .reviews
        .create(request.into())
        .await
        .map_err(review_to_api)?;

    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn delete_review(
    State(state): State<ApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = path_id(path)?;
    state.reviews.delete(id).await.map_err(review_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
