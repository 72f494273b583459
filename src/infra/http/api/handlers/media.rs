//! Stored media served back from object storage.

use std::io::ErrorKind;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::error;

use super::storage_to_api;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::state::ApiState;
use crate::infra::storage::StorageError;

const SOURCE: &str = "marquee::http::media";

pub async fn serve_media(State(state): State<ApiState>, Path(key): Path<String>) -> Response {
    match state.storage.read(&key).await {
        Ok(bytes) => build_media_response(&key, bytes),
        Err(StorageError::InvalidKey) => {
            ApiError::not_found("media not found", None).into_response()
        }
        Err(StorageError::Io(err))
            if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) =>
        {
            ApiError::not_found("media not found", None).into_response()
        }
        Err(err) => {
            error!(
                target: SOURCE,
                key = %key,
                error = %err,
                "failed to read stored media"
            );
            storage_to_api(err).into_response()
        }
    }
}

fn build_media_response(key: &str, bytes: Bytes) -> Response {
    let length = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    let mime = mime_guess::from_path(key).first_or_octet_stream();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=3600"));

    response
}
