pub mod api;
mod middleware;

pub use api::{ApiState, BodyLimits, build_api_router};
pub use middleware::{REQUEST_ID_HEADER, RequestContext};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Router, middleware as axum_middleware, routing::get};

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;

use self::middleware::{log_responses, set_request_context};

/// Assemble the full application router: API routes, health check and the
/// request logging stack.
pub fn build_router(state: ApiState, limits: BodyLimits) -> Router {
    let health = Router::new()
        .route("/_health/db", get(db_health))
        .with_state(state.clone());

    build_api_router(state, limits)
        .merge(health)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn db_health(State(state): State<ApiState>) -> Response {
    db_health_response(state.health.health_check().await)
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
