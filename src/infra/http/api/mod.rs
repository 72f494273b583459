pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};

/// Request body ceilings for the upload routes.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimits {
    pub poster_bytes: usize,
    pub trailer_bytes: usize,
}

pub fn build_api_router(state: ApiState, limits: BodyLimits) -> Router {
    Router::new()
        .route(
            "/movies",
            get(handlers::list_movies).post(handlers::create_movie),
        )
        .route(
            "/movies/{id}",
            get(handlers::get_movie)
                .put(handlers::update_movie)
                .delete(handlers::delete_movie),
        )
        .route(
            "/movies/{id}/poster",
            get(handlers::get_poster)
                .post(handlers::upload_poster)
                .delete(handlers::delete_poster)
                .layer(DefaultBodyLimit::max(limits.poster_bytes)),
        )
        .route(
            "/movies/{id}/trailer",
            post(handlers::upload_trailer)
                .put(handlers::set_trailer_url)
                .layer(DefaultBodyLimit::max(limits.trailer_bytes)),
        )
        .route(
            "/reviews/movie/{movie_id}",
            get(handlers::list_movie_reviews),
        )
        .route("/reviews", post(handlers::create_review))
        .route("/reviews/{id}", delete(handlers::delete_review))
        .route("/media/{*key}", get(handlers::serve_media))
        .with_state(state)
}
