use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::movies::{MovieService, MovieServiceError};
use crate::domain::entities::MovieRecord;
use crate::domain::error::DomainError;
use crate::infra::storage::{ObjectStorage, StorageError, trailer_key};

#[derive(Debug, Error)]
pub enum TrailerServiceError {
    #[error(transparent)]
    Movie(#[from] MovieServiceError),
    #[error("trailer storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Stores trailer files and points movies at their public URL.
#[derive(Clone)]
pub struct TrailerService {
    movies: Arc<MovieService>,
    storage: Arc<ObjectStorage>,
}

impl TrailerService {
    pub fn new(movies: Arc<MovieService>, storage: Arc<ObjectStorage>) -> Self {
        Self { movies, storage }
    }

    /// Upload a trailer and record its URL on the movie.
    ///
    /// The payload is staged first and only published once the movie points
    /// at it; if the update fails the staged copy is discarded and any
    /// trailer already stored under the same key is left in place.
    pub async fn upload(
        &self,
        movie_id: i64,
        filename: &str,
        data: Bytes,
    ) -> Result<MovieRecord, TrailerServiceError> {
        if data.is_empty() {
            return Err(MovieServiceError::from(DomainError::validation(
                "trailer",
                "payload is empty",
            ))
            .into());
        }

        let key = trailer_key(movie_id, filename);
        let staged = self.storage.stage(&key, data).await?;
        let url = self.storage.public_url(staged.key());

        let movie = match self.movies.set_trailer_url(movie_id, &url).await {
            Ok(movie) => movie,
            Err(err) => {
                if let Err(cleanup) = self.storage.discard(staged).await {
                    warn!(
                        target: "marquee::trailers",
                        movie_id,
                        key = %key,
                        error = %cleanup,
                        "failed to remove staged trailer object"
                    );
                }
                return Err(err.into());
            }
        };

        let stored = self.storage.commit(staged).await?;
        info!(
            target: "marquee::trailers",
            movie_id,
            key = %stored.key,
            size_bytes = stored.size_bytes,
            checksum = %stored.checksum,
            "trailer stored"
        );
        Ok(movie)
    }

    /// Point the movie at an externally hosted trailer.
    pub async fn set_url(&self, movie_id: i64, url: &str) -> Result<MovieRecord, TrailerServiceError> {
        Ok(self.movies.set_trailer_url(movie_id, url).await?)
    }
}
