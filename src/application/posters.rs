use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{NewPoster, PostersRepo, RepoError};
use crate::domain::entities::PosterRecord;
use crate::domain::error::DomainError;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum PosterServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for PosterServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::Domain(DomainError::not_found("poster")),
            other => Self::Repo(other),
        }
    }
}

#[derive(Clone)]
pub struct PosterService {
    repo: Arc<dyn PostersRepo>,
}

impl PosterService {
    pub fn new(repo: Arc<dyn PostersRepo>) -> Self {
        Self { repo }
    }

    /// Store `data` as the movie's poster, replacing any previous one.
    pub async fn save(
        &self,
        movie_id: i64,
        data: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<PosterRecord, PosterServiceError> {
        if data.is_empty() {
            return Err(DomainError::validation("poster", "payload is empty").into());
        }

        let mime_type = mime_type
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(FALLBACK_MIME)
            .to_string();

        Ok(self
            .repo
            .replace_poster(NewPoster {
                movie_id,
                data,
                mime_type,
            })
            .await?)
    }

    pub async fn get(&self, movie_id: i64) -> Result<PosterRecord, PosterServiceError> {
        self.repo
            .find_poster(movie_id)
            .await?
            .ok_or_else(|| DomainError::not_found("poster").into())
    }

    pub async fn delete(&self, movie_id: i64) -> Result<(), PosterServiceError> {
        Ok(self.repo.delete_poster(movie_id).await?)
    }
}
