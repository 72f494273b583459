use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{RepoError, ReviewsRepo};
use crate::domain::entities::ReviewRecord;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for ReviewServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::Domain(DomainError::not_found("review")),
            other => Self::Repo(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewCommand {
    pub movie_id: i64,
    pub comment: String,
}

#[derive(Clone)]
pub struct ReviewService {
    repo: Arc<dyn ReviewsRepo>,
}

impl ReviewService {
    pub fn new(repo: Arc<dyn ReviewsRepo>) -> Self {
        Self { repo }
    }

    pub async fn list_for_movie(
        &self,
        movie_id: i64,
    ) -> Result<Vec<ReviewRecord>, ReviewServiceError> {
        Ok(self.repo.list_for_movie(movie_id).await?)
    }

    pub async fn create(&self, command: ReviewCommand) -> Result<ReviewRecord, ReviewServiceError> {
        let comment = command.comment.trim();
        if comment.is_empty() {
            return Err(DomainError::validation("comment", "must not be empty").into());
        }
        Ok(self.repo.create_review(command.movie_id, comment).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ReviewServiceError> {
        Ok(self.repo.delete_review(id).await?)
    }
}
