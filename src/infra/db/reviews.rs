use async_trait::async_trait;

use crate::{
    application::repos::{RepoError, ReviewsRepo},
    domain::entities::ReviewRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    movie_id: i64,
    comment: String,
}

impl From<ReviewRow> for ReviewRecord {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            movie_id: row.movie_id,
            comment: row.comment,
        }
    }
}

#[async_trait]
impl ReviewsRepo for PostgresRepositories {
    async fn list_for_movie(&self, movie_id: i64) -> Result<Vec<ReviewRecord>, RepoError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, movie_id, comment
            FROM reviews
            WHERE movie_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(movie_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ReviewRecord::from).collect())
    }

    async fn create_review(
        &self,
        movie_id: i64,
        comment: &str,
    ) -> Result<ReviewRecord, RepoError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (movie_id, comment)
            VALUES ($1, $2)
            RETURNING id, movie_id, comment
            "#,
        )
        .bind(movie_id)
        .bind(comment)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn delete_review(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
