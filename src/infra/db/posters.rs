use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    application::repos::{NewPoster, PostersRepo, RepoError},
    domain::entities::PosterRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct PosterRow {
    id: i64,
    movie_id: i64,
    poster: Vec<u8>,
    mime_type: String,
    created_at: OffsetDateTime,
}

impl From<PosterRow> for PosterRecord {
    fn from(row: PosterRow) -> Self {
        Self {
            id: row.id,
            movie_id: row.movie_id,
            data: row.poster,
            mime_type: row.mime_type,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PostersRepo for PostgresRepositories {
    async fn replace_poster(&self, poster: NewPoster) -> Result<PosterRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM movie_posters WHERE movie_id = $1")
            .bind(poster.movie_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let row = sqlx::query_as::<_, PosterRow>(
            r#"
            INSERT INTO movie_posters (movie_id, poster, mime_type)
            VALUES ($1, $2, $3)
            RETURNING id, movie_id, poster, mime_type, created_at
            "#,
        )
        .bind(poster.movie_id)
        .bind(poster.data)
        .bind(poster.mime_type)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_poster(&self, movie_id: i64) -> Result<Option<PosterRecord>, RepoError> {
        let row = sqlx::query_as::<_, PosterRow>(
            r#"
            SELECT id, movie_id, poster, mime_type, created_at
            FROM movie_posters
            WHERE movie_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(movie_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PosterRecord::from))
    }

    async fn delete_poster(&self, movie_id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM movie_posters WHERE movie_id = $1")
            .bind(movie_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
