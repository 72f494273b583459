use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::Date;

use crate::{
    application::{
        pagination::sql_offset,
        repos::{MovieParams, MoviesRepo, MoviesWriteRepo, RepoError},
    },
    domain::{entities::MovieRecord, listing::MovieQuery},
};

use super::{PostgresRepositories, like_pattern, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    description: String,
    release_date: Option<Date>,
    genre: String,
    director: String,
    rating: f64,
    duration: i32,
    language: String,
    poster_url: String,
    trailer_url: String,
}

impl From<MovieRow> for MovieRecord {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            release_date: row.release_date,
            genre: row.genre,
            director: row.director,
            rating: row.rating,
            duration: row.duration,
            language: row.language,
            poster_url: row.poster_url,
            trailer_url: row.trailer_url,
        }
    }
}

fn apply_filter(qb: &mut QueryBuilder<'_, Postgres>, query: &MovieQuery) {
    let text_filters = [
        ("title", query.search.as_deref()),
        ("genre", query.genre.as_deref()),
        ("language", query.language.as_deref()),
    ];
    for (column, value) in text_filters {
        if let Some(value) = value {
            qb.push(" AND ");
            qb.push(column);
            qb.push(" ILIKE ");
            qb.push_bind(like_pattern(value));
            qb.push(" ESCAPE '\\'");
        }
    }

    if let Some(min_rating) = query.min_rating {
        qb.push(" AND rating >= ");
        qb.push_bind(min_rating);
    }
}

#[async_trait]
impl MoviesRepo for PostgresRepositories {
    async fn list_movies(&self, query: &MovieQuery) -> Result<Vec<MovieRecord>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT id, title, description, release_date, genre, director, rating, duration, \
             language, poster_url, trailer_url \
             FROM movies WHERE 1=1",
        );

        apply_filter(&mut qb, query);

        // Sort columns come from the allow-list; id breaks ties so pages never overlap.
        qb.push(" ORDER BY ");
        qb.push(query.sort_by.column());
        qb.push(" ");
        qb.push(query.order.as_sql());
        qb.push(" NULLS LAST, id ASC");
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(query.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(sql_offset(query));

        let rows = qb
            .build_query_as::<MovieRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MovieRecord::from).collect())
    }

    async fn count_movies(&self, query: &MovieQuery) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM movies WHERE 1=1");
        apply_filter(&mut qb, query);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        PostgresRepositories::convert_count(count)
    }

    async fn find_movie(&self, id: i64) -> Result<Option<MovieRecord>, RepoError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            SELECT id, title, description, release_date, genre, director, rating, duration,
                   language, poster_url, trailer_url
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(MovieRecord::from))
    }
}

#[async_trait]
impl MoviesWriteRepo for PostgresRepositories {
    async fn create_movie(&self, params: MovieParams) -> Result<MovieRecord, RepoError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            INSERT INTO movies (title, description, release_date, genre, director, rating,
                                duration, language, poster_url, trailer_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, title, description, release_date, genre, director, rating, duration,
                      language, poster_url, trailer_url
            "#,
        )
        .bind(params.title)
        .bind(params.description)
        .bind(params.release_date)
        .bind(params.genre)
        .bind(params.director)
        .bind(params.rating)
        .bind(params.duration)
        .bind(params.language)
        .bind(params.poster_url)
        .bind(params.trailer_url)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_movie(&self, id: i64, params: MovieParams) -> Result<MovieRecord, RepoError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            UPDATE movies
            SET title = $2,
                description = $3,
                release_date = $4,
                genre = $5,
                director = $6,
                rating = $7,
                duration = $8,
                language = $9,
                poster_url = $10,
                trailer_url = $11
            WHERE id = $1
            RETURNING id, title, description, release_date, genre, director, rating, duration,
                      language, poster_url, trailer_url
            "#,
        )
        .bind(id)
        .bind(params.title)
        .bind(params.description)
        .bind(params.release_date)
        .bind(params.genre)
        .bind(params.director)
        .bind(params.rating)
        .bind(params.duration)
        .bind(params.language)
        .bind(params.poster_url)
        .bind(params.trailer_url)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(MovieRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_movie(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn set_trailer_url(&self, id: i64, url: &str) -> Result<MovieRecord, RepoError> {
        let row = sqlx::query_as::<_, MovieRow>(
            r#"
            UPDATE movies
            SET trailer_url = $2
            WHERE id = $1
            RETURNING id, title, description, release_date, genre, director, rating, duration,
                      language, poster_url, trailer_url
            "#,
        )
        .bind(id)
        .bind(url)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(MovieRecord::from).ok_or(RepoError::NotFound)
    }
}
