//! Postgres-backed repository implementations.

mod movies;
mod posters;
mod reviews;
mod util;

pub use util::{like_pattern, map_sqlx_error};

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    Postgres, Transaction,
    migrate::MigrateError,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::repos::{HealthRepo, RepoError};

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(pool).await
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}

#[async_trait]
impl HealthRepo for PostgresRepositories {
    async fn health_check(&self) -> Result<(), RepoError> {
        query("SELECT 1")
            .execute(self.pool())
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}
