use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{ModuleActivityRepository, StageProgressRepository, Storage};

mod activity_repo;
mod mapping;
mod migrate;
mod stage_repo;

pub use migrate::LATEST_VERSION;

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or if
    /// the connection pragmas fail during setup.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL;")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA busy_timeout = 5000;")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await?;
        let version = self.schema_version().await?;
        tracing::debug!(version, "sqlite schema ready");
        Ok(())
    }

    /// Highest applied schema version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the migrations table cannot be read.
    pub async fn schema_version(&self) -> Result<i64, SqliteInitError> {
        migrate::current_version(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let stages: Arc<dyn StageProgressRepository> = Arc::new(repo.clone());
        let activity: Arc<dyn ModuleActivityRepository> = Arc::new(repo);
        Ok(Self { stages, activity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_backs_both_storage_traits() {
        fn assert_repos<T: StageProgressRepository + ModuleActivityRepository + Clone>() {}
        assert_repos::<SqliteRepository>();
    }

    #[tokio::test]
    async fn fresh_database_reaches_latest_version() {
        let repo = SqliteRepository::connect("sqlite:file:memdb_version?mode=memory&cache=shared")
            .await
            .expect("connect");
        repo.migrate().await.expect("migrate");
        assert_eq!(repo.schema_version().await.unwrap(), LATEST_VERSION);
    }
}
