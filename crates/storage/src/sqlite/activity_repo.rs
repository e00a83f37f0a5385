use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tutor_core::model::ModuleId;

use crate::repository::{ModuleActivity, ModuleActivityRepository, StorageError};

use super::SqliteRepository;
use super::mapping::{conn, map_activity_row};

#[async_trait]
impl ModuleActivityRepository for SqliteRepository {
    async fn record_started(
        &self,
        module_id: &ModuleId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO module_activity (module_id, started_at, completed_at, start_count)
            VALUES (?1, ?2, NULL, 1)
            ON CONFLICT(module_id) DO UPDATE SET
                started_at = COALESCE(module_activity.started_at, excluded.started_at),
                start_count = module_activity.start_count + 1
            ",
        )
        .bind(module_id.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn record_completed(
        &self,
        module_id: &ModuleId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO module_activity (module_id, started_at, completed_at, start_count)
            VALUES (?1, ?2, ?2, 0)
            ON CONFLICT(module_id) DO UPDATE SET
                started_at = COALESCE(module_activity.started_at, excluded.started_at),
                completed_at = COALESCE(module_activity.completed_at, excluded.completed_at)
            ",
        )
        .bind(module_id.as_str())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn get_activity(
        &self,
        module_id: &ModuleId,
    ) -> Result<Option<ModuleActivity>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT module_id, started_at, completed_at, start_count
            FROM module_activity
            WHERE module_id = ?1
            ",
        )
        .bind(module_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_activity_row).transpose()
    }

    async fn list_activity(&self) -> Result<Vec<ModuleActivity>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT module_id, started_at, completed_at, start_count
            FROM module_activity
            ORDER BY module_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_activity_row).collect()
    }
}
