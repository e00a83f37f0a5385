use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tutor_core::model::ModuleId;

use crate::repository::{StageProgressRepository, StageRecord, StorageError};

use super::SqliteRepository;
use super::mapping::{conn, map_stage_row, ser};

#[async_trait]
impl StageProgressRepository for SqliteRepository {
    async fn load_stage(&self, module_id: &ModuleId) -> Result<Option<i64>, StorageError> {
        let row = sqlx::query("SELECT current_stage FROM module_progress WHERE module_id = ?1")
            .bind(module_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| row.try_get::<i64, _>("current_stage").map_err(ser))
            .transpose()
    }

    async fn save_stage(
        &self,
        module_id: &ModuleId,
        stage: i64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO module_progress (module_id, current_stage, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(module_id) DO UPDATE SET
                current_stage = excluded.current_stage,
                updated_at = excluded.updated_at
            ",
        )
        .bind(module_id.as_str())
        .bind(stage)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn list_stages(&self) -> Result<Vec<StageRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT module_id, current_stage, updated_at
            FROM module_progress
            ORDER BY module_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_stage_row).collect()
    }

    async fn clear_stages(&self, module_id: Option<&ModuleId>) -> Result<u64, StorageError> {
        let result = match module_id {
            Some(id) => {
                sqlx::query("DELETE FROM module_progress WHERE module_id = ?1")
                    .bind(id.as_str())
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("DELETE FROM module_progress")
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(conn)?;
        Ok(result.rows_affected())
    }
}
