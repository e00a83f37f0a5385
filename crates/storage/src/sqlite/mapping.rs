use sqlx::Row;
use tutor_core::model::ModuleId;

use crate::repository::{ModuleActivity, StageRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn module_id_from_str(raw: String) -> Result<ModuleId, StorageError> {
    ModuleId::new(raw).map_err(ser)
}

pub(crate) fn map_stage_row(row: &sqlx::sqlite::SqliteRow) -> Result<StageRecord, StorageError> {
    Ok(StageRecord {
        module_id: module_id_from_str(row.try_get("module_id").map_err(ser)?)?,
        current_stage: row.try_get("current_stage").map_err(ser)?,
        updated_at: row.try_get("updated_at").map_err(ser)?,
    })
}

pub(crate) fn map_activity_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ModuleActivity, StorageError> {
    let start_count: i64 = row.try_get("start_count").map_err(ser)?;
    Ok(ModuleActivity {
        module_id: module_id_from_str(row.try_get("module_id").map_err(ser)?)?,
        started_at: row.try_get("started_at").map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
        start_count: u32::try_from(start_count)
            .map_err(|_| StorageError::Serialization("start_count out of range".into()))?,
    })
}
