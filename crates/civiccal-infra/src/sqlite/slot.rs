//! SQLite slot-record repository implementation.
//!
//! The booked-member list is stored as a JSON TEXT column; window queries
//! compare RFC 3339 TEXT against the indexed `start_at` column.

use civiccal_core::repository::slot::SlotRecordRepository;
use civiccal_types::clinic::{ClinicId, SlotId, SlotRecord, SlotRecordStatus};
use civiccal_types::error::RepositoryError;
use civiccal_types::time::TimeWindow;
use civiccal_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_err, parse_datetime};

/// SQLite-backed implementation of `SlotRecordRepository`.
pub struct SqliteSlotRepository {
    pool: DatabasePool,
}

/// Internal row type for mapping SQLite rows to the domain SlotRecord.
struct SlotRow {
    id: String,
    clinic_id: String,
    clinician_id: String,
    start_at: String,
    end_at: String,
    status: String,
    booked_user_ids: String,
}

impl SlotRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            clinic_id: row.try_get("clinic_id")?,
            clinician_id: row.try_get("clinician_id")?,
            start_at: row.try_get("start_at")?,
            end_at: row.try_get("end_at")?,
            status: row.try_get("status")?,
            booked_user_ids: row.try_get("booked_user_ids")?,
        })
    }

    fn into_record(self) -> Result<SlotRecord, RepositoryError> {
        let booked_user_ids: Vec<UserId> = serde_json::from_str(&self.booked_user_ids)
            .map_err(|e| RepositoryError::Query(format!("invalid booked list JSON: {e}")))?;

        Ok(SlotRecord {
            id: self
                .id
                .parse::<SlotId>()
                .map_err(|e| RepositoryError::Query(format!("invalid slot id: {e}")))?,
            clinic_id: self
                .clinic_id
                .parse::<ClinicId>()
                .map_err(|e| RepositoryError::Query(format!("invalid clinic id: {e}")))?,
            clinician_id: self
                .clinician_id
                .parse::<UserId>()
                .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
            start: parse_datetime(&self.start_at)?,
            end: parse_datetime(&self.end_at)?,
            status: self
                .status
                .parse::<SlotRecordStatus>()
                .map_err(RepositoryError::Query)?,
            booked_user_ids,
        })
    }
}

impl SqliteSlotRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Persist a slot record.
    pub async fn create(&self, record: &SlotRecord) -> Result<(), RepositoryError> {
        let booked_json = serde_json::to_string(&record.booked_user_ids)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO slots (id, clinic_id, clinician_id, start_at, end_at, status, booked_user_ids)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.clinic_id.to_string())
        .bind(record.clinician_id.to_string())
        .bind(format_datetime(&record.start))
        .bind(format_datetime(&record.end))
        .bind(record.status.to_string())
        .bind(&booked_json)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }
}

impl SlotRecordRepository for SqliteSlotRepository {
    async fn list_in_window(
        &self,
        clinic_id: &ClinicId,
        window: TimeWindow,
    ) -> Result<Vec<SlotRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM slots
             WHERE clinic_id = ? AND start_at >= ? AND start_at < ?
             ORDER BY start_at",
        )
        .bind(clinic_id.to_string())
        .bind(format_datetime(&window.start))
        .bind(format_datetime(&window.end))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|row| {
                SlotRow::from_row(row)
                    .map_err(map_sqlx_err)
                    .and_then(SlotRow::into_record)
            })
            .collect()
    }
}
