//! SQLite appointment repository implementation.
//!
//! `reserve_slot` is the engine's one atomic primitive: occupancy count,
//! capacity check, and insert run inside a single transaction on the
//! single-connection writer pool, so no concurrent reservation can land
//! between the check and the write.

use chrono::{DateTime, Utc};
use civiccal_core::repository::appointment::{
    AppointmentRepository, ReserveOutcome, ReserveRequest,
};
use civiccal_types::appointment::{Appointment, AppointmentId, AppointmentStatus};
use civiccal_types::business::BusinessId;
use civiccal_types::clinic::ClinicId;
use civiccal_types::error::RepositoryError;
use civiccal_types::time::TimeWindow;
use civiccal_types::user::UserId;
use sqlx::Row;
use tracing::debug;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_err, parse_datetime};

/// SQLite-backed implementation of `AppointmentRepository`.
pub struct SqliteAppointmentRepository {
    pool: DatabasePool,
}

/// Internal row type for mapping SQLite rows to the domain Appointment.
struct AppointmentRow {
    id: String,
    patient_id: String,
    clinician_id: String,
    business_id: String,
    clinic_id: String,
    start_at: String,
    end_at: String,
    status: String,
    reason: Option<String>,
    created_at: String,
}

impl AppointmentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            clinician_id: row.try_get("clinician_id")?,
            business_id: row.try_get("business_id")?,
            clinic_id: row.try_get("clinic_id")?,
            start_at: row.try_get("start_at")?,
            end_at: row.try_get("end_at")?,
            status: row.try_get("status")?,
            reason: row.try_get("reason")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_appointment(self) -> Result<Appointment, RepositoryError> {
        Ok(Appointment {
            id: self
                .id
                .parse::<AppointmentId>()
                .map_err(|e| RepositoryError::Query(format!("invalid appointment id: {e}")))?,
            patient_id: self
                .patient_id
                .parse::<UserId>()
                .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
            clinician_id: self
                .clinician_id
                .parse::<UserId>()
                .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
            business_id: self
                .business_id
                .parse::<BusinessId>()
                .map_err(|e| RepositoryError::Query(format!("invalid business id: {e}")))?,
            clinic_id: self
                .clinic_id
                .parse::<ClinicId>()
                .map_err(|e| RepositoryError::Query(format!("invalid clinic id: {e}")))?,
            start: parse_datetime(&self.start_at)?,
            end: parse_datetime(&self.end_at)?,
            status: self
                .status
                .parse::<AppointmentStatus>()
                .map_err(RepositoryError::Query)?,
            reason: self.reason,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl SqliteAppointmentRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl AppointmentRepository for SqliteAppointmentRepository {
    async fn get(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM appointments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.map(|row| {
            AppointmentRow::from_row(&row)
                .map_err(map_sqlx_err)
                .and_then(AppointmentRow::into_appointment)
        })
        .transpose()
    }

    async fn find_overlapping(
        &self,
        clinic_id: &ClinicId,
        window: TimeWindow,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        // Half-open interval intersection: a.start < window.end AND
        // a.end > window.start covers starts-inside, ends-inside, and
        // spans-entirely.
        let rows = sqlx::query(
            "SELECT * FROM appointments
             WHERE clinic_id = ? AND start_at < ? AND end_at > ?
             ORDER BY start_at",
        )
        .bind(clinic_id.to_string())
        .bind(format_datetime(&window.end))
        .bind(format_datetime(&window.start))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|row| {
                AppointmentRow::from_row(row)
                    .map_err(map_sqlx_err)
                    .and_then(AppointmentRow::into_appointment)
            })
            .collect()
    }

    async fn list_for_patient(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE patient_id = ? AND start_at >= ? ORDER BY start_at",
        )
        .bind(user_id.to_string())
        .bind(format_datetime(&from))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|row| {
                AppointmentRow::from_row(row)
                    .map_err(map_sqlx_err)
                    .and_then(AppointmentRow::into_appointment)
            })
            .collect()
    }

    async fn list_for_clinician(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE clinician_id = ? AND start_at >= ? ORDER BY start_at",
        )
        .bind(user_id.to_string())
        .bind(format_datetime(&from))
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|row| {
                AppointmentRow::from_row(row)
                    .map_err(map_sqlx_err)
                    .and_then(AppointmentRow::into_appointment)
            })
            .collect()
    }

    async fn reserve_slot(
        &self,
        request: ReserveRequest,
    ) -> Result<ReserveOutcome, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(map_sqlx_err)?;

        let (occupancy,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM appointments
             WHERE clinic_id = ? AND status != 'cancelled' AND start_at < ? AND end_at > ?",
        )
        .bind(request.clinic_id.to_string())
        .bind(format_datetime(&request.window.end))
        .bind(format_datetime(&request.window.start))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        if occupancy as u32 >= request.capacity {
            tx.rollback().await.map_err(map_sqlx_err)?;
            debug!(
                clinic_id = %request.clinic_id,
                slot_start = %request.window.start,
                occupancy,
                capacity = request.capacity,
                "reservation rejected, slot at capacity"
            );
            return Ok(ReserveOutcome::SlotFull);
        }

        let appointment = Appointment {
            id: AppointmentId::new(),
            patient_id: request.patient_id,
            clinician_id: request.clinician_id,
            business_id: request.business_id,
            clinic_id: request.clinic_id,
            start: request.window.start,
            end: request.window.end,
            status: AppointmentStatus::Pending,
            reason: request.reason,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO appointments (id, patient_id, clinician_id, business_id, clinic_id, start_at, end_at, status, reason, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(appointment.id.to_string())
        .bind(appointment.patient_id.to_string())
        .bind(appointment.clinician_id.to_string())
        .bind(appointment.business_id.to_string())
        .bind(appointment.clinic_id.to_string())
        .bind(format_datetime(&appointment.start))
        .bind(format_datetime(&appointment.end))
        .bind(appointment.status.to_string())
        .bind(&appointment.reason)
        .bind(format_datetime(&appointment.created_at))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(ReserveOutcome::Reserved(appointment))
    }

    async fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError> {
        let result = sqlx::query("UPDATE appointments SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }
}
