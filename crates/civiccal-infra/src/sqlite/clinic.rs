//! SQLite clinic repository implementation.

use civiccal_core::repository::clinic::ClinicRepository;
use civiccal_types::business::BusinessId;
use civiccal_types::clinic::{Clinic, ClinicId, OperatingHours};
use civiccal_types::error::RepositoryError;
use sqlx::Row;

use super::map_sqlx_err;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `ClinicRepository`.
pub struct SqliteClinicRepository {
    pool: DatabasePool,
}

/// Internal row type for mapping SQLite rows to the domain Clinic.
struct ClinicRow {
    id: String,
    business_id: String,
    title: String,
    open_hour: Option<i64>,
    close_hour: Option<i64>,
    slot_duration_minutes: i64,
    slot_capacity: i64,
}

impl ClinicRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            business_id: row.try_get("business_id")?,
            title: row.try_get("title")?,
            open_hour: row.try_get("open_hour")?,
            close_hour: row.try_get("close_hour")?,
            slot_duration_minutes: row.try_get("slot_duration_minutes")?,
            slot_capacity: row.try_get("slot_capacity")?,
        })
    }

    fn into_clinic(self) -> Result<Clinic, RepositoryError> {
        let operating_hours = match (self.open_hour, self.close_hour) {
            (Some(open), Some(close)) => Some(OperatingHours {
                open_hour: open as u32,
                close_hour: close as u32,
            }),
            _ => None,
        };

        Ok(Clinic {
            id: self
                .id
                .parse::<ClinicId>()
                .map_err(|e| RepositoryError::Query(format!("invalid clinic id: {e}")))?,
            business_id: self
                .business_id
                .parse::<BusinessId>()
                .map_err(|e| RepositoryError::Query(format!("invalid business id: {e}")))?,
            title: self.title,
            operating_hours,
            slot_duration_minutes: self.slot_duration_minutes as u32,
            slot_capacity: self.slot_capacity as u32,
        })
    }
}

impl SqliteClinicRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Persist a clinic.
    pub async fn create(&self, clinic: &Clinic) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO clinics (id, business_id, title, open_hour, close_hour, slot_duration_minutes, slot_capacity)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(clinic.id.to_string())
        .bind(clinic.business_id.to_string())
        .bind(&clinic.title)
        .bind(clinic.operating_hours.map(|h| h.open_hour as i64))
        .bind(clinic.operating_hours.map(|h| h.close_hour as i64))
        .bind(clinic.slot_duration_minutes as i64)
        .bind(clinic.slot_capacity as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }
}

impl ClinicRepository for SqliteClinicRepository {
    async fn get(&self, id: &ClinicId) -> Result<Option<Clinic>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM clinics WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        row.map(|row| {
            ClinicRow::from_row(&row)
                .map_err(map_sqlx_err)
                .and_then(ClinicRow::into_clinic)
        })
        .transpose()
    }

    async fn list_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<Clinic>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM clinics WHERE business_id = ? ORDER BY title")
            .bind(business_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|row| {
                ClinicRow::from_row(row)
                    .map_err(map_sqlx_err)
                    .and_then(ClinicRow::into_clinic)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> (tempfile::TempDir, DatabasePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (dir, pool)
    }

    async fn seed_business(pool: &DatabasePool) -> BusinessId {
        let id = BusinessId::new();
        sqlx::query(
            "INSERT INTO businesses (id, owner_id, title, status, created_at)
             VALUES (?, ?, 'Seed', 'active', ?)",
        )
        .bind(id.to_string())
        .bind(civiccal_types::user::UserId::new().to_string())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&pool.writer)
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (_dir, pool) = test_pool().await;
        let business_id = seed_business(&pool).await;
        let repo = SqliteClinicRepository::new(pool);

        let clinic = Clinic {
            id: ClinicId::new(),
            business_id,
            title: "North Branch".to_string(),
            operating_hours: Some(OperatingHours {
                open_hour: 9,
                close_hour: 17,
            }),
            slot_duration_minutes: 60,
            slot_capacity: 20,
        };
        repo.create(&clinic).await.unwrap();

        let loaded = repo.get(&clinic.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "North Branch");
        assert_eq!(
            loaded.operating_hours,
            Some(OperatingHours {
                open_hour: 9,
                close_hour: 17
            })
        );
        assert_eq!(loaded.slot_capacity, 20);
    }

    #[tokio::test]
    async fn clinic_without_hours_loads_as_none() {
        let (_dir, pool) = test_pool().await;
        let business_id = seed_business(&pool).await;
        let repo = SqliteClinicRepository::new(pool);

        let clinic = Clinic {
            id: ClinicId::new(),
            business_id,
            title: "Paperwork Office".to_string(),
            operating_hours: None,
            slot_duration_minutes: 60,
            slot_capacity: 20,
        };
        repo.create(&clinic).await.unwrap();

        let loaded = repo.get(&clinic.id).await.unwrap().unwrap();
        assert!(loaded.operating_hours.is_none());
    }

    #[tokio::test]
    async fn list_for_business_scopes_by_owner() {
        let (_dir, pool) = test_pool().await;
        let business_a = seed_business(&pool).await;
        let business_b = seed_business(&pool).await;
        let repo = SqliteClinicRepository::new(pool);

        for (business_id, title) in [(business_a, "A1"), (business_a, "A2"), (business_b, "B1")] {
            repo.create(&Clinic {
                id: ClinicId::new(),
                business_id,
                title: title.to_string(),
                operating_hours: None,
                slot_duration_minutes: 60,
                slot_capacity: 20,
            })
            .await
            .unwrap();
        }

        let clinics = repo.list_for_business(&business_a).await.unwrap();
        assert_eq!(clinics.len(), 2);
        assert!(clinics.iter().all(|c| c.business_id == business_a));
    }
}
