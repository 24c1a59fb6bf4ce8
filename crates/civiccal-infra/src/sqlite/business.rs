//! SQLite business repository implementation.
//!
//! Implements `BusinessRepository` from `civiccal-core` using sqlx with
//! split read/write pools. Membership lives in a `business_members`
//! junction table so member lookups are indexed by user id.

use civiccal_core::repository::business::BusinessRepository;
use civiccal_types::business::{Business, BusinessId, BusinessStatus};
use civiccal_types::error::RepositoryError;
use civiccal_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_err, parse_datetime};

/// SQLite-backed implementation of `BusinessRepository`.
pub struct SqliteBusinessRepository {
    pool: DatabasePool,
}

impl SqliteBusinessRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Persist a business and its member list.
    pub async fn create(&self, business: &Business) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO businesses (id, owner_id, title, status, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(business.id.to_string())
        .bind(business.owner_id.to_string())
        .bind(&business.title)
        .bind(business.status.to_string())
        .bind(format_datetime(&business.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.message().contains("UNIQUE") => {
                RepositoryError::Conflict(format!("business '{}' already exists", business.id))
            }
            other => map_sqlx_err(other),
        })?;

        for member_id in &business.member_ids {
            sqlx::query("INSERT INTO business_members (business_id, user_id) VALUES (?, ?)")
                .bind(business.id.to_string())
                .bind(member_id.to_string())
                .execute(&self.pool.writer)
                .await
                .map_err(map_sqlx_err)?;
        }
        Ok(())
    }

    async fn load_members(&self, business_id: &BusinessId) -> Result<Vec<UserId>, RepositoryError> {
        let rows = sqlx::query("SELECT user_id FROM business_members WHERE business_id = ?")
            .bind(business_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        rows.iter()
            .map(|row| {
                let raw: String = row.try_get("user_id").map_err(map_sqlx_err)?;
                raw.parse::<UserId>()
                    .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))
            })
            .collect()
    }

    async fn hydrate(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Business, RepositoryError> {
        let id_raw: String = row.try_get("id").map_err(map_sqlx_err)?;
        let owner_raw: String = row.try_get("owner_id").map_err(map_sqlx_err)?;
        let title: String = row.try_get("title").map_err(map_sqlx_err)?;
        let status_raw: String = row.try_get("status").map_err(map_sqlx_err)?;
        let created_raw: String = row.try_get("created_at").map_err(map_sqlx_err)?;

        let id = id_raw
            .parse::<BusinessId>()
            .map_err(|e| RepositoryError::Query(format!("invalid business id: {e}")))?;
        let member_ids = self.load_members(&id).await?;

        Ok(Business {
            id,
            owner_id: owner_raw
                .parse::<UserId>()
                .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
            member_ids,
            title,
            status: status_raw
                .parse::<BusinessStatus>()
                .map_err(RepositoryError::Query)?,
            created_at: parse_datetime(&created_raw)?,
        })
    }
}

impl BusinessRepository for SqliteBusinessRepository {
    async fn get(&self, id: &BusinessId) -> Result<Option<Business>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM businesses WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn list_owned(&self, user_id: &UserId) -> Result<Vec<Business>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM businesses WHERE owner_id = ? ORDER BY created_at")
            .bind(user_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        let mut businesses = Vec::with_capacity(rows.len());
        for row in &rows {
            businesses.push(self.hydrate(row).await?);
        }
        Ok(businesses)
    }

    async fn list_member_of(&self, user_id: &UserId) -> Result<Vec<Business>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT b.* FROM businesses b
             JOIN business_members m ON m.business_id = b.id
             WHERE m.user_id = ?
             ORDER BY b.created_at",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        let mut businesses = Vec::with_capacity(rows.len());
        for row in &rows {
            businesses.push(self.hydrate(row).await?);
        }
        Ok(businesses)
    }
}
