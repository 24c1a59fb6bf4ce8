//! Business repository trait definition.

use civiccal_types::business::{Business, BusinessId};
use civiccal_types::error::RepositoryError;
use civiccal_types::user::UserId;

/// Repository trait for business discovery.
///
/// Implementations live in civiccal-infra (e.g., SqliteBusinessRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait BusinessRepository: Send + Sync {
    /// Get a business by its unique ID.
    fn get(
        &self,
        id: &BusinessId,
    ) -> impl std::future::Future<Output = Result<Option<Business>, RepositoryError>> + Send;

    /// List businesses owned by the user.
    fn list_owned(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Business>, RepositoryError>> + Send;

    /// List businesses where the user appears in the member list
    /// (excluding ownership, which `list_owned` covers).
    fn list_member_of(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Business>, RepositoryError>> + Send;
}
