//! Authentication port.
//!
//! The platform's auth provider is an external collaborator; the engine
//! only needs a stable user id for the current session.

use civiccal_types::error::AuthError;
use civiccal_types::user::UserId;

/// Narrow port over the external authentication provider.
pub trait AuthProvider: Send + Sync {
    /// The authenticated user for the current session, or
    /// `AuthError::NotAuthenticated`.
    fn authenticated_user(
        &self,
    ) -> impl std::future::Future<Output = Result<UserId, AuthError>> + Send;
}
