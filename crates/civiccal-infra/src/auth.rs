//! Session-backed auth provider.
//!
//! The host application owns sign-in and sign-out; it pushes the current
//! user into this provider and the engine reads it per operation.

use civiccal_core::repository::auth::AuthProvider;
use civiccal_types::error::AuthError;
use civiccal_types::user::UserId;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds the signed-in user for the process, if any.
#[derive(Default)]
pub struct SessionAuthProvider {
    current: RwLock<Option<UserId>>,
}

impl SessionAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sign-in.
    pub async fn set_user(&self, user_id: UserId) {
        debug!(%user_id, "session user set");
        *self.current.write().await = Some(user_id);
    }

    /// Record a sign-out.
    pub async fn clear(&self) {
        debug!("session cleared");
        *self.current.write().await = None;
    }
}

impl AuthProvider for SessionAuthProvider {
    async fn authenticated_user(&self) -> Result<UserId, AuthError> {
        let current = *self.current.read().await;
        current.ok_or(AuthError::NotAuthenticated)
    }
}
