//! Clinic repository trait definition.

use civiccal_types::business::BusinessId;
use civiccal_types::clinic::{Clinic, ClinicId};
use civiccal_types::error::RepositoryError;

/// Repository trait for clinic persistence.
pub trait ClinicRepository: Send + Sync {
    /// Get a clinic by its unique ID.
    fn get(
        &self,
        id: &ClinicId,
    ) -> impl std::future::Future<Output = Result<Option<Clinic>, RepositoryError>> + Send;

    /// List all clinics under a business.
    fn list_for_business(
        &self,
        business_id: &BusinessId,
    ) -> impl std::future::Future<Output = Result<Vec<Clinic>, RepositoryError>> + Send;
}
