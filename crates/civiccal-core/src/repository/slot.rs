//! Slot-record repository trait definition.

use civiccal_types::clinic::{ClinicId, SlotRecord};
use civiccal_types::error::RepositoryError;
use civiccal_types::time::TimeWindow;

/// Repository trait for persisted slot-booking records.
pub trait SlotRecordRepository: Send + Sync {
    /// List slot records for a clinic whose start falls inside the window.
    fn list_in_window(
        &self,
        clinic_id: &ClinicId,
        window: TimeWindow,
    ) -> impl std::future::Future<Output = Result<Vec<SlotRecord>, RepositoryError>> + Send;
}
