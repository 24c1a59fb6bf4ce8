//! Fail-soft aggregation of slot records and appointments into one feed.

use chrono::Utc;
use civiccal_types::appointment::AppointmentStatus;
use civiccal_types::business::Business;
use civiccal_types::calendar::{CalendarEvent, CalendarFeed, ViewRole};
use civiccal_types::config::EngineConfig;
use civiccal_types::error::AggregationError;
use civiccal_types::time::TimeWindow;
use civiccal_types::user::UserId;
use futures_util::Stream;
use futures_util::future::join_all;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::calendar::events::{appointment_event, slot_event};
use crate::event::ChangeBus;
use crate::repository::appointment::AppointmentRepository;
use crate::repository::business::BusinessRepository;
use crate::repository::clinic::ClinicRepository;
use crate::repository::slot::SlotRecordRepository;

/// Events gathered from one guarded stretch of sources, with fetch
/// accounting for the fail-soft policy.
#[derive(Default)]
struct SourceBatch {
    events: Vec<CalendarEvent>,
    attempted: usize,
    failed: usize,
}

/// Builds the unified, time-bounded calendar feed for a user.
///
/// Generic over the four data ports. Sibling businesses and sibling
/// clinics are fetched concurrently; within one fetch the flow is a single
/// logical thread suspending at each I/O boundary. The aggregator holds no
/// lock and caches nothing -- every call recomputes the feed from the
/// store.
pub struct CalendarAggregator<B, C, S, A> {
    business_repo: B,
    clinic_repo: C,
    slot_repo: S,
    appointment_repo: A,
    bus: ChangeBus,
    config: EngineConfig,
}

impl<B, C, S, A> CalendarAggregator<B, C, S, A>
where
    B: BusinessRepository,
    C: ClinicRepository,
    S: SlotRecordRepository,
    A: AppointmentRepository,
{
    pub fn new(
        business_repo: B,
        clinic_repo: C,
        slot_repo: S,
        appointment_repo: A,
        bus: ChangeBus,
        config: EngineConfig,
    ) -> Self {
        Self {
            business_repo,
            clinic_repo,
            slot_repo,
            appointment_repo,
            bus,
            config,
        }
    }

    /// Aggregate the user's calendar over the configured forward window.
    ///
    /// Fail-soft: every per-business, per-clinic, and per-appointment-source
    /// fetch is independently guarded; a failure is logged and skipped so
    /// the remaining sources still produce a (partial) feed. Only when
    /// every attempted source failed does the call return an error.
    pub async fn aggregate(
        &self,
        user_id: &UserId,
        role: ViewRole,
    ) -> Result<CalendarFeed, AggregationError> {
        let now = Utc::now();
        let window = TimeWindow::forward_days(now, self.config.calendar_window_days);

        let mut attempted = 0usize;
        let mut failed = 0usize;
        let mut events: Vec<CalendarEvent> = Vec::new();

        // Business discovery: owner and member lookups, unioned.
        let mut businesses: Vec<Business> = Vec::new();
        attempted += 1;
        match self.business_repo.list_owned(user_id).await {
            Ok(mut owned) => businesses.append(&mut owned),
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "owned-business lookup failed; skipping");
                failed += 1;
            }
        }
        attempted += 1;
        match self.business_repo.list_member_of(user_id).await {
            Ok(mut member_of) => businesses.append(&mut member_of),
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "member-business lookup failed; skipping");
                failed += 1;
            }
        }
        businesses.sort_by_key(|business| business.id.0);
        businesses.dedup_by_key(|business| business.id);

        // Sibling businesses are independent; walk them concurrently.
        let batches = join_all(
            businesses
                .iter()
                .map(|business| self.business_slot_events(business, user_id, role, window)),
        )
        .await;
        for batch in batches {
            attempted += batch.attempted;
            failed += batch.failed;
            events.extend(batch.events);
        }

        let appointment_batch = self.appointment_events(user_id, role, now).await;
        attempted += appointment_batch.attempted;
        failed += appointment_batch.failed;
        events.extend(appointment_batch.events);

        if attempted > 0 && failed == attempted {
            return Err(AggregationError::AllSourcesFailed);
        }

        events.sort_by_key(|event| event.start);
        debug!(
            user_id = %user_id,
            event_count = events.len(),
            sources_failed = failed,
            "calendar aggregated"
        );
        Ok(CalendarFeed {
            events,
            partial: failed > 0,
            computed_at: Some(now),
        })
    }

    /// Walk one business's clinics and collect the user's slot events.
    async fn business_slot_events(
        &self,
        business: &Business,
        user_id: &UserId,
        role: ViewRole,
        window: TimeWindow,
    ) -> SourceBatch {
        let mut batch = SourceBatch::default();

        batch.attempted += 1;
        let clinics = match self.clinic_repo.list_for_business(&business.id).await {
            Ok(clinics) => clinics,
            Err(err) => {
                warn!(
                    business_id = %business.id,
                    error = %err,
                    "clinic enumeration failed; skipping business"
                );
                batch.failed += 1;
                return batch;
            }
        };

        // Sibling clinics fetched concurrently, each guarded on its own.
        let fetches = join_all(clinics.iter().map(|clinic| async {
            (clinic.id, self.slot_repo.list_in_window(&clinic.id, window).await)
        }))
        .await;

        for (clinic_id, result) in fetches {
            batch.attempted += 1;
            match result {
                Ok(records) => {
                    batch.events.extend(
                        records
                            .iter()
                            .filter(|record| {
                                window.contains_start(record.start) && record.involves(user_id)
                            })
                            .map(|record| slot_event(record, user_id, role)),
                    );
                }
                Err(err) => {
                    warn!(
                        clinic_id = %clinic_id,
                        error = %err,
                        "slot fetch failed; skipping clinic"
                    );
                    batch.failed += 1;
                }
            }
        }
        batch
    }

    /// Fetch the user's direct appointments on each side the role covers.
    async fn appointment_events(
        &self,
        user_id: &UserId,
        role: ViewRole,
        from: chrono::DateTime<Utc>,
    ) -> SourceBatch {
        let mut batch = SourceBatch::default();

        if role.includes_patient() {
            batch.attempted += 1;
            match self.appointment_repo.list_for_patient(user_id, from).await {
                Ok(appointments) => batch.events.extend(
                    appointments
                        .iter()
                        .filter(|a| a.status != AppointmentStatus::Cancelled)
                        .map(|a| appointment_event(a, user_id)),
                ),
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "patient appointment fetch failed; skipping");
                    batch.failed += 1;
                }
            }
        }

        if role.includes_clinician() {
            batch.attempted += 1;
            match self.appointment_repo.list_for_clinician(user_id, from).await {
                Ok(appointments) => batch.events.extend(
                    appointments
                        .iter()
                        .filter(|a| a.status != AppointmentStatus::Cancelled)
                        .map(|a| appointment_event(a, user_id)),
                ),
                Err(err) => {
                    warn!(user_id = %user_id, error = %err, "clinician appointment fetch failed; skipping");
                    batch.failed += 1;
                }
            }
        }
        batch
    }

    /// Realtime mode: a restartable stream of recomputed feeds.
    ///
    /// Emits one initial aggregation, then recomputes the full feed on
    /// every change notification naming the user as patient or clinician.
    /// Coarse invalidation: each notification replaces the whole feed, so
    /// out-of-order delivery can only cause redundant recomputation, never
    /// a corrupted feed. A lagged receiver also triggers a recompute. The
    /// stream ends when the token is cancelled or the bus closes; calling
    /// `watch` again starts a fresh subscription.
    pub fn watch(
        &self,
        user_id: UserId,
        role: ViewRole,
        cancel: CancellationToken,
    ) -> impl Stream<Item = CalendarFeed> + '_ {
        async_stream::stream! {
            let mut rx = self.bus.subscribe();

            match self.aggregate(&user_id, role).await {
                Ok(feed) => yield feed,
                Err(err) => warn!(user_id = %user_id, error = %err, "initial aggregation failed"),
            }

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(change) if change.concerns(&user_id) => {
                            match self.aggregate(&user_id, role).await {
                                Ok(feed) => yield feed,
                                Err(err) => {
                                    warn!(user_id = %user_id, error = %err, "recompute failed; keeping last feed");
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "change stream lagged; recomputing");
                            if let Ok(feed) = self.aggregate(&user_id, role).await {
                                yield feed;
                            }
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }
    }

    /// The change bus writes should be published on for this aggregator's
    /// watch streams to observe them.
    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }
}
