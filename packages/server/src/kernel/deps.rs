//! Server dependencies for domain activities (traits for testability)
//!
//! Central dependency container handed to every activity. Stores are trait
//! objects so tests can swap the Postgres adapters for the in-memory stores
//! in `test_dependencies`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::common::pagination::ValidatedPage;
use crate::common::{ActorId, Error, ItemKind, ItemRef, NotificationId, ReservationId};
use crate::config::Config;
use crate::domains::bookings::models::{NewReservation, Reservation, ReservationState};
use crate::domains::catalog::models::VenueListing;
use crate::domains::notifications::models::{NewNotification, Notification};
use crate::kernel::{BaseCatalogStore, BaseNotificationStore, BaseReservationStore};

// =============================================================================
// Hold policy
// =============================================================================

/// Timing constants for the arbiter: how long a hold lives and how far the
/// duplicate-submission check looks back.
#[derive(Debug, Clone, Copy)]
pub struct HoldPolicy {
    pub hold_duration: Duration,
    pub duplicate_window: Duration,
}

impl HoldPolicy {
    pub fn new(hold_minutes: i64, duplicate_window_minutes: i64) -> Self {
        Self {
            hold_duration: Duration::minutes(hold_minutes),
            duplicate_window: Duration::minutes(duplicate_window_minutes),
        }
    }

    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.hold_duration
    }

    pub fn duplicate_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duplicate_window
    }
}

impl Default for HoldPolicy {
    fn default() -> Self {
        Self::new(15, 15)
    }
}

// =============================================================================
// Postgres store adapters (implement the Base* traits over the models)
// =============================================================================

pub struct PgReservationStore(pub PgPool);

#[async_trait]
impl BaseReservationStore for PgReservationStore {
    async fn insert(&self, new: &NewReservation) -> Result<Reservation, Error> {
        Reservation::insert(new, &self.0).await
    }

    async fn find_recent_duplicate(
        &self,
        actor_id: ActorId,
        item_ref: &ItemRef,
        unit_selector: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<Reservation>, Error> {
        Reservation::find_recent_duplicate(actor_id, item_ref, unit_selector, cutoff, &self.0)
            .await
    }

    async fn find_active_for_item(&self, item_ref: &ItemRef) -> Result<Vec<Reservation>, Error> {
        Reservation::find_active_for_item(item_ref, &self.0).await
    }

    async fn confirm_held(
        &self,
        id: ReservationId,
        actor_id: ActorId,
    ) -> Result<Option<Reservation>, Error> {
        Reservation::confirm_held(id, actor_id, &self.0).await
    }

    async fn find_scoped(
        &self,
        id: ReservationId,
        actor_id: Option<ActorId>,
    ) -> Result<Option<Reservation>, Error> {
        Reservation::find_scoped(id, actor_id, &self.0).await
    }

    async fn mark_cancelled(&self, id: ReservationId) -> Result<Reservation, Error> {
        Reservation::mark_cancelled(id, &self.0).await
    }

    async fn release_expired_for_unit(
        &self,
        item_ref: &ItemRef,
        unit_selector: &str,
    ) -> Result<u64, Error> {
        Reservation::release_expired_for_unit(item_ref, unit_selector, &self.0).await
    }

    async fn sweep_expired(&self) -> Result<u64, Error> {
        Reservation::sweep_expired(&self.0).await
    }

    async fn count_confirmed_for_item(
        &self,
        item_ref: &ItemRef,
        item_kind: ItemKind,
    ) -> Result<i64, Error> {
        Reservation::count_confirmed_for_item(item_ref, item_kind, &self.0).await
    }

    async fn find_for_actor(&self, actor_id: ActorId) -> Result<Vec<Reservation>, Error> {
        Reservation::find_for_actor(actor_id, &self.0).await
    }

    async fn list_page(
        &self,
        kind: Option<ItemKind>,
        state: Option<ReservationState>,
        page: ValidatedPage,
    ) -> Result<(Vec<Reservation>, i64), Error> {
        Reservation::list_page(kind, state, page, &self.0).await
    }
}

pub struct PgCatalogStore(pub PgPool);

#[async_trait]
impl BaseCatalogStore for PgCatalogStore {
    async fn find_by_name_date(
        &self,
        name: &str,
        date: &str,
    ) -> Result<Option<VenueListing>, Error> {
        VenueListing::find_by_name_date(name, date, &self.0).await
    }

    async fn set_availability(&self, name: &str, date: &str, status: &str) -> Result<(), Error> {
        VenueListing::set_availability(name, date, status, &self.0).await
    }
}

pub struct PgNotificationStore(pub PgPool);

#[async_trait]
impl BaseNotificationStore for PgNotificationStore {
    async fn insert_pending(&self, new: &NewNotification) -> Result<Notification, Error> {
        Notification::insert_pending(new, &self.0).await
    }

    async fn find_pending_duplicate(
        &self,
        actor_id: ActorId,
        item_ref: &ItemRef,
        unit_selector: Option<&str>,
    ) -> Result<Option<Notification>, Error> {
        Notification::find_pending_duplicate(actor_id, item_ref, unit_selector, &self.0).await
    }

    async fn find_pending_for_unit(
        &self,
        item_ref: &ItemRef,
        unit_selector: Option<&str>,
    ) -> Result<Vec<Notification>, Error> {
        Notification::find_pending_for_unit(item_ref, unit_selector, &self.0).await
    }

    async fn mark_sent(&self, id: NotificationId) -> Result<(), Error> {
        Notification::mark_sent(id, &self.0).await
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to domain activities.
#[derive(Clone)]
pub struct ServerDeps {
    pub reservations: Arc<dyn BaseReservationStore>,
    pub catalog: Arc<dyn BaseCatalogStore>,
    pub notifications: Arc<dyn BaseNotificationStore>,
    pub hold_policy: HoldPolicy,
}

impl ServerDeps {
    pub fn new(
        reservations: Arc<dyn BaseReservationStore>,
        catalog: Arc<dyn BaseCatalogStore>,
        notifications: Arc<dyn BaseNotificationStore>,
        hold_policy: HoldPolicy,
    ) -> Self {
        Self {
            reservations,
            catalog,
            notifications,
            hold_policy,
        }
    }

    /// Production wiring: every store is the Postgres adapter over `pool`.
    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        Self::new(
            Arc::new(PgReservationStore(pool.clone())),
            Arc::new(PgCatalogStore(pool.clone())),
            Arc::new(PgNotificationStore(pool)),
            HoldPolicy::new(config.hold_minutes, config.duplicate_window_minutes),
        )
    }
}
