// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. The arbiter,
// projector, and cascade are domain functions that use these traits; the
// store implementations decide how the invariants (one live claim per unit)
// are physically enforced.
//
// Naming convention: Base* for trait names (e.g., BaseReservationStore)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::pagination::ValidatedPage;
use crate::common::{ActorId, Error, ItemKind, ItemRef, NotificationId, ReservationId};
use crate::domains::bookings::models::{NewReservation, Reservation, ReservationState};
use crate::domains::catalog::models::VenueListing;
use crate::domains::notifications::models::{NewNotification, Notification};

// =============================================================================
// Reservation Ledger Store
// =============================================================================

/// Append/update access to the reservation ledger.
///
/// `insert` MUST reject a row whose `(item_ref, unit_selector)` already has
/// a live claim with `Error::UnitConflict`; this is the store-level guard
/// that closes the check-then-act race between concurrent holds.
#[async_trait]
pub trait BaseReservationStore: Send + Sync {
    async fn insert(&self, new: &NewReservation) -> Result<Reservation, Error>;

    /// Live row by the same actor for the same unit created since `cutoff`.
    async fn find_recent_duplicate(
        &self,
        actor_id: ActorId,
        item_ref: &ItemRef,
        unit_selector: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<Reservation>, Error>;

    /// All non-cancelled rows for an item, oldest first.
    async fn find_active_for_item(&self, item_ref: &ItemRef) -> Result<Vec<Reservation>, Error>;

    /// held -> confirmed scoped to the creating actor; lapsed holds do not
    /// match.
    async fn confirm_held(
        &self,
        id: ReservationId,
        actor_id: ActorId,
    ) -> Result<Option<Reservation>, Error>;

    /// Row by id, scoped to its owner unless `actor_id` is `None`.
    async fn find_scoped(
        &self,
        id: ReservationId,
        actor_id: Option<ActorId>,
    ) -> Result<Option<Reservation>, Error>;

    async fn mark_cancelled(&self, id: ReservationId) -> Result<Reservation, Error>;

    /// Cancel lapsed holds for one unit (targeted lazy expiry).
    async fn release_expired_for_unit(
        &self,
        item_ref: &ItemRef,
        unit_selector: &str,
    ) -> Result<u64, Error>;

    /// Cancel every lapsed hold (periodic sweep).
    async fn sweep_expired(&self) -> Result<u64, Error>;

    async fn count_confirmed_for_item(
        &self,
        item_ref: &ItemRef,
        item_kind: ItemKind,
    ) -> Result<i64, Error>;

    async fn find_for_actor(&self, actor_id: ActorId) -> Result<Vec<Reservation>, Error>;

    async fn list_page(
        &self,
        kind: Option<ItemKind>,
        state: Option<ReservationState>,
        page: ValidatedPage,
    ) -> Result<(Vec<Reservation>, i64), Error>;
}

// =============================================================================
// Venue Catalog Store (external collaborator shim)
// =============================================================================

#[async_trait]
pub trait BaseCatalogStore: Send + Sync {
    async fn find_by_name_date(
        &self,
        name: &str,
        date: &str,
    ) -> Result<Option<VenueListing>, Error>;

    async fn set_availability(&self, name: &str, date: &str, status: &str) -> Result<(), Error>;
}

// =============================================================================
// Waitlist Notification Store
// =============================================================================

#[async_trait]
pub trait BaseNotificationStore: Send + Sync {
    async fn insert_pending(&self, new: &NewNotification) -> Result<Notification, Error>;

    async fn find_pending_duplicate(
        &self,
        actor_id: ActorId,
        item_ref: &ItemRef,
        unit_selector: Option<&str>,
    ) -> Result<Option<Notification>, Error>;

    async fn find_pending_for_unit(
        &self,
        item_ref: &ItemRef,
        unit_selector: Option<&str>,
    ) -> Result<Vec<Notification>, Error>;

    async fn mark_sent(&self, id: NotificationId) -> Result<(), Error>;
}
