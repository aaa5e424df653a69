// In-memory store implementations for testing
//
// Behavioral twins of the Postgres adapters: the same claim-guard, expiry,
// and scoping semantics, enforced under a mutex instead of an index. Unit
// and integration tests inject these through ServerDeps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::common::pagination::ValidatedPage;
use crate::common::{ActorId, Error, ItemKind, ItemRef, NotificationId, ReservationId};
use crate::domains::bookings::models::{NewReservation, Reservation, ReservationState};
use crate::domains::catalog::models::VenueListing;
use crate::domains::notifications::models::{
    NewNotification, Notification, NotificationState,
};
use crate::kernel::{
    BaseCatalogStore, BaseNotificationStore, BaseReservationStore, HoldPolicy, ServerDeps,
};

// =============================================================================
// In-memory reservation store
// =============================================================================

#[derive(Default)]
pub struct InMemoryReservationStore {
    rows: Mutex<Vec<Reservation>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an arbitrary row (tests use this for pre-expired holds).
    pub fn push(&self, reservation: Reservation) {
        self.rows.lock().unwrap().push(reservation);
    }

    /// Snapshot of every row.
    pub fn all(&self) -> Vec<Reservation> {
        self.rows.lock().unwrap().clone()
    }

    /// Mirrors the partial unique index: one row per unit in
    /// `{held, confirmed}`, NULL selectors never collide.
    fn has_claim(rows: &[Reservation], item_ref: &ItemRef, unit_selector: &Option<String>) -> bool {
        let Some(unit) = unit_selector else {
            return false;
        };
        rows.iter().any(|r| {
            r.item_ref == *item_ref
                && r.unit_selector.as_deref() == Some(unit.as_str())
                && matches!(r.state, ReservationState::Held | ReservationState::Confirmed)
        })
    }
}

#[async_trait]
impl BaseReservationStore for InMemoryReservationStore {
    async fn insert(&self, new: &NewReservation) -> Result<Reservation, Error> {
        let mut rows = self.rows.lock().unwrap();
        if Self::has_claim(&rows, &new.item_ref, &new.unit_selector) {
            return Err(Error::UnitConflict(format!(
                "{} {}",
                new.item_ref,
                new.unit_selector.as_deref().unwrap_or("(whole item)")
            )));
        }
        let reservation = Reservation {
            id: ReservationId::new(),
            actor_id: new.actor_id,
            item_kind: new.item_kind,
            item_ref: new.item_ref.clone(),
            unit_selector: new.unit_selector.clone(),
            state: new.state,
            details: Json(new.details.clone()),
            created_at: Utc::now(),
            expires_at: new.expires_at,
        };
        rows.push(reservation.clone());
        Ok(reservation)
    }

    async fn find_recent_duplicate(
        &self,
        actor_id: ActorId,
        item_ref: &ItemRef,
        unit_selector: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<Reservation>, Error> {
        let now = Utc::now();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| {
                r.actor_id == actor_id
                    && r.item_ref == *item_ref
                    && r.unit_selector.as_deref() == Some(unit_selector)
                    && r.created_at >= cutoff
                    && r.is_live(now)
            })
            .cloned())
    }

    async fn find_active_for_item(&self, item_ref: &ItemRef) -> Result<Vec<Reservation>, Error> {
        let mut rows: Vec<Reservation> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.item_ref == *item_ref && r.state != ReservationState::Cancelled)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn confirm_held(
        &self,
        id: ReservationId,
        actor_id: ActorId,
    ) -> Result<Option<Reservation>, Error> {
        let now = Utc::now();
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| {
            r.id == id
                && r.actor_id == actor_id
                && r.state == ReservationState::Held
                && r.expires_at.map(|t| t > now).unwrap_or(true)
        }) else {
            return Ok(None);
        };
        row.state = ReservationState::Confirmed;
        row.expires_at = None;
        Ok(Some(row.clone()))
    }

    async fn find_scoped(
        &self,
        id: ReservationId,
        actor_id: Option<ActorId>,
    ) -> Result<Option<Reservation>, Error> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && actor_id.map(|a| r.actor_id == a).unwrap_or(true))
            .cloned())
    }

    async fn mark_cancelled(&self, id: ReservationId) -> Result<Reservation, Error> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("reservation {}", id)))?;
        row.state = ReservationState::Cancelled;
        Ok(row.clone())
    }

    async fn release_expired_for_unit(
        &self,
        item_ref: &ItemRef,
        unit_selector: &str,
    ) -> Result<u64, Error> {
        let now = Utc::now();
        let mut released = 0;
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.item_ref == *item_ref
                && row.unit_selector.as_deref() == Some(unit_selector)
                && row.state == ReservationState::Held
                && row.expires_at.map(|t| t <= now).unwrap_or(false)
            {
                row.state = ReservationState::Cancelled;
                released += 1;
            }
        }
        Ok(released)
    }

    async fn sweep_expired(&self) -> Result<u64, Error> {
        let now = Utc::now();
        let mut released = 0;
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.state == ReservationState::Held
                && row.expires_at.map(|t| t <= now).unwrap_or(false)
            {
                row.state = ReservationState::Cancelled;
                released += 1;
            }
        }
        Ok(released)
    }

    async fn count_confirmed_for_item(
        &self,
        item_ref: &ItemRef,
        item_kind: ItemKind,
    ) -> Result<i64, Error> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.item_ref == *item_ref
                    && r.item_kind == item_kind
                    && r.state == ReservationState::Confirmed
            })
            .count() as i64)
    }

    async fn find_for_actor(&self, actor_id: ActorId) -> Result<Vec<Reservation>, Error> {
        let mut rows: Vec<Reservation> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.actor_id == actor_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_page(
        &self,
        kind: Option<ItemKind>,
        state: Option<ReservationState>,
        page: ValidatedPage,
    ) -> Result<(Vec<Reservation>, i64), Error> {
        let mut rows: Vec<Reservation> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| kind.map(|k| r.item_kind == k).unwrap_or(true))
            .filter(|r| state.map(|s| r.state == s).unwrap_or(true))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = rows.len() as i64;
        let page_rows = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((page_rows, total))
    }
}

// =============================================================================
// In-memory catalog store
// =============================================================================

#[derive(Default)]
pub struct InMemoryCatalogStore {
    listings: Mutex<Vec<VenueListing>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, listing: VenueListing) {
        self.listings.lock().unwrap().push(listing);
    }

    /// Current status of a listing, for assertions.
    pub fn status_of(&self, name: &str, date: &str) -> Option<String> {
        self.listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name) && l.date == date)
            .map(|l| l.status.clone())
    }
}

#[async_trait]
impl BaseCatalogStore for InMemoryCatalogStore {
    async fn find_by_name_date(
        &self,
        name: &str,
        date: &str,
    ) -> Result<Option<VenueListing>, Error> {
        Ok(self
            .listings
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name) && l.date == date)
            .cloned())
    }

    async fn set_availability(&self, name: &str, date: &str, status: &str) -> Result<(), Error> {
        for listing in self.listings.lock().unwrap().iter_mut() {
            if listing.name.eq_ignore_ascii_case(name) && listing.date == date {
                listing.status = status.to_string();
            }
        }
        Ok(())
    }
}

// =============================================================================
// In-memory notification store
// =============================================================================

#[derive(Default)]
pub struct InMemoryNotificationStore {
    rows: Mutex<Vec<Notification>>,
    fail_mark_sent: Mutex<HashSet<NotificationId>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notification: Notification) {
        self.rows.lock().unwrap().push(notification);
    }

    pub fn all(&self) -> Vec<Notification> {
        self.rows.lock().unwrap().clone()
    }

    /// Make `mark_sent` fail for one entry (cascade best-effort tests).
    pub fn fail_mark_sent_for(&self, id: NotificationId) {
        self.fail_mark_sent.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl BaseNotificationStore for InMemoryNotificationStore {
    async fn insert_pending(&self, new: &NewNotification) -> Result<Notification, Error> {
        let notification = Notification {
            id: NotificationId::new(),
            actor_id: new.actor_id,
            item_kind: new.item_kind,
            item_ref: new.item_ref.clone(),
            unit_selector: new.unit_selector.clone(),
            state: NotificationState::Pending,
            details: Json(new.details.clone()),
            created_at: Utc::now(),
            sent_at: None,
        };
        self.rows.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn find_pending_duplicate(
        &self,
        actor_id: ActorId,
        item_ref: &ItemRef,
        unit_selector: Option<&str>,
    ) -> Result<Option<Notification>, Error> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|n| {
                n.actor_id == actor_id
                    && n.item_ref == *item_ref
                    && n.unit_selector.as_deref() == unit_selector
                    && n.state == NotificationState::Pending
            })
            .cloned())
    }

    async fn find_pending_for_unit(
        &self,
        item_ref: &ItemRef,
        unit_selector: Option<&str>,
    ) -> Result<Vec<Notification>, Error> {
        let mut rows: Vec<Notification> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|n| {
                n.item_ref == *item_ref
                    && n.state == NotificationState::Pending
                    && unit_selector
                        .map(|u| n.unit_selector.as_deref() == Some(u))
                        .unwrap_or(true)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|n| n.created_at);
        Ok(rows)
    }

    async fn mark_sent(&self, id: NotificationId) -> Result<(), Error> {
        if self.fail_mark_sent.lock().unwrap().contains(&id) {
            return Err(Error::Internal(anyhow::anyhow!(
                "injected mark_sent failure for {}",
                id
            )));
        }
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.id == id && row.state == NotificationState::Pending {
                row.state = NotificationState::Sent;
                row.sent_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

// =============================================================================
// Test wiring
// =============================================================================

/// Concrete in-memory stores plus the ServerDeps that wraps them. Tests keep
/// the typed handles for seeding and assertions.
pub struct TestStores {
    pub reservations: Arc<InMemoryReservationStore>,
    pub catalog: Arc<InMemoryCatalogStore>,
    pub notifications: Arc<InMemoryNotificationStore>,
}

impl TestStores {
    pub fn new() -> Self {
        Self {
            reservations: Arc::new(InMemoryReservationStore::new()),
            catalog: Arc::new(InMemoryCatalogStore::new()),
            notifications: Arc::new(InMemoryNotificationStore::new()),
        }
    }

    pub fn deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.reservations.clone(),
            self.catalog.clone(),
            self.notifications.clone(),
            HoldPolicy::default(),
        )
    }
}

impl Default for TestStores {
    fn default() -> Self {
        Self::new()
    }
}
