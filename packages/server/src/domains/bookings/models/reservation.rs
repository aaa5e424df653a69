//! Reservation ledger rows and their Postgres queries.
//!
//! The ledger is the source of truth for what is taken. Rows only move
//! forward: held -> confirmed, held -> cancelled, confirmed -> cancelled.
//! Cancelled rows are terminal and retained for audit.
//!
//! A partial unique index over live rows (`reservations_live_claim_idx`)
//! guarantees at most one live claim per `(item_ref, unit_selector)`; an
//! insert losing that race surfaces as `Error::UnitConflict`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{
    ActorId, DetailsSnapshot, Error, ItemKind, ItemRef, ReservationId,
};
use crate::common::pagination::ValidatedPage;

/// Name of the partial unique index enforcing one live claim per unit.
const LIVE_CLAIM_INDEX: &str = "reservations_live_claim_idx";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Held,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: ReservationId,
    pub actor_id: ActorId,
    pub item_kind: ItemKind,
    pub item_ref: ItemRef,
    /// Seat number (events) or slot label (venues). `None` only for staff
    /// direct-confirm records claiming the whole item.
    pub unit_selector: Option<String>,
    pub state: ReservationState,
    pub details: Json<DetailsSnapshot>,
    pub created_at: DateTime<Utc>,
    /// `None` means the reservation does not expire (confirmed rows,
    /// staff-direct records).
    pub expires_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// The single occupancy predicate shared by the projector, the arbiter
    /// conflict path, and the sweep: a unit is occupied by a confirmed row
    /// or by a hold whose expiry has not passed.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self.state {
            ReservationState::Confirmed => true,
            ReservationState::Held => self.expires_at.map(|t| t > now).unwrap_or(true),
            ReservationState::Cancelled => false,
        }
    }

    pub fn details(&self) -> &DetailsSnapshot {
        &self.details.0
    }
}

/// Input for a new ledger row. The arbiter decides state and expiry.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub actor_id: ActorId,
    pub item_kind: ItemKind,
    pub item_ref: ItemRef,
    pub unit_selector: Option<String>,
    pub state: ReservationState,
    pub details: DetailsSnapshot,
    pub expires_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Reservation Queries
// =============================================================================

impl Reservation {
    /// Insert a new row. A unique violation on the live-claim index means
    /// another actor's live claim won the unit.
    pub async fn insert(new: &NewReservation, pool: &PgPool) -> Result<Self, Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO reservations
                (id, actor_id, item_kind, item_ref, unit_selector, state, details, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(ReservationId::new())
        .bind(new.actor_id)
        .bind(new.item_kind)
        .bind(&new.item_ref)
        .bind(&new.unit_selector)
        .bind(new.state)
        .bind(Json(&new.details))
        .bind(new.expires_at)
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some(LIVE_CLAIM_INDEX) => {
                Error::UnitConflict(format!(
                    "{} {}",
                    new.item_ref,
                    new.unit_selector.as_deref().unwrap_or("(whole item)")
                ))
            }
            _ => Error::from(e),
        })
    }

    /// Per-actor duplicate lookback: a live row by the same actor for the
    /// same unit created within the window.
    pub async fn find_recent_duplicate(
        actor_id: ActorId,
        item_ref: &ItemRef,
        unit_selector: &str,
        cutoff: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Option<Self>, Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM reservations
            WHERE actor_id = $1
              AND item_ref = $2
              AND unit_selector = $3
              AND created_at >= $4
              AND (state = 'confirmed'
                   OR (state = 'held' AND (expires_at IS NULL OR expires_at > now())))
            LIMIT 1
            "#,
        )
        .bind(actor_id)
        .bind(item_ref)
        .bind(unit_selector)
        .bind(cutoff)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// All non-cancelled rows for an item, oldest first. Callers apply
    /// `is_live` where occupancy matters; the capacity resolver reads
    /// snapshots from any of them.
    pub async fn find_active_for_item(
        item_ref: &ItemRef,
        pool: &PgPool,
    ) -> Result<Vec<Self>, Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM reservations
            WHERE item_ref = $1 AND state != 'cancelled'
            ORDER BY created_at ASC
            "#,
        )
        .bind(item_ref)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// held -> confirmed, scoped to the creating actor. Lapsed holds do not
    /// match; confirming one reads as not found.
    pub async fn confirm_held(
        id: ReservationId,
        actor_id: ActorId,
        pool: &PgPool,
    ) -> Result<Option<Self>, Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE reservations
            SET state = 'confirmed', expires_at = NULL
            WHERE id = $1 AND actor_id = $2 AND state = 'held'
              AND (expires_at IS NULL OR expires_at > now())
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Fetch a row by id, optionally scoped to its owner. `actor_id = None`
    /// is the privileged path.
    pub async fn find_scoped(
        id: ReservationId,
        actor_id: Option<ActorId>,
        pool: &PgPool,
    ) -> Result<Option<Self>, Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM reservations WHERE id = $1 AND ($2::uuid IS NULL OR actor_id = $2)",
        )
        .bind(id)
        .bind(actor_id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Terminal transition into `cancelled`.
    pub async fn mark_cancelled(id: ReservationId, pool: &PgPool) -> Result<Self, Error> {
        sqlx::query_as::<_, Self>(
            "UPDATE reservations SET state = 'cancelled' WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Cancel lapsed holds for one unit so they never block a new claim
    /// between sweeps.
    pub async fn release_expired_for_unit(
        item_ref: &ItemRef,
        unit_selector: &str,
        pool: &PgPool,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE reservations SET state = 'cancelled'
            WHERE item_ref = $1 AND unit_selector = $2
              AND state = 'held' AND expires_at <= now()
            "#,
        )
        .bind(item_ref)
        .bind(unit_selector)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Global sweep: flip every lapsed hold to cancelled. Run periodically
    /// so ambiguous rows do not accumulate.
    pub async fn sweep_expired(pool: &PgPool) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE reservations SET state = 'cancelled' WHERE state = 'held' AND expires_at <= now()",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Count confirmed rows for an item of a given kind (cancellation
    /// cascade uses this to decide whether the catalog flag resets).
    pub async fn count_confirmed_for_item(
        item_ref: &ItemRef,
        item_kind: ItemKind,
        pool: &PgPool,
    ) -> Result<i64, Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM reservations
            WHERE item_ref = $1 AND item_kind = $2 AND state = 'confirmed'
            "#,
        )
        .bind(item_ref)
        .bind(item_kind)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// All reservations created by one actor, newest first.
    pub async fn find_for_actor(actor_id: ActorId, pool: &PgPool) -> Result<Vec<Self>, Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM reservations WHERE actor_id = $1 ORDER BY created_at DESC",
        )
        .bind(actor_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Paginated ledger browse with optional kind/state filters, newest
    /// first. Returns the page plus the total matching count.
    pub async fn list_page(
        kind: Option<ItemKind>,
        state: Option<ReservationState>,
        page: ValidatedPage,
        pool: &PgPool,
    ) -> Result<(Vec<Self>, i64), Error> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM reservations
            WHERE ($1::item_kind IS NULL OR item_kind = $1)
              AND ($2::reservation_state IS NULL OR state = $2)
            "#,
        )
        .bind(kind)
        .bind(state)
        .fetch_one(pool)
        .await?;

        let rows = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM reservations
            WHERE ($1::item_kind IS NULL OR item_kind = $1)
              AND ($2::reservation_state IS NULL OR state = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(kind)
        .bind(state)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{EventDetails, ItemRef};
    use chrono::Duration;

    fn held(expires_at: Option<DateTime<Utc>>) -> Reservation {
        Reservation {
            id: ReservationId::new(),
            actor_id: ActorId::new(),
            item_kind: ItemKind::Event,
            item_ref: ItemRef::compose("Launch Night", "2026-09-12"),
            unit_selector: Some("2".to_string()),
            state: ReservationState::Held,
            details: Json(DetailsSnapshot::Event(EventDetails {
                event: "Launch Night".to_string(),
                venue: None,
                date: "2026-09-12".to_string(),
                capacity: Some(3),
                price: None,
            })),
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn unexpired_hold_is_live() {
        let now = Utc::now();
        let r = held(Some(now + Duration::minutes(10)));
        assert!(r.is_live(now));
    }

    #[test]
    fn lapsed_hold_is_not_live() {
        let now = Utc::now();
        let r = held(Some(now - Duration::seconds(1)));
        assert!(!r.is_live(now));
    }

    #[test]
    fn confirmed_never_expires() {
        let now = Utc::now();
        let mut r = held(None);
        r.state = ReservationState::Confirmed;
        r.expires_at = None;
        assert!(r.is_live(now + Duration::days(365)));
    }

    #[test]
    fn cancelled_is_never_live() {
        let now = Utc::now();
        let mut r = held(Some(now + Duration::minutes(10)));
        r.state = ReservationState::Cancelled;
        assert!(!r.is_live(now));
    }
}
