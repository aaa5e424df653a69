//! Cancellation cascade.
//!
//! Cancelling the reservation row is the primary contract; the follow-on
//! steps (venue flag reset, waitlist promotion) are best-effort and never
//! roll back or fail an already-committed cancellation.

use tracing::{info, warn};

use crate::common::auth::{ActorContext, Capability};
use crate::common::{Error, ItemKind, ReservationId};
use crate::domains::bookings::models::{Reservation, ReservationState};
use crate::domains::catalog::models::STATUS_AVAILABLE;
use crate::kernel::{
    BaseCatalogStore, BaseNotificationStore, BaseReservationStore, ServerDeps,
};

/// Cancel a reservation and run the cascade.
///
/// Owners cancel their own rows; privileged actors cancel anyone's. A row
/// that is already cancelled is returned as-is, so retried cancellations
/// succeed without re-running the cascade.
pub async fn cancel(
    actor: &ActorContext,
    reservation_id: ReservationId,
    deps: &ServerDeps,
) -> Result<Reservation, Error> {
    let scope = if actor.can(Capability::CancelAny) {
        None
    } else {
        Some(actor.actor_id)
    };
    let reservation = deps
        .reservations
        .find_scoped(reservation_id, scope)
        .await?
        .ok_or_else(|| Error::NotFound(format!("reservation {}", reservation_id)))?;

    if reservation.state == ReservationState::Cancelled {
        return Ok(reservation);
    }

    let cancelled = deps.reservations.mark_cancelled(reservation.id).await?;
    info!(
        reservation_id = %cancelled.id,
        item_ref = %cancelled.item_ref,
        actor_id = %actor.actor_id,
        "Reservation cancelled"
    );

    if cancelled.item_kind == ItemKind::Venue {
        reset_venue_flag(&cancelled, deps).await;
    }
    promote_waitlist(&cancelled, deps).await;

    Ok(cancelled)
}

/// Flip the catalog flag back to available once no confirmed reservation
/// remains for the venue date.
async fn reset_venue_flag(cancelled: &Reservation, deps: &ServerDeps) {
    let remaining = match deps
        .reservations
        .count_confirmed_for_item(&cancelled.item_ref, ItemKind::Venue)
        .await
    {
        Ok(n) => n,
        Err(e) => {
            warn!(item_ref = %cancelled.item_ref, "Confirmed count lookup failed: {}", e);
            return;
        }
    };
    if remaining > 0 {
        return;
    }
    let details = cancelled.details();
    if let Err(e) = deps
        .catalog
        .set_availability(details.name(), details.date(), STATUS_AVAILABLE)
        .await
    {
        warn!(item_ref = %cancelled.item_ref, "Catalog flag reset failed: {}", e);
    }
}

/// Mark pending waitlist notifications for the freed unit as sent.
/// Per-entry failures are logged and skipped.
async fn promote_waitlist(cancelled: &Reservation, deps: &ServerDeps) {
    let pending = match deps
        .notifications
        .find_pending_for_unit(&cancelled.item_ref, cancelled.unit_selector.as_deref())
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            warn!(item_ref = %cancelled.item_ref, "Waitlist lookup failed: {}", e);
            return;
        }
    };
    for notification in pending {
        match deps.notifications.mark_sent(notification.id).await {
            Ok(()) => {
                info!(
                    notification_id = %notification.id,
                    actor_id = %notification.actor_id,
                    item_ref = %cancelled.item_ref,
                    "Waitlist notification sent"
                );
            }
            Err(e) => {
                warn!(notification_id = %notification.id, "Waitlist notification failed: {}", e);
            }
        }
    }
}
