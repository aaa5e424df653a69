use tracing::info;

use crate::common::auth::ActorContext;
use crate::common::{Error, ReservationId};
use crate::domains::bookings::models::Reservation;
use crate::kernel::{BaseReservationStore, ServerDeps};

/// Promote a held reservation to confirmed, dropping its expiry.
///
/// Only the creating actor may confirm, and only while the hold is still
/// held and unexpired; anything else reports the reservation as absent
/// rather than leaking its state to other actors.
pub async fn confirm(
    actor: &ActorContext,
    reservation_id: ReservationId,
    deps: &ServerDeps,
) -> Result<Reservation, Error> {
    let confirmed = deps
        .reservations
        .confirm_held(reservation_id, actor.actor_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("reservation {}", reservation_id)))?;

    info!(reservation_id = %confirmed.id, item_ref = %confirmed.item_ref, "Hold confirmed");
    Ok(confirmed)
}
