//! Reservation arbiter: turns a validated request into ledger rows.
//!
//! Two layers of protection apply to a hold:
//! - the per-actor duplicate lookback (one submission per actor per unit
//!   within the window), surfaced as `DuplicateReservation`;
//! - the store's live-claim guard (one live claim per unit globally),
//!   surfaced as `UnitConflict` when another actor wins the insert race.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::common::auth::{ActorContext, Capability};
use crate::common::{DetailsSnapshot, Error, ItemKind, ItemRef};
use crate::domains::bookings::models::{NewReservation, Reservation, ReservationState};
use crate::kernel::{BaseReservationStore, ServerDeps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReserveMode {
    #[default]
    Hold,
    DirectConfirm,
}

/// A validated reservation request. `units` carries seat numbers (events,
/// exactly one) or slot labels (venues, one or more); empty only for staff
/// direct-confirm claims on the whole item.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub kind: ItemKind,
    pub details: DetailsSnapshot,
    pub units: Vec<String>,
    pub mode: ReserveMode,
}

impl ReserveRequest {
    fn validate(&self, actor: &ActorContext) -> Result<ItemRef, Error> {
        let kind_matches = matches!(
            (self.kind, &self.details),
            (ItemKind::Event, DetailsSnapshot::Event(_))
                | (ItemKind::Venue, DetailsSnapshot::Venue(_))
        );
        if !kind_matches {
            return Err(Error::ValidationFailed(
                "details snapshot does not match item kind".to_string(),
            ));
        }
        if self.details.name().trim().is_empty() || self.details.date().trim().is_empty() {
            return Err(Error::ValidationFailed(
                "item name and date are required".to_string(),
            ));
        }
        if self.kind == ItemKind::Venue {
            actor.require(Capability::BookVenue)?;
        }
        match self.mode {
            ReserveMode::DirectConfirm => {
                actor.require(Capability::DirectConfirm)?;
                if self.units.len() > 1 {
                    return Err(Error::ValidationFailed(
                        "direct confirm takes at most one unit".to_string(),
                    ));
                }
            }
            ReserveMode::Hold => match self.kind {
                ItemKind::Event if self.units.len() != 1 => {
                    return Err(Error::ValidationFailed(
                        "event reservations take exactly one seat".to_string(),
                    ));
                }
                ItemKind::Venue if self.units.is_empty() => {
                    return Err(Error::ValidationFailed(
                        "at least one slot label is required".to_string(),
                    ));
                }
                _ => {}
            },
        }
        if self.units.iter().any(|u| u.trim().is_empty()) {
            return Err(Error::ValidationFailed(
                "unit selectors must be non-empty".to_string(),
            ));
        }
        Ok(self.details.item_ref())
    }
}

/// Arbitrate a reservation request and write the outcome to the ledger.
///
/// Hold mode arbitrates each requested unit independently; in multi-unit
/// (venue) requests, units losing either check are skipped and the caller
/// receives only the reservations actually created. A request where every
/// unit loses is a duplicate overall.
pub async fn reserve(
    actor: &ActorContext,
    request: &ReserveRequest,
    deps: &ServerDeps,
) -> Result<Vec<Reservation>, Error> {
    let item_ref = request.validate(actor)?;

    if request.mode == ReserveMode::DirectConfirm {
        // Same rule as the hold path: a lapsed hold must never block the
        // claim between sweeps.
        if let Some(unit) = request.units.first() {
            deps.reservations
                .release_expired_for_unit(&item_ref, unit)
                .await?;
        }
        let reservation = deps
            .reservations
            .insert(&NewReservation {
                actor_id: actor.actor_id,
                item_kind: request.kind,
                item_ref: item_ref.clone(),
                unit_selector: request.units.first().cloned(),
                state: ReservationState::Confirmed,
                details: request.details.clone(),
                expires_at: None,
            })
            .await?;
        info!(
            reservation_id = %reservation.id,
            item_ref = %item_ref,
            "Direct-confirmed reservation created"
        );
        return Ok(vec![reservation]);
    }

    let now = Utc::now();
    let cutoff = deps.hold_policy.duplicate_cutoff(now);
    let partial = request.units.len() > 1;
    let mut created = Vec::new();

    for unit in &request.units {
        if let Some(existing) = deps
            .reservations
            .find_recent_duplicate(actor.actor_id, &item_ref, unit, cutoff)
            .await?
        {
            warn!(
                actor_id = %actor.actor_id,
                item_ref = %item_ref,
                unit = %unit,
                existing = %existing.id,
                "Duplicate blocked"
            );
            if partial {
                continue;
            }
            return Err(Error::DuplicateReservation(format!("{} {}", item_ref, unit)));
        }

        // A lapsed hold must never block a fresh claim between sweeps.
        deps.reservations
            .release_expired_for_unit(&item_ref, unit)
            .await?;

        let insert = deps
            .reservations
            .insert(&NewReservation {
                actor_id: actor.actor_id,
                item_kind: request.kind,
                item_ref: item_ref.clone(),
                unit_selector: Some(unit.clone()),
                state: ReservationState::Held,
                details: request.details.clone(),
                expires_at: Some(deps.hold_policy.expires_at(now)),
            })
            .await;

        match insert {
            Ok(reservation) => {
                info!(
                    reservation_id = %reservation.id,
                    item_ref = %item_ref,
                    unit = %unit,
                    "Hold created"
                );
                created.push(reservation);
            }
            Err(Error::UnitConflict(detail)) if partial => {
                warn!(item_ref = %item_ref, unit = %unit, "Unit lost to a live claim: {}", detail);
            }
            Err(e) => return Err(e),
        }
    }

    if created.is_empty() {
        return Err(Error::DuplicateReservation(item_ref.to_string()));
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ActorId, EventDetails, Role, VenueDetails};
    use crate::kernel::test_dependencies::TestStores;
    use chrono::Duration;

    fn event_request(seat: &str, mode: ReserveMode) -> ReserveRequest {
        ReserveRequest {
            kind: ItemKind::Event,
            details: DetailsSnapshot::Event(EventDetails {
                event: "Launch Night".to_string(),
                venue: Some("Grand Hall".to_string()),
                date: "2026-09-12".to_string(),
                capacity: Some(3),
                price: None,
            }),
            units: vec![seat.to_string()],
            mode,
        }
    }

    fn venue_request(slots: &[&str]) -> ReserveRequest {
        ReserveRequest {
            kind: ItemKind::Venue,
            details: DetailsSnapshot::Venue(VenueDetails {
                name: "Grand Hall".to_string(),
                date: "2026-09-12".to_string(),
                capacity: Some(2),
                price: None,
            }),
            units: slots.iter().map(|s| s.to_string()).collect(),
            mode: ReserveMode::Hold,
        }
    }

    fn visitor() -> ActorContext {
        ActorContext::new(ActorId::new(), Role::Visitor)
    }

    #[tokio::test]
    async fn hold_sets_state_and_expiry() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let actor = visitor();

        let created = reserve(&actor, &event_request("2", ReserveMode::Hold), &deps)
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].state, ReservationState::Held);
        assert_eq!(created[0].unit_selector.as_deref(), Some("2"));
        let expires = created[0].expires_at.unwrap();
        assert!(expires > Utc::now() + Duration::minutes(14));
    }

    #[tokio::test]
    async fn second_submission_within_window_is_a_duplicate() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let actor = visitor();
        let request = event_request("2", ReserveMode::Hold);

        reserve(&actor, &request, &deps).await.unwrap();
        let err = reserve(&actor, &request, &deps).await.unwrap_err();

        assert!(matches!(err, Error::DuplicateReservation(_)));
        assert_eq!(stores.reservations.all().len(), 1);
    }

    #[tokio::test]
    async fn never_expiring_hold_still_counts_as_a_duplicate() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let actor = visitor();

        let created = reserve(&actor, &event_request("2", ReserveMode::Hold), &deps)
            .await
            .unwrap();
        let open_ended = {
            let mut r = created[0].clone();
            r.expires_at = None;
            r
        };
        let seeded = TestStores::new();
        seeded.reservations.push(open_ended);

        let err = reserve(&actor, &event_request("2", ReserveMode::Hold), &seeded.deps())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateReservation(_)));
    }

    #[tokio::test]
    async fn different_actor_loses_the_unit_to_the_claim_guard() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let request = event_request("2", ReserveMode::Hold);

        reserve(&visitor(), &request, &deps).await.unwrap();
        let err = reserve(&visitor(), &request, &deps).await.unwrap_err();

        assert!(matches!(err, Error::UnitConflict(_)));
    }

    #[tokio::test]
    async fn expired_hold_does_not_block_a_new_hold() {
        let stores = TestStores::new();
        let deps = stores.deps();

        let created = reserve(&visitor(), &event_request("2", ReserveMode::Hold), &deps)
            .await
            .unwrap();
        let lapsed = {
            let mut r = created[0].clone();
            r.expires_at = Some(Utc::now() - Duration::minutes(1));
            r
        };
        let seeded = TestStores::new();
        seeded.reservations.push(lapsed);
        let deps = seeded.deps();

        let second = reserve(&visitor(), &event_request("2", ReserveMode::Hold), &deps)
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].state, ReservationState::Held);
        // The lapsed hold was flipped to cancelled on the way in.
        let states: Vec<_> = seeded.reservations.all().iter().map(|r| r.state).collect();
        assert!(states.contains(&ReservationState::Cancelled));
    }

    #[tokio::test]
    async fn expired_hold_does_not_block_a_direct_confirm() {
        let stores = TestStores::new();
        let deps = stores.deps();

        let created = reserve(&visitor(), &event_request("2", ReserveMode::Hold), &deps)
            .await
            .unwrap();
        let lapsed = {
            let mut r = created[0].clone();
            r.expires_at = Some(Utc::now() - Duration::minutes(10));
            r
        };
        let seeded = TestStores::new();
        seeded.reservations.push(lapsed);
        let deps = seeded.deps();
        let staff = ActorContext::new(ActorId::new(), Role::Staff);

        let confirmed = reserve(&staff, &event_request("2", ReserveMode::DirectConfirm), &deps)
            .await
            .unwrap();

        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].state, ReservationState::Confirmed);
        assert!(confirmed[0].expires_at.is_none());
    }

    #[tokio::test]
    async fn venue_multi_slot_skips_conflicting_slot() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let organizer = ActorContext::new(ActorId::new(), Role::Organizer);

        reserve(&organizer, &venue_request(&["10:00-12:00"]), &deps)
            .await
            .unwrap();
        let created = reserve(
            &organizer,
            &venue_request(&["10:00-12:00", "12:00-14:00"]),
            &deps,
        )
        .await
        .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].unit_selector.as_deref(), Some("12:00-14:00"));
    }

    #[tokio::test]
    async fn venue_request_with_every_slot_taken_is_a_duplicate() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let organizer = ActorContext::new(ActorId::new(), Role::Organizer);
        let request = venue_request(&["10:00-12:00", "12:00-14:00"]);

        reserve(&organizer, &request, &deps).await.unwrap();
        let err = reserve(&organizer, &request, &deps).await.unwrap_err();

        assert!(matches!(err, Error::DuplicateReservation(_)));
    }

    #[tokio::test]
    async fn visitor_cannot_book_a_venue() {
        let stores = TestStores::new();
        let deps = stores.deps();

        let err = reserve(&visitor(), &venue_request(&["10:00-12:00"]), &deps)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn direct_confirm_requires_staff_and_never_expires() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let staff = ActorContext::new(ActorId::new(), Role::Staff);

        let err = reserve(&visitor(), &event_request("2", ReserveMode::DirectConfirm), &deps)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let created = reserve(&staff, &event_request("2", ReserveMode::DirectConfirm), &deps)
            .await
            .unwrap();
        assert_eq!(created[0].state, ReservationState::Confirmed);
        assert!(created[0].expires_at.is_none());
    }

    #[tokio::test]
    async fn direct_confirm_bypasses_the_duplicate_check() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let staff = ActorContext::new(ActorId::new(), Role::Staff);

        // Whole-item claims carry no unit selector and never collide.
        let mut request = event_request("1", ReserveMode::DirectConfirm);
        request.units.clear();

        reserve(&staff, &request, &deps).await.unwrap();
        let again = reserve(&staff, &request, &deps).await.unwrap();
        assert_eq!(again[0].state, ReservationState::Confirmed);
        assert_eq!(stores.reservations.all().len(), 2);
    }

    #[tokio::test]
    async fn mismatched_details_kind_fails_validation() {
        let stores = TestStores::new();
        let deps = stores.deps();
        let mut request = event_request("2", ReserveMode::Hold);
        request.kind = ItemKind::Venue;

        let err = reserve(
            &ActorContext::new(ActorId::new(), Role::Staff),
            &request,
            &deps,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::ValidationFailed(_)));
    }
}
