//! Availability projection.
//!
//! Purely derived: the projector reads the reservation ledger (and the
//! venue catalog for slot labels), it never writes. Occupancy is decided
//! per row by the live predicate, so a lapsed hold reads as available even
//! before the sweep has flipped it.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::common::{Error, ItemKind, ItemRef};
use crate::domains::bookings::models::{Reservation, ReservationState};
use crate::kernel::{BaseCatalogStore, BaseReservationStore, ServerDeps};

/// Assumed seat count for event records that predate explicit capacity.
pub const DEFAULT_EVENT_CAPACITY: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    Held,
    Confirmed,
}

/// One reservable unit (seat number or slot label) and its current status.
#[derive(Debug, Clone, Serialize)]
pub struct UnitAvailability {
    pub unit: String,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub item_ref: ItemRef,
    pub kind: ItemKind,
    pub capacity: i32,
    pub units: Vec<UnitAvailability>,
    pub occupied_count: usize,
    pub available_count: usize,
}

/// Resolve an item's capacity, trying in order: the newest reservation
/// snapshot carrying one, the catalog listing, and (events only) the
/// default. Venues with no catalog listing cannot be projected.
pub async fn resolve_capacity(
    kind: ItemKind,
    item_ref: &ItemRef,
    reservations: &[Reservation],
    deps: &ServerDeps,
) -> Result<i32, Error> {
    if let Some(capacity) = reservations
        .iter()
        .rev()
        .find_map(|r| r.details().capacity())
        .filter(|c| *c > 0)
    {
        return Ok(capacity);
    }

    if let Some(date) = item_ref.date() {
        if let Some(listing) = deps.catalog.find_by_name_date(item_ref.name(), date).await? {
            let capacity = match kind {
                // Venue capacity is the number of reservable slots.
                ItemKind::Venue => listing.slots.len() as i32,
                ItemKind::Event => listing.capacity,
            };
            if capacity > 0 {
                return Ok(capacity);
            }
        }
    }

    match kind {
        ItemKind::Event => {
            debug!(item_ref = %item_ref, "No capacity on record, assuming default");
            Ok(DEFAULT_EVENT_CAPACITY)
        }
        ItemKind::Venue => Err(Error::CapacityUnresolved(item_ref.to_string())),
    }
}

/// Project the per-unit availability of one item.
///
/// Events enumerate seats `"1"..="{capacity}"`; venues enumerate the
/// catalog's slot labels. A unit is occupied by the live reservation
/// claiming it; whole-item claims (no selector) do not mark units.
pub async fn project_availability(
    kind: ItemKind,
    item_ref: &ItemRef,
    deps: &ServerDeps,
) -> Result<Availability, Error> {
    let rows = deps.reservations.find_active_for_item(item_ref).await?;
    let now = Utc::now();

    let unit_labels: Vec<String> = match kind {
        ItemKind::Event => {
            let capacity = resolve_capacity(kind, item_ref, &rows, deps).await?;
            (1..=capacity).map(|n| n.to_string()).collect()
        }
        ItemKind::Venue => {
            let date = item_ref
                .date()
                .ok_or_else(|| Error::CapacityUnresolved(item_ref.to_string()))?;
            deps.catalog
                .find_by_name_date(item_ref.name(), date)
                .await?
                .filter(|l| !l.slots.is_empty())
                .ok_or_else(|| Error::CapacityUnresolved(item_ref.to_string()))?
                .slots
        }
    };

    let units: Vec<UnitAvailability> = unit_labels
        .into_iter()
        .map(|label| {
            let status = rows
                .iter()
                .filter(|r| r.unit_selector.as_deref() == Some(label.as_str()) && r.is_live(now))
                .map(|r| match r.state {
                    ReservationState::Confirmed => UnitStatus::Confirmed,
                    _ => UnitStatus::Held,
                })
                .next()
                .unwrap_or(UnitStatus::Available);
            UnitAvailability { unit: label, status }
        })
        .collect();

    let occupied_count = units
        .iter()
        .filter(|u| u.status != UnitStatus::Available)
        .count();
    let capacity = units.len() as i32;
    let available_count = units.len() - occupied_count;

    Ok(Availability {
        item_ref: item_ref.clone(),
        kind,
        capacity,
        units,
        occupied_count,
        available_count,
    })
}
