use serde::{Deserialize, Serialize};

use crate::common::{DetailsSnapshot, ItemKind};
use crate::domains::bookings::models::{Reservation, ReservationState};

/// API-facing shape of a ledger row (RFC3339 timestamps).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationData {
    pub id: String,
    pub actor_id: String,
    pub item_kind: ItemKind,
    pub item_ref: String,
    pub unit_selector: Option<String>,
    pub state: ReservationState,
    pub details: DetailsSnapshot,
    pub created_at: String,
    pub expires_at: Option<String>,
}

impl From<Reservation> for ReservationData {
    fn from(r: Reservation) -> Self {
        Self {
            id: r.id.to_string(),
            actor_id: r.actor_id.to_string(),
            item_kind: r.item_kind,
            item_ref: r.item_ref.to_string(),
            unit_selector: r.unit_selector,
            state: r.state,
            details: r.details.0,
            created_at: r.created_at.to_rfc3339(),
            expires_at: r.expires_at.map(|t| t.to_rfc3339()),
        }
    }
}
