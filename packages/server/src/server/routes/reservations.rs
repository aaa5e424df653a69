use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::auth::ActorContext;
use crate::common::{DetailsSnapshot, Error, ItemKind, ReservationId};
use crate::domains::bookings::activities::{cancel, confirm, reserve, ReserveMode, ReserveRequest};
use crate::domains::bookings::data::ReservationData;
use crate::kernel::BaseReservationStore;
use crate::server::app::AxumAppState;

#[derive(Debug, Deserialize)]
pub struct CreateReservationBody {
    pub kind: ItemKind,
    pub details: DetailsSnapshot,
    /// Seat number for event reservations.
    #[serde(default)]
    pub seat: Option<String>,
    /// Slot labels for venue reservations.
    #[serde(default)]
    pub slots: Vec<String>,
    #[serde(default)]
    pub mode: ReserveMode,
}

#[derive(Serialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<ReservationData>,
}

/// POST /reservations
pub async fn create_reservation_handler(
    Extension(state): Extension<AxumAppState>,
    actor: ActorContext,
    Json(body): Json<CreateReservationBody>,
) -> Result<(StatusCode, Json<ReservationListResponse>), Error> {
    let mut units = body.slots;
    if let Some(seat) = body.seat {
        units.push(seat);
    }
    let request = ReserveRequest {
        kind: body.kind,
        details: body.details,
        units,
        mode: body.mode,
    };
    let created = reserve(&actor, &request, &state.server_deps).await?;
    Ok((
        StatusCode::CREATED,
        Json(ReservationListResponse {
            reservations: created.into_iter().map(ReservationData::from).collect(),
        }),
    ))
}

/// GET /reservations - the caller's own reservations, newest first.
pub async fn list_reservations_handler(
    Extension(state): Extension<AxumAppState>,
    actor: ActorContext,
) -> Result<Json<ReservationListResponse>, Error> {
    let rows = state
        .server_deps
        .reservations
        .find_for_actor(actor.actor_id)
        .await?;
    Ok(Json(ReservationListResponse {
        reservations: rows.into_iter().map(ReservationData::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateReservationBody {
    pub status: String,
}

fn parse_reservation_id(raw: &str) -> Result<ReservationId, Error> {
    ReservationId::parse(raw)
        .map_err(|_| Error::ValidationFailed(format!("'{}' is not a reservation id", raw)))
}

/// PATCH /reservations/:id - the only supported transition is
/// `{"status": "confirmed"}`.
pub async fn update_reservation_handler(
    Extension(state): Extension<AxumAppState>,
    actor: ActorContext,
    Path(id): Path<String>,
    Json(body): Json<UpdateReservationBody>,
) -> Result<Json<ReservationData>, Error> {
    if body.status != "confirmed" {
        return Err(Error::ValidationFailed(format!(
            "unsupported status transition '{}'",
            body.status
        )));
    }
    let id = parse_reservation_id(&id)?;
    let confirmed = confirm(&actor, id, &state.server_deps).await?;
    Ok(Json(ReservationData::from(confirmed)))
}

/// DELETE /reservations/:id
pub async fn cancel_reservation_handler(
    Extension(state): Extension<AxumAppState>,
    actor: ActorContext,
    Path(id): Path<String>,
) -> Result<Json<ReservationData>, Error> {
    let id = parse_reservation_id(&id)?;
    let cancelled = cancel(&actor, id, &state.server_deps).await?;
    Ok(Json(ReservationData::from(cancelled)))
}
