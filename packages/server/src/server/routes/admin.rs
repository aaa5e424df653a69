use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::auth::{ActorContext, Capability};
use crate::common::pagination::{PageArgs, PageInfo};
use crate::common::{Error, ItemKind};
use crate::domains::bookings::data::ReservationData;
use crate::domains::bookings::models::ReservationState;
use crate::kernel::BaseReservationStore;
use crate::server::app::AxumAppState;

#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    #[serde(default)]
    pub kind: Option<ItemKind>,
    #[serde(default)]
    pub state: Option<ReservationState>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct LedgerResponse {
    pub reservations: Vec<ReservationData>,
    pub page_info: PageInfo,
}

/// GET /admin/reservations - the whole ledger, filtered and paged.
pub async fn admin_reservations_handler(
    Extension(state): Extension<AxumAppState>,
    actor: ActorContext,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<LedgerResponse>, Error> {
    actor.require(Capability::BrowseLedger)?;

    let page = PageArgs {
        page: query.page,
        limit: query.limit,
    }
    .validate();
    let (rows, total) = state
        .server_deps
        .reservations
        .list_page(query.kind, query.state, page)
        .await?;

    Ok(Json(LedgerResponse {
        reservations: rows.into_iter().map(ReservationData::from).collect(),
        page_info: PageInfo::new(total, page),
    }))
}
