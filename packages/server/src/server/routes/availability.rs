use axum::{
    extract::{Extension, Path},
    Json,
};

use crate::common::{Error, ItemKind, ItemRef};
use crate::domains::availability::activities::{project_availability, Availability};
use crate::server::app::AxumAppState;

fn parse_kind(raw: &str) -> Result<ItemKind, Error> {
    match raw {
        "event" => Ok(ItemKind::Event),
        "venue" => Ok(ItemKind::Venue),
        other => Err(Error::ValidationFailed(format!(
            "unknown item kind '{}'",
            other
        ))),
    }
}

/// GET /availability/:kind/:item_ref
///
/// Public read of the per-unit availability projection.
pub async fn availability_handler(
    Extension(state): Extension<AxumAppState>,
    Path((kind, item_ref)): Path<(String, String)>,
) -> Result<Json<Availability>, Error> {
    let kind = parse_kind(&kind)?;
    let item_ref = ItemRef::new(item_ref);
    let availability = project_availability(kind, &item_ref, &state.server_deps).await?;
    Ok(Json(availability))
}
