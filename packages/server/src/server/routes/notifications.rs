use axum::{extract::Extension, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::common::auth::ActorContext;
use crate::common::{DetailsSnapshot, Error, ItemKind};
use crate::domains::notifications::activities::{register, NotificationRequest};
use crate::server::app::AxumAppState;

#[derive(Debug, Deserialize)]
pub struct RegisterNotificationBody {
    pub kind: ItemKind,
    pub details: DetailsSnapshot,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterNotificationResponse {
    pub notification_id: String,
    pub created: bool,
    pub message: String,
}

/// POST /notifications - register waitlist interest in a claimed unit.
pub async fn register_notification_handler(
    Extension(state): Extension<AxumAppState>,
    actor: ActorContext,
    Json(body): Json<RegisterNotificationBody>,
) -> Result<(StatusCode, Json<RegisterNotificationResponse>), Error> {
    let outcome = register(
        &actor,
        &NotificationRequest {
            kind: body.kind,
            details: body.details,
            unit_selector: body.unit,
        },
        &state.server_deps,
    )
    .await?;

    let (code, message) = if outcome.created {
        (
            StatusCode::CREATED,
            "You will be notified when this unit frees up".to_string(),
        )
    } else {
        (
            StatusCode::OK,
            "You are already on the waitlist for this unit".to_string(),
        )
    };
    Ok((
        code,
        Json(RegisterNotificationResponse {
            notification_id: outcome.notification.id.to_string(),
            created: outcome.created,
            message,
        }),
    ))
}
