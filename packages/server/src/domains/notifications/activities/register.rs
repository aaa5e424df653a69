use tracing::info;

use crate::common::auth::ActorContext;
use crate::common::{DetailsSnapshot, Error, ItemKind, ItemRef};
use crate::domains::notifications::models::{NewNotification, Notification};
use crate::kernel::{BaseNotificationStore, ServerDeps};

/// Interest in a unit (or a whole item, when `unit_selector` is absent)
/// that is currently claimed.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub kind: ItemKind,
    pub details: DetailsSnapshot,
    pub unit_selector: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub notification: Notification,
    /// false when an equivalent pending entry already existed.
    pub created: bool,
}

/// Register a waitlist entry. Registration is idempotent per actor, item
/// and unit: a second registration while the first is still pending
/// returns the existing entry instead of stacking a new one.
pub async fn register(
    actor: &ActorContext,
    request: &NotificationRequest,
    deps: &ServerDeps,
) -> Result<RegistrationOutcome, Error> {
    let kind_matches = matches!(
        (request.kind, &request.details),
        (ItemKind::Event, DetailsSnapshot::Event(_)) | (ItemKind::Venue, DetailsSnapshot::Venue(_))
    );
    if !kind_matches {
        return Err(Error::ValidationFailed(
            "details snapshot does not match item kind".to_string(),
        ));
    }
    if request.details.name().trim().is_empty() || request.details.date().trim().is_empty() {
        return Err(Error::ValidationFailed(
            "item name and date are required".to_string(),
        ));
    }
    let item_ref: ItemRef = request.details.item_ref();

    if let Some(existing) = deps
        .notifications
        .find_pending_duplicate(actor.actor_id, &item_ref, request.unit_selector.as_deref())
        .await?
    {
        return Ok(RegistrationOutcome {
            notification: existing,
            created: false,
        });
    }

    let notification = deps
        .notifications
        .insert_pending(&NewNotification {
            actor_id: actor.actor_id,
            item_kind: request.kind,
            item_ref: item_ref.clone(),
            unit_selector: request.unit_selector.clone(),
            details: request.details.clone(),
        })
        .await?;
    info!(
        notification_id = %notification.id,
        item_ref = %item_ref,
        unit = %request.unit_selector.as_deref().unwrap_or("*"),
        "Waitlist entry registered"
    );
    Ok(RegistrationOutcome {
        notification,
        created: true,
    })
}
