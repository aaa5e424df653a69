//! Waitlist entries ("tell me when this unit frees up").
//!
//! Entries are created pending and flipped to sent exactly once, by the
//! cancellation cascade. Creation is idempotent: an identical pending entry
//! short-circuits instead of duplicating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::common::{ActorId, DetailsSnapshot, Error, ItemKind, ItemRef, NotificationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationState {
    Pending,
    Sent,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub actor_id: ActorId,
    pub item_kind: ItemKind,
    pub item_ref: ItemRef,
    /// The watched unit; `None` watches the whole item.
    pub unit_selector: Option<String>,
    pub state: NotificationState,
    pub details: Json<DetailsSnapshot>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Input for a new pending entry.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub actor_id: ActorId,
    pub item_kind: ItemKind,
    pub item_ref: ItemRef,
    pub unit_selector: Option<String>,
    pub details: DetailsSnapshot,
}

// =============================================================================
// Notification Queries
// =============================================================================

impl Notification {
    pub async fn insert_pending(new: &NewNotification, pool: &PgPool) -> Result<Self, Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO notifications
                (id, actor_id, item_kind, item_ref, unit_selector, state, details)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6)
            RETURNING *
            "#,
        )
        .bind(NotificationId::new())
        .bind(new.actor_id)
        .bind(new.item_kind)
        .bind(&new.item_ref)
        .bind(&new.unit_selector)
        .bind(Json(&new.details))
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// An identical pending entry by the same actor, if one exists.
    pub async fn find_pending_duplicate(
        actor_id: ActorId,
        item_ref: &ItemRef,
        unit_selector: Option<&str>,
        pool: &PgPool,
    ) -> Result<Option<Self>, Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM notifications
            WHERE actor_id = $1 AND item_ref = $2
              AND unit_selector IS NOT DISTINCT FROM $3
              AND state = 'pending'
            LIMIT 1
            "#,
        )
        .bind(actor_id)
        .bind(item_ref)
        .bind(unit_selector)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Pending entries watching a freed unit. A `None` selector (whole-item
    /// cancellation) matches every pending entry for the item.
    pub async fn find_pending_for_unit(
        item_ref: &ItemRef,
        unit_selector: Option<&str>,
        pool: &PgPool,
    ) -> Result<Vec<Self>, Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM notifications
            WHERE item_ref = $1 AND state = 'pending'
              AND ($2::text IS NULL OR unit_selector = $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(item_ref)
        .bind(unit_selector)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// pending -> sent, exactly once.
    pub async fn mark_sent(id: NotificationId, pool: &PgPool) -> Result<(), Error> {
        sqlx::query(
            "UPDATE notifications SET state = 'sent', sent_at = now() WHERE id = $1 AND state = 'pending'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
