//! Venue catalog rows.
//!
//! The catalog itself is owned by an external collaborator; the core only
//! needs two operations from it: lookup by name + date (capacity, slot
//! labels, availability flag) and resetting the availability flag when a
//! venue's last confirmed booking is cancelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{Error, ListingId};

pub const STATUS_AVAILABLE: &str = "Available";
pub const STATUS_BOOKED: &str = "Booked";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VenueListing {
    pub id: ListingId,
    pub name: String,
    pub date: String,
    pub capacity: i32,
    /// Reservable slot labels for this venue date, e.g. "10:00-12:00".
    pub slots: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl VenueListing {
    /// A fresh listing with the given slot labels, flagged available.
    pub fn new(name: &str, date: &str, capacity: i32, slots: &[&str]) -> Self {
        Self {
            id: ListingId::new(),
            name: name.to_string(),
            date: date.to_string(),
            capacity,
            slots: slots.iter().map(|s| s.to_string()).collect(),
            status: STATUS_AVAILABLE.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Case-insensitive exact name match plus date.
    pub async fn find_by_name_date(
        name: &str,
        date: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM venue_listings WHERE LOWER(name) = LOWER($1) AND date = $2",
        )
        .bind(name)
        .bind(date)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Flip the external availability flag for a venue date.
    pub async fn set_availability(
        name: &str,
        date: &str,
        status: &str,
        pool: &PgPool,
    ) -> Result<(), Error> {
        sqlx::query(
            "UPDATE venue_listings SET status = $3 WHERE LOWER(name) = LOWER($1) AND date = $2",
        )
        .bind(name)
        .bind(date)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(())
    }
}
