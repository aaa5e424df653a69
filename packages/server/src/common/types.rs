// Common types used across multiple domains and layers
//
// These types are shared between the kernel and domain layers to avoid
// circular dependencies while maintaining type safety.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What kind of item a reservation claims a unit of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Seat-based: units are integer seat numbers.
    Event,
    /// Slot-based: units are time-slot labels on a venue + date.
    Venue,
}

/// Composite key identifying a reservable item: `"{name}__{date}"`.
///
/// Events and venue dates share the composition, so reservations, waitlist
/// entries, and catalog rows relate by this value key rather than by
/// ownership pointers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct ItemRef(String);

impl ItemRef {
    const SEPARATOR: &'static str = "__";

    /// Compose an item ref from an item name and date.
    pub fn compose(name: &str, date: &str) -> Self {
        Self(format!("{}{}{}", name, Self::SEPARATOR, date))
    }

    /// Wrap an already-composed key (path parameters, stored rows).
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The item name component (everything before the first separator).
    pub fn name(&self) -> &str {
        self.0.split(Self::SEPARATOR).next().unwrap_or(&self.0)
    }

    /// The date component, if the key carries one.
    pub fn date(&self) -> Option<&str> {
        self.0.splitn(3, Self::SEPARATOR).nth(1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Denormalized item attributes captured when a reservation or waitlist
/// entry is created. Closed per-kind records; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailsSnapshot {
    Event(EventDetails),
    Venue(VenueDetails),
}

/// Snapshot of an event's attributes at reservation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Event name.
    pub event: String,
    /// Venue the event runs at, when known.
    pub venue: Option<String>,
    /// Event date (display string, also the `ItemRef` date component).
    pub date: String,
    /// Seat capacity, when the record carries one. Legacy seat maps omit it.
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
}

/// Snapshot of a venue's attributes at reservation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueDetails {
    /// Venue name.
    pub name: String,
    /// Booking date.
    pub date: String,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
}

impl DetailsSnapshot {
    /// Capacity embedded in the snapshot, if any.
    pub fn capacity(&self) -> Option<i32> {
        match self {
            DetailsSnapshot::Event(d) => d.capacity,
            DetailsSnapshot::Venue(d) => d.capacity,
        }
    }

    /// Item name for catalog matching.
    pub fn name(&self) -> &str {
        match self {
            DetailsSnapshot::Event(d) => &d.event,
            DetailsSnapshot::Venue(d) => &d.name,
        }
    }

    /// Item date for catalog matching.
    pub fn date(&self) -> &str {
        match self {
            DetailsSnapshot::Event(d) => &d.date,
            DetailsSnapshot::Venue(d) => &d.date,
        }
    }

    /// The item ref this snapshot describes.
    pub fn item_ref(&self) -> ItemRef {
        ItemRef::compose(self.name(), self.date())
    }
}
