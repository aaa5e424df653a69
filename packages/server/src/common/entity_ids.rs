//! Typed ID definitions for all domain entities.
//!
//! One alias per entity keeps ID usage compile-time safe: a `ReservationId`
//! cannot be passed where an `ActorId` is expected.

pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Reservation entities (ledger rows).
pub struct Reservation;

/// Marker type for the acting party (identity is resolved upstream).
pub struct Actor;

/// Marker type for waitlist Notification entities.
pub struct Notification;

/// Marker type for VenueListing entities (catalog rows).
pub struct VenueListing;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Reservation entities.
pub type ReservationId = Id<Reservation>;

/// Typed ID for the acting party of a request.
pub type ActorId = Id<Actor, V4>;

/// Typed ID for waitlist Notification entities.
pub type NotificationId = Id<Notification>;

/// Typed ID for VenueListing entities.
pub type ListingId = Id<VenueListing>;
