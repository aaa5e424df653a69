//! Request-body builders shared across the integration suites.

use serde_json::{json, Value};

use booking_core::domains::catalog::models::VenueListing;

pub const EVENT_NAME: &str = "Launch Night";
pub const VENUE_NAME: &str = "Grand Hall";
pub const DATE: &str = "2026-09-12";
pub const SLOT_MORNING: &str = "10:00-12:00";
pub const SLOT_AFTERNOON: &str = "12:00-14:00";

pub fn event_details(capacity: Option<i32>) -> Value {
    json!({
        "kind": "event",
        "event": EVENT_NAME,
        "venue": VENUE_NAME,
        "date": DATE,
        "capacity": capacity,
    })
}

pub fn venue_details() -> Value {
    json!({
        "kind": "venue",
        "name": VENUE_NAME,
        "date": DATE,
    })
}

pub fn event_reservation_body(seat: &str, capacity: Option<i32>) -> Value {
    json!({
        "kind": "event",
        "details": event_details(capacity),
        "seat": seat,
    })
}

pub fn venue_reservation_body(slots: &[&str]) -> Value {
    json!({
        "kind": "venue",
        "details": venue_details(),
        "slots": slots,
    })
}

pub fn grand_hall_listing() -> VenueListing {
    VenueListing::new(VENUE_NAME, DATE, 2, &[SLOT_MORNING, SLOT_AFTERNOON])
}

/// URL-encoded availability path for the standard event fixture.
pub fn event_availability_path() -> String {
    format!("/availability/event/{}__{}", EVENT_NAME.replace(' ', "%20"), DATE)
}

pub fn venue_availability_path() -> String {
    format!("/availability/venue/{}__{}", VENUE_NAME.replace(' ', "%20"), DATE)
}
