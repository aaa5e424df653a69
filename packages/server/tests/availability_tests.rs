//! Availability projection through the HTTP surface.

mod common;

use axum::http::{Method, StatusCode};

use crate::common::{
    event_availability_path, event_reservation_body, grand_hall_listing, request,
    venue_availability_path, venue_reservation_body, Actor, TestHarness, SLOT_MORNING,
};

#[tokio::test]
async fn availability_is_public() {
    let harness = TestHarness::new();

    let (status, body) = harness
        .send(request(Method::GET, &event_availability_path(), None, None))
        .await;

    assert_eq!(status, StatusCode::OK);
    // No reservations on record: default capacity, everything free.
    assert_eq!(body["capacity"], 24);
    assert_eq!(body["available_count"], 24);
    assert_eq!(body["occupied_count"], 0);
}

#[tokio::test]
async fn statuses_reflect_holds_and_confirmations() {
    let harness = TestHarness::new();
    let holder = Actor::visitor();
    let confirmer = Actor::visitor();

    harness
        .send(request(
            Method::POST,
            "/reservations",
            Some(holder),
            Some(event_reservation_body("1", Some(3))),
        ))
        .await;
    let (_, created) = harness
        .send(request(
            Method::POST,
            "/reservations",
            Some(confirmer),
            Some(event_reservation_body("2", Some(3))),
        ))
        .await;
    let id = created["reservations"][0]["id"].as_str().unwrap().to_string();
    harness
        .send(request(
            Method::PATCH,
            &format!("/reservations/{}", id),
            Some(confirmer),
            Some(serde_json::json!({"status": "confirmed"})),
        ))
        .await;

    let (status, body) = harness
        .send(request(Method::GET, &event_availability_path(), None, None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 3);
    let units = body["units"].as_array().unwrap();
    assert_eq!(units[0]["status"], "held");
    assert_eq!(units[1]["status"], "confirmed");
    assert_eq!(units[2]["status"], "available");
    assert_eq!(body["occupied_count"], 2);
    assert_eq!(body["available_count"], 1);
}

#[tokio::test]
async fn venue_units_are_catalog_slots() {
    let harness = TestHarness::new();
    harness.stores.catalog.push(grand_hall_listing());

    harness
        .send(request(
            Method::POST,
            "/reservations",
            Some(Actor::organizer()),
            Some(venue_reservation_body(&[SLOT_MORNING])),
        ))
        .await;

    let (status, body) = harness
        .send(request(Method::GET, &venue_availability_path(), None, None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 2);
    let units = body["units"].as_array().unwrap();
    assert_eq!(units[0]["unit"], SLOT_MORNING);
    assert_eq!(units[0]["status"], "held");
    assert_eq!(units[1]["status"], "available");
}

#[tokio::test]
async fn unlisted_venue_cannot_be_projected() {
    let harness = TestHarness::new();

    let (status, body) = harness
        .send(request(Method::GET, &venue_availability_path(), None, None))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "capacity_unresolved");
}

#[tokio::test]
async fn unknown_item_kind_is_rejected() {
    let harness = TestHarness::new();

    let (status, body) = harness
        .send(request(
            Method::GET,
            "/availability/room/Somewhere__2026-09-12",
            None,
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_failed");
}
