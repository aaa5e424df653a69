//! Cancellation cascade through the HTTP surface: ownership scoping,
//! idempotent retry, catalog flag reset, waitlist promotion.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{
    event_availability_path, event_reservation_body, grand_hall_listing, request,
    venue_details, venue_reservation_body, Actor, TestHarness, SLOT_MORNING,
};
use booking_core::domains::catalog::models::{STATUS_AVAILABLE, STATUS_BOOKED};
use booking_core::domains::notifications::models::NotificationState;

async fn create_hold(harness: &TestHarness, actor: Actor, seat: &str) -> String {
    let (status, body) = harness
        .send(request(
            Method::POST,
            "/reservations",
            Some(actor),
            Some(event_reservation_body(seat, Some(3))),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["reservations"][0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn owner_cancels_and_the_unit_frees_up() {
    let harness = TestHarness::new();
    let actor = Actor::visitor();

    let id = create_hold(&harness, actor, "1").await;
    let (status, body) = harness
        .send(request(
            Method::DELETE,
            &format!("/reservations/{}", id),
            Some(actor),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "cancelled");

    let (_, availability) = harness
        .send(request(Method::GET, &event_availability_path(), None, None))
        .await;
    assert_eq!(availability["units"][0]["status"], "available");
}

#[tokio::test]
async fn cancellation_is_scoped_to_the_owner() {
    let harness = TestHarness::new();
    let owner = Actor::visitor();

    let id = create_hold(&harness, owner, "1").await;
    let (status, body) = harness
        .send(request(
            Method::DELETE,
            &format!("/reservations/{}", id),
            Some(Actor::visitor()),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn staff_cancels_on_behalf_of_anyone() {
    let harness = TestHarness::new();

    let id = create_hold(&harness, Actor::visitor(), "1").await;
    let (status, body) = harness
        .send(request(
            Method::DELETE,
            &format!("/reservations/{}", id),
            Some(Actor::staff()),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "cancelled");
}

#[tokio::test]
async fn retrying_a_cancellation_succeeds() {
    let harness = TestHarness::new();
    let actor = Actor::visitor();

    let id = create_hold(&harness, actor, "1").await;
    let path = format!("/reservations/{}", id);
    harness
        .send(request(Method::DELETE, &path, Some(actor), None))
        .await;
    let (status, body) = harness
        .send(request(Method::DELETE, &path, Some(actor), None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "cancelled");
}

#[tokio::test]
async fn last_venue_cancellation_resets_the_catalog_flag() {
    let harness = TestHarness::new();
    let mut listing = grand_hall_listing();
    listing.status = STATUS_BOOKED.to_string();
    harness.stores.catalog.push(listing);
    let organizer = Actor::organizer();

    let (_, created) = harness
        .send(request(
            Method::POST,
            "/reservations",
            Some(organizer),
            Some(venue_reservation_body(&[SLOT_MORNING])),
        ))
        .await;
    let id = created["reservations"][0]["id"].as_str().unwrap().to_string();

    harness
        .send(request(
            Method::DELETE,
            &format!("/reservations/{}", id),
            Some(organizer),
            None,
        ))
        .await;

    assert_eq!(
        harness
            .stores
            .catalog
            .status_of("Grand Hall", "2026-09-12")
            .as_deref(),
        Some(STATUS_AVAILABLE)
    );
}

#[tokio::test]
async fn cancellation_promotes_the_waitlist() {
    let harness = TestHarness::new();
    let owner = Actor::visitor();
    let waiter = Actor::visitor();

    let id = create_hold(&harness, owner, "1").await;
    let (status, _) = harness
        .send(request(
            Method::POST,
            "/notifications",
            Some(waiter),
            Some(json!({
                "kind": "event",
                "details": crate::common::event_details(Some(3)),
                "unit": "1",
            })),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    harness
        .send(request(
            Method::DELETE,
            &format!("/reservations/{}", id),
            Some(owner),
            None,
        ))
        .await;

    let notifications = harness.stores.notifications.all();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].state, NotificationState::Sent);
    assert!(notifications[0].sent_at.is_some());
}

#[tokio::test]
async fn venue_detail_fixture_matches_catalog_listing() {
    // Guard against fixture drift: the details body and the seeded listing
    // must agree on name and date for the cascade tests to mean anything.
    let details = venue_details();
    let listing = grand_hall_listing();
    assert_eq!(details["name"], listing.name);
    assert_eq!(details["date"], listing.date);
}
