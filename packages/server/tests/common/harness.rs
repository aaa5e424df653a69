//! Integration test harness.
//!
//! Builds the full Axum app over the in-memory stores, so every test
//! exercises real routing, middleware, and error rendering without a
//! database. The typed store handles stay available for seeding and
//! assertions.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use booking_core::kernel::test_dependencies::TestStores;
use booking_core::server::build_app;

pub struct TestHarness {
    pub app: Router,
    pub stores: TestStores,
}

impl TestHarness {
    pub fn new() -> Self {
        let stores = TestStores::new();
        let app = build_app(stores.deps(), None);
        Self { app, stores }
    }

    /// Send one request through the router and decode the JSON body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail at the transport level");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, body)
    }
}

/// An acting party for requests: stable id plus role headers.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: &'static str,
}

impl Actor {
    pub fn visitor() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "visitor",
        }
    }

    pub fn organizer() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "organizer",
        }
    }

    pub fn staff() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: "staff",
        }
    }
}

/// Build a request, optionally authenticated and with a JSON body.
pub fn request(
    method: Method,
    uri: &str,
    actor: Option<Actor>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder
            .header("x-actor-id", actor.id.to_string())
            .header("x-actor-role", actor.role);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
