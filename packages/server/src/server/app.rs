//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::actor_context_middleware;
use crate::server::routes::{
    admin_reservations_handler, availability_handler, cancel_reservation_handler,
    create_reservation_handler, health_handler, list_reservations_handler,
    register_notification_handler, update_reservation_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub server_deps: ServerDeps,
    /// Present in production; `None` when the app runs over in-memory
    /// stores (health reports the database as skipped).
    pub db_pool: Option<PgPool>,
}

/// Build the Axum application router
pub fn build_app(server_deps: ServerDeps, db_pool: Option<PgPool>) -> Router {
    let state = AxumAppState {
        server_deps,
        db_pool,
    };

    // CORS configuration - the actor headers come from the gateway, not a
    // browser, so only content-type needs allowing.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/availability/:kind/:item_ref", get(availability_handler))
        .route(
            "/reservations",
            post(create_reservation_handler).get(list_reservations_handler),
        )
        .route(
            "/reservations/:id",
            axum::routing::patch(update_reservation_handler).delete(cancel_reservation_handler),
        )
        .route("/notifications", post(register_notification_handler))
        .route("/admin/reservations", get(admin_reservations_handler))
        .layer(middleware::from_fn(actor_context_middleware))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
