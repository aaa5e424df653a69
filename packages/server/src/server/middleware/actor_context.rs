//! Actor context middleware.
//!
//! Identity verification lives upstream (gateway); by the time a request
//! reaches this service the `x-actor-id` and `x-actor-role` headers are
//! trusted. This middleware turns them into an `ActorContext` request
//! extension; requests without a valid actor continue as anonymous and are
//! rejected only by handlers that need one.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::common::auth::{ActorContext, Role};
use crate::common::{ActorId, Error};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Resolve the acting party from gateway headers and stash it in request
/// extensions. Missing or malformed headers leave the request anonymous.
pub async fn actor_context_middleware(mut request: Request<Body>, next: Next) -> Response {
    if let Some(actor) = extract_actor(&request) {
        debug!("Acting party: {} ({:?})", actor.actor_id, actor.role);
        request.extensions_mut().insert(actor);
    } else {
        debug!("Anonymous request");
    }

    next.run(request).await
}

fn extract_actor(request: &Request<Body>) -> Option<ActorContext> {
    let raw_id = request.headers().get(ACTOR_ID_HEADER)?.to_str().ok()?;
    let actor_id = ActorId::parse(raw_id).ok()?;
    // A role header that fails to parse is a malformed request, not a
    // downgrade to visitor.
    let role = match request.headers().get(ACTOR_ROLE_HEADER) {
        Some(value) => Role::parse(value.to_str().ok()?)?,
        None => Role::Visitor,
    };
    Some(ActorContext::new(actor_id, role))
}

#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ActorContext>()
            .copied()
            .ok_or(Error::AuthenticationRequired)
    }
}
